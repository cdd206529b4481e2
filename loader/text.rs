use tracing::trace;

use crate::error::Ov2Error;
use crate::poi::{PoiRecord, COORD_SCALE};

/// Longitude substituted when a field cannot be parsed. Out of range, so
/// validation rejects the row instead of the load failing.
pub const LON_SENTINEL: i32 = 18_100_000;

/// Latitude counterpart of [`LON_SENTINEL`].
pub const LAT_SENTINEL: i32 = 9_100_000;

/// Parse one delimited line into an (unvalidated) record.
///
/// Columns: `lon, lat, name[, extra_a[, extra_b]]`. Anything past the fifth
/// column is ignored. Whitespace around every field is trimmed.
pub fn parse_line(line: &str, delimiter: char) -> PoiRecord {
    let mut fields: Vec<&str> = line.split(delimiter).map(str::trim).collect();
    // "Cafe," ends in an empty column that carries no data
    while fields.len() > 3 && fields.last().is_some_and(|f| f.is_empty()) {
        fields.pop();
    }

    let lon = coordinate_or(fields.first().copied(), "longitude", LON_SENTINEL);
    let lat = coordinate_or(fields.get(1).copied(), "latitude", LAT_SENTINEL);
    let name = fields.get(2).copied().unwrap_or_default().to_string();

    let extra = fields.get(3).map(|first| {
        let mut extra = String::with_capacity(first.len() + 1);
        extra.push_str(first);
        extra.push('\0');
        if let Some(second) = fields.get(4) {
            extra.push_str(second);
        }
        extra
    });

    PoiRecord {
        lon,
        lat,
        name,
        extra,
    }
}

fn coordinate_or(field: Option<&str>, expected: &'static str, sentinel: i32) -> i32 {
    match field.map(|f| parse_coordinate(f, expected)) {
        Some(Ok(value)) => value,
        Some(Err(e)) => {
            trace!("{}", e);
            sentinel
        }
        None => sentinel,
    }
}

/// `round(degrees * 100000)` as an i32, rounding halves to even.
pub fn parse_coordinate(field: &str, expected: &'static str) -> Result<i32, Ov2Error> {
    let parse_error = || Ov2Error::ParseField {
        field: field.to_string(),
        expected,
    };

    let degrees: f64 = field.trim().parse().map_err(|_| parse_error())?;
    let scaled = (degrees * COORD_SCALE).round_ties_even();
    if !scaled.is_finite() || scaled < i32::MIN as f64 || scaled > i32::MAX as f64 {
        return Err(parse_error());
    }
    Ok(scaled as i32)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_line() {
        let record = parse_line("10.00000,20.00000,Cafe", ',');
        assert_eq!(record, PoiRecord::new(1_000_000, 2_000_000, "Cafe"));
    }

    #[test]
    fn test_trailing_empty_column_is_ignored() {
        let record = parse_line("10.00001,20.00000,Shop,", ',');
        assert_eq!(record, PoiRecord::new(1_000_001, 2_000_000, "Shop"));
    }

    #[test]
    fn test_fields_are_trimmed() {
        let record = parse_line(" 10 , 20 , Cafe , Shell ,  24h ", ',');
        assert_eq!(record.lon, 1_000_000);
        assert_eq!(record.lat, 2_000_000);
        assert_eq!(record.name, "Cafe");
        assert_eq!(record.extra.as_deref(), Some("Shell\024h"));

        // a blank trailing column is still dropped
        let record = parse_line("10,20, Cafe,  ", ',');
        assert_eq!(record, PoiRecord::new(1_000_000, 2_000_000, "Cafe"));

        // a name of only spaces is empty and fails validation
        assert!(!parse_line("10,20,   ", ',').is_valid());
    }

    #[test]
    fn test_fourth_column_leaves_dangling_terminator() {
        let record = parse_line("1,2,Fuel,Shell", ',');
        assert_eq!(record.extra.as_deref(), Some("Shell\0"));
    }

    #[test]
    fn test_fourth_and_fifth_columns() {
        let record = parse_line("1,2,Fuel,Shell,+31 20 555,ignored", ',');
        assert_eq!(record.extra.as_deref(), Some("Shell\0+31 20 555"));
    }

    #[test]
    fn test_empty_fourth_with_fifth() {
        let record = parse_line("1,2,Fuel,,24h", ',');
        assert_eq!(record.extra.as_deref(), Some("\024h"));
    }

    #[test]
    fn test_bad_coordinates_use_sentinels() {
        let record = parse_line("east,north,Nowhere", ',');
        assert_eq!(record.lon, LON_SENTINEL);
        assert_eq!(record.lat, LAT_SENTINEL);
        assert!(!record.is_valid());
    }

    #[test]
    fn test_missing_fields() {
        let record = parse_line("4.5", ',');
        assert_eq!(record.lon, 450_000);
        assert_eq!(record.lat, LAT_SENTINEL);
        assert_eq!(record.name, "");
        assert_eq!(record.extra, None);
    }

    #[test]
    fn test_other_delimiter() {
        let record = parse_line("-0.5|51.25|Tower|tourism", '|');
        assert_eq!(record.lon, -50_000);
        assert_eq!(record.lat, 5_125_000);
        assert_eq!(record.extra.as_deref(), Some("tourism\0"));
    }

    #[test]
    fn test_parse_coordinate_rounding() {
        assert_eq!(parse_coordinate(" 12.345678 ", "longitude").unwrap(), 1_234_568);
        assert_eq!(parse_coordinate("-12.345674", "longitude").unwrap(), -1_234_567);
        assert_eq!(parse_coordinate("1e3", "latitude").unwrap(), 100_000_000);
    }

    #[test]
    fn test_parse_coordinate_errors() {
        assert!(parse_coordinate("", "longitude").is_err());
        assert!(parse_coordinate("NaN", "longitude").is_err());
        assert!(parse_coordinate("1e20", "longitude").is_err());
        let err = parse_coordinate("abc", "latitude").unwrap_err();
        assert!(!err.is_fatal());
    }
}
