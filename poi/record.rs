use derive_more::Display;
use serde::{Deserialize, Serialize};

/// Degrees are stored as fixed-point integers: `degrees * COORD_SCALE`.
pub const COORD_SCALE: f64 = 100_000.0;

/// Largest valid absolute longitude in scaled units.
pub const MAX_LON: i32 = 18_000_000;

/// Largest valid absolute latitude in scaled units.
pub const MAX_LAT: i32 = 9_000_000;

/// A single point of interest.
#[derive(Debug, Display, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "{} @ ({}, {})", name, lon, lat)]
pub struct PoiRecord {
    pub lon: i32,
    pub lat: i32,
    pub name: String,
    /// Secondary text. When present the record is written as type 3.
    pub extra: Option<String>,
}

impl PoiRecord {
    pub fn new(lon: i32, lat: i32, name: impl Into<String>) -> Self {
        PoiRecord {
            lon,
            lat,
            name: name.into(),
            extra: None,
        }
    }

    pub fn with_extra(mut self, extra: impl Into<String>) -> Self {
        self.extra = Some(extra.into());
        self
    }

    /// Coordinates inside the world and a non-empty label.
    pub fn is_valid(&self) -> bool {
        (-MAX_LON..=MAX_LON).contains(&self.lon)
            && (-MAX_LAT..=MAX_LAT).contains(&self.lat)
            && !self.name.is_empty()
    }
}
