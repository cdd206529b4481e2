use std::collections::BTreeMap;

use crate::poi::{BoundingRect, PoiRecord};

/// In-memory POI store ordered by longitude.
///
/// Keys are `(lon, insertion sequence)` so that records sharing a longitude
/// keep their load order and never collide.
#[derive(Debug, Default, Clone)]
pub struct PoiIndex {
    entries: BTreeMap<(i32, u64), PoiRecord>,
    next_seq: u64,
}

impl PoiIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, record: PoiRecord) {
        let key = (record.lon, self.next_seq);
        self.next_seq += 1;
        self.entries.insert(key, record);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Records inside `bounds` (inclusive on all sides), ascending by `lon`.
    ///
    /// Returns at most `limit + 1` records: one beyond the limit so callers
    /// can detect an overflowing block without a separate count.
    pub fn query_rect(&self, bounds: &BoundingRect, limit: usize) -> Vec<PoiRecord> {
        if bounds.is_inverted() {
            return Vec::new();
        }
        let wanted = limit.saturating_add(1);

        self.entries
            .range((bounds.west, u64::MIN)..=(bounds.east, u64::MAX))
            .map(|(_, record)| record)
            .filter(|record| bounds.south <= record.lat && record.lat <= bounds.north)
            .take(wanted)
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PoiRecord> {
        self.entries.values()
    }
}

impl FromIterator<PoiRecord> for PoiIndex {
    fn from_iter<I: IntoIterator<Item = PoiRecord>>(iter: I) -> Self {
        let mut index = PoiIndex::new();
        for record in iter {
            index.insert(record);
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_index() -> PoiIndex {
        vec![
            PoiRecord::new(30, 0, "c"),
            PoiRecord::new(10, 0, "a"),
            PoiRecord::new(20, 5, "b"),
            PoiRecord::new(10, 10, "a2"),
            PoiRecord::new(40, -5, "d"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_insert_and_len() {
        let index = sample_index();
        assert_eq!(index.len(), 5);
        assert!(!index.is_empty());
    }

    #[test]
    fn test_query_orders_by_lon() {
        let index = sample_index();
        let all = index.query_rect(&BoundingRect::new(100, 100, -100, -100), 100);
        let lons: Vec<i32> = all.iter().map(|r| r.lon).collect();
        assert_eq!(lons, vec![10, 10, 20, 30, 40]);
        // equal longitudes keep load order
        assert_eq!(all[0].name, "a");
        assert_eq!(all[1].name, "a2");
    }

    #[test]
    fn test_query_is_inclusive() {
        let index = sample_index();
        let hits = index.query_rect(&BoundingRect::new(30, 5, 20, 0), 100);
        let names: Vec<&str> = hits.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["b", "c"]);
    }

    #[test]
    fn test_query_returns_limit_plus_one() {
        let index = sample_index();
        let hits = index.query_rect(&BoundingRect::new(100, 100, -100, -100), 2);
        assert_eq!(hits.len(), 3);
        assert_eq!(index.query_rect(&BoundingRect::new(100, 100, -100, -100), 5).len(), 5);
    }

    #[test]
    fn test_query_empty_and_inverted_regions() {
        let index = sample_index();
        assert!(index.query_rect(&BoundingRect::new(5, 5, 1, 1), 10).is_empty());
        assert!(index.query_rect(&BoundingRect::inverted(), 10).is_empty());
        assert!(index.query_rect(&BoundingRect::new(9, 100, 11, -100), 10).is_empty());
    }
}
