use derive_more::Display;
use serde::{Deserialize, Serialize};

use super::record::{MAX_LAT, MAX_LON};

/// Axis-aligned rectangle in scaled coordinates (degrees × 100000).
///
/// Both edges are inclusive. Field order matches the OV2 skipper record.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[display(fmt = "[E {} N {} W {} S {}]", east, north, west, south)]
pub struct BoundingRect {
    pub east: i32,
    pub north: i32,
    pub west: i32,
    pub south: i32,
}

impl BoundingRect {
    pub fn new(east: i32, north: i32, west: i32, south: i32) -> Self {
        BoundingRect {
            east,
            north,
            west,
            south,
        }
    }

    /// The "nothing seen yet" rectangle: every edge sits at the opposite
    /// extreme, so the first accepted point collapses it onto itself.
    pub fn inverted() -> Self {
        BoundingRect {
            east: -MAX_LON,
            north: -MAX_LAT,
            west: MAX_LON,
            south: MAX_LAT,
        }
    }

    /// A rectangle covering a single point.
    pub fn from_point(lon: i32, lat: i32) -> Self {
        BoundingRect {
            east: lon,
            north: lat,
            west: lon,
            south: lat,
        }
    }

    /// True until at least one point has been absorbed.
    pub fn is_inverted(&self) -> bool {
        self.east < self.west || self.north < self.south
    }

    /// Grow the rectangle to include a point.
    pub fn extend(&mut self, lon: i32, lat: i32) {
        self.east = self.east.max(lon);
        self.west = self.west.min(lon);
        self.north = self.north.max(lat);
        self.south = self.south.min(lat);
    }

    /// Union of two rectangles.
    pub fn union(&self, other: &BoundingRect) -> BoundingRect {
        BoundingRect {
            east: self.east.max(other.east),
            north: self.north.max(other.north),
            west: self.west.min(other.west),
            south: self.south.min(other.south),
        }
    }

    /// Inclusive point test on all four edges.
    pub fn contains_point(&self, lon: i32, lat: i32) -> bool {
        self.west <= lon && lon <= self.east && self.south <= lat && lat <= self.north
    }

    /// Whether two rectangles share at least one integer point.
    pub fn intersects(&self, other: &BoundingRect) -> bool {
        self.west <= other.east
            && self.east >= other.west
            && self.south <= other.north
            && self.north >= other.south
    }

    pub fn lon_span(&self) -> i64 {
        self.east as i64 - self.west as i64
    }

    pub fn lat_span(&self) -> i64 {
        self.north as i64 - self.south as i64
    }

    /// A strip one unit wide or tall, or a single point.
    ///
    /// A zero span on only one axis is not degenerate: the other axis can
    /// still be halved.
    pub fn is_degenerate(&self) -> bool {
        let (lon, lat) = (self.lon_span(), self.lat_span());
        lon == 1 || lat == 1 || (lon <= 0 && lat <= 0)
    }

    /// Halve along longitude: `[west, mid]` and `[mid + 1, east]`.
    pub fn split_lon(&self) -> (BoundingRect, BoundingRect) {
        let mid = midpoint(self.east, self.west);
        (
            BoundingRect {
                east: mid,
                ..*self
            },
            BoundingRect {
                west: mid + 1,
                ..*self
            },
        )
    }

    /// Halve along latitude: `[south, mid]` and `[mid + 1, north]`.
    pub fn split_lat(&self) -> (BoundingRect, BoundingRect) {
        let mid = midpoint(self.north, self.south);
        (
            BoundingRect {
                north: mid,
                ..*self
            },
            BoundingRect {
                south: mid + 1,
                ..*self
            },
        )
    }
}

impl Default for BoundingRect {
    fn default() -> Self {
        Self::inverted()
    }
}

// Truncating division (rounds toward zero for negative sums).
fn midpoint(high: i32, low: i32) -> i32 {
    ((high as i64 + low as i64) / 2) as i32
}
