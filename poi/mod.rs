pub mod record;
pub mod rectangle;

pub use record::{PoiRecord, COORD_SCALE, MAX_LAT, MAX_LON};
pub use rectangle::BoundingRect;
