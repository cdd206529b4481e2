//! OV2 wire constants and the Latin-1 text codec shared by the loader and
//! the encoder.
//!
//! An OV2 file is a flat run of tagged records with no header or footer.
//! Every integer is a little-endian signed 32-bit value.

pub mod latin1;
pub mod record_type;

pub use record_type::RecordType;

/// Tag (1) + length (4) + east, north, west, south (4 × 4).
pub const SKIPPER_LEN: usize = 21;

/// Bytes after the tag of a skipper record.
pub const SKIPPER_PAYLOAD_LEN: usize = 20;

/// Tag (1) + length (4).
pub const DELETED_HEADER_LEN: i32 = 5;

/// Tag (1) + length (4) + lon (4) + lat (4).
pub const POI_HEADER_LEN: i32 = 13;

/// Smallest legal POI record: header plus a lone terminator.
pub const MIN_POI_LEN: i32 = POI_HEADER_LEN + 1;

/// Separates `name` from `extra`, and ends the text block.
pub const TERMINATOR: u8 = 0;
