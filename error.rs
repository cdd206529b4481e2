/// Errors raised while loading, building or writing OV2 data.
#[derive(Debug, thiserror::Error)]
pub enum Ov2Error {
    /// A single text field could not be parsed. Never aborts a load; the
    /// record carrying it is rejected by validation instead.
    #[error("Cannot parse field '{field}' as {expected}")]
    ParseField { field: String, expected: &'static str },

    #[error("Unknown record type {tag} at byte {offset}; the file is either encrypted or corrupt")]
    UnrecognizedRecordTag { tag: u8, offset: u64 },

    #[error("Input ends in the middle of a record at byte {offset}; the file is damaged")]
    TruncatedStream { offset: u64 },

    #[error("Record at byte {offset} declares impossible length {length}")]
    InvalidRecordLength { length: i32, offset: u64 },

    #[error("Encoded block of {len} bytes does not fit a 32-bit length field")]
    OutputTooLarge { len: usize },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}

impl Ov2Error {
    /// Fatal errors abort the current file; everything else is per-record.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, Ov2Error::ParseField { .. })
    }
}

impl From<::config::ConfigError> for Ov2Error {
    fn from(e: ::config::ConfigError) -> Self {
        Ov2Error::Config(e.to_string())
    }
}

impl From<toml::ser::Error> for Ov2Error {
    fn from(e: toml::ser::Error) -> Self {
        Ov2Error::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Ov2Error>;
