use std::convert::TryFrom;

/// Record tags understood by OV2 readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RecordType {
    /// A POI that was removed in place; its bytes are still present.
    Deleted = 0,
    /// Branch header holding the byte length and bounds of a subtree.
    Skipper = 1,
    Simple = 2,
    /// POI whose text carries a second terminator-separated field.
    Extended = 3,
}

impl RecordType {
    pub fn tag(self) -> u8 {
        self as u8
    }
}

impl TryFrom<u8> for RecordType {
    type Error = u8;

    fn try_from(tag: u8) -> Result<Self, Self::Error> {
        match tag {
            0 => Ok(RecordType::Deleted),
            1 => Ok(RecordType::Skipper),
            2 => Ok(RecordType::Simple),
            3 => Ok(RecordType::Extended),
            other => Err(other),
        }
    }
}
