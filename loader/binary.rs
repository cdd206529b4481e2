use std::convert::TryFrom;
use std::io::{self, Read};

use tracing::trace;

use crate::error::{Ov2Error, Result};
use crate::format::{
    latin1, RecordType, DELETED_HEADER_LEN, MIN_POI_LEN, SKIPPER_PAYLOAD_LEN, TERMINATOR,
};
use crate::poi::PoiRecord;

/// Forward-only reader over an OV2 byte stream.
///
/// Yields the POI records (types 2 and 3) in file order and steps over
/// deleted records and skipper headers. The first error ends iteration.
pub struct Ov2Decoder<R> {
    inner: R,
    offset: u64,
    done: bool,
}

impl<R: Read> Ov2Decoder<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            offset: 0,
            done: false,
        }
    }

    /// Bytes consumed so far.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    fn next_record(&mut self) -> Result<Option<PoiRecord>> {
        loop {
            let record_start = self.offset;
            let Some(tag) = self.read_tag()? else {
                return Ok(None);
            };

            let kind = RecordType::try_from(tag).map_err(|tag| Ov2Error::UnrecognizedRecordTag {
                tag,
                offset: record_start,
            })?;

            match kind {
                RecordType::Deleted => {
                    let length = self.read_i32()?;
                    if length < DELETED_HEADER_LEN {
                        return Err(Ov2Error::InvalidRecordLength {
                            length,
                            offset: record_start,
                        });
                    }
                    trace!("skipping deleted record at byte {}", record_start);
                    self.skip((length - DELETED_HEADER_LEN) as u64)?;
                }
                RecordType::Skipper => {
                    self.skip(SKIPPER_PAYLOAD_LEN as u64)?;
                }
                RecordType::Simple | RecordType::Extended => {
                    return self.read_poi(kind, record_start).map(Some);
                }
            }
        }
    }

    fn read_poi(&mut self, kind: RecordType, record_start: u64) -> Result<PoiRecord> {
        let length = self.read_i32()?;
        if length < MIN_POI_LEN {
            return Err(Ov2Error::InvalidRecordLength {
                length,
                offset: record_start,
            });
        }
        let lon = self.read_i32()?;
        let lat = self.read_i32()?;
        let text = self.read_bytes((length - MIN_POI_LEN) as u64)?;
        // final terminator
        self.read_exact_array::<1>()?;

        let mut name = latin1::decode(&text);
        let mut extra = None;
        if kind == RecordType::Extended {
            if let Some(pos) = name.find(TERMINATOR as char) {
                extra = Some(name[pos + 1..].to_string());
                name.truncate(pos);
            }
        }

        Ok(PoiRecord {
            lon,
            lat,
            name,
            extra,
        })
    }

    /// `None` on a clean end of stream between records.
    fn read_tag(&mut self) -> Result<Option<u8>> {
        let mut tag = [0u8; 1];
        loop {
            match self.inner.read(&mut tag) {
                Ok(0) => return Ok(None),
                Ok(_) => {
                    self.offset += 1;
                    return Ok(Some(tag[0]));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            }
        }
    }

    fn read_i32(&mut self) -> Result<i32> {
        Ok(i32::from_le_bytes(self.read_exact_array::<4>()?))
    }

    fn read_exact_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let mut buf = [0u8; N];
        self.inner
            .read_exact(&mut buf)
            .map_err(|e| self.truncated_or_io(e))?;
        self.offset += N as u64;
        Ok(buf)
    }

    // Bounded by what the stream actually holds, so a corrupt length field
    // cannot force a huge allocation.
    fn read_bytes(&mut self, len: u64) -> Result<Vec<u8>> {
        let mut buf = Vec::new();
        let read = (&mut self.inner)
            .take(len)
            .read_to_end(&mut buf)
            .map_err(Ov2Error::Io)?;
        self.offset += read as u64;
        if (read as u64) < len {
            return Err(Ov2Error::TruncatedStream { offset: self.offset });
        }
        Ok(buf)
    }

    fn skip(&mut self, len: u64) -> Result<()> {
        let skipped = io::copy(&mut (&mut self.inner).take(len), &mut io::sink())?;
        self.offset += skipped;
        if skipped < len {
            return Err(Ov2Error::TruncatedStream { offset: self.offset });
        }
        Ok(())
    }

    fn truncated_or_io(&self, e: io::Error) -> Ov2Error {
        if e.kind() == io::ErrorKind::UnexpectedEof {
            Ov2Error::TruncatedStream {
                offset: self.offset,
            }
        } else {
            Ov2Error::Io(e)
        }
    }
}

impl<R: Read> Iterator for Ov2Decoder<R> {
    type Item = Result<PoiRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}
