//! Turns CSV-style text or legacy OV2 bytes into validated POI records.
//!
//! Records are staged while a file is read and only handed to the
//! [`PoiIndex`] once the whole stream has been consumed, so a fatal error
//! part-way through leaves the index untouched.

pub mod binary;
pub mod text;

use std::io::{BufRead, Read};

use tracing::{debug, info, trace};

use crate::error::Result;
use crate::format::latin1;
use crate::index::PoiIndex;
use crate::poi::{BoundingRect, PoiRecord};

pub use binary::Ov2Decoder;
pub use text::{parse_line, LAT_SENTINEL, LON_SENTINEL};

/// Result of loading one input stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadOutcome {
    /// Records that passed validation and were added to the index.
    pub accepted: usize,
    /// Records dropped by validation.
    pub rejected: usize,
    /// Tight bounds of the accepted records, or [`BoundingRect::inverted`]
    /// when nothing was accepted.
    pub bounds: BoundingRect,
}

impl LoadOutcome {
    pub fn is_empty(&self) -> bool {
        self.accepted == 0
    }
}

/// Validation accumulator for a single stream.
#[derive(Debug, Default)]
struct Admission {
    staged: Vec<PoiRecord>,
    rejected: usize,
    bounds: BoundingRect,
}

impl Admission {
    fn offer(&mut self, record: PoiRecord, progress_interval: usize) {
        if !record.is_valid() {
            trace!("rejecting record {:?}", record);
            self.rejected += 1;
            return;
        }
        self.bounds.extend(record.lon, record.lat);
        self.staged.push(record);
        if progress_interval > 0 && self.staged.len() % progress_interval == 0 {
            debug!("{} records loaded", self.staged.len());
        }
    }

    fn commit(self, index: &mut PoiIndex) -> LoadOutcome {
        let accepted = self.staged.len();
        for record in self.staged {
            index.insert(record);
        }
        LoadOutcome {
            accepted,
            rejected: self.rejected,
            bounds: self.bounds,
        }
    }
}

/// Reads POI input into a [`PoiIndex`].
#[derive(Debug, Clone)]
pub struct Loader {
    delimiter: char,
    progress_interval: usize,
}

impl Default for Loader {
    fn default() -> Self {
        Self {
            delimiter: ',',
            progress_interval: 100,
        }
    }
}

impl Loader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: char) -> Self {
        self.delimiter = delimiter;
        self
    }

    /// Emit a debug event every `interval` accepted records (0 disables).
    pub fn with_progress_interval(mut self, interval: usize) -> Self {
        self.progress_interval = interval;
        self
    }

    pub fn delimiter(&self) -> char {
        self.delimiter
    }

    /// Load delimited text, one POI per line, Latin-1 encoded.
    ///
    /// Unparseable rows are dropped; only I/O failures are errors.
    pub fn load_text<R: BufRead>(&self, mut reader: R, index: &mut PoiIndex) -> Result<LoadOutcome> {
        let mut admission = Admission::default();
        let mut line = Vec::new();
        let mut line_no = 0usize;

        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            line_no += 1;

            let mut raw = line.as_slice();
            if let Some(stripped) = raw.strip_suffix(b"\n") {
                raw = stripped;
            }
            if let Some(stripped) = raw.strip_suffix(b"\r") {
                raw = stripped;
            }
            if raw.is_empty() {
                continue;
            }

            let record = parse_line(&latin1::decode(raw), self.delimiter);
            trace!("line {}: {:?}", line_no, record);
            admission.offer(record, self.progress_interval);
        }

        let outcome = admission.commit(index);
        info!(
            "Loaded {} text records ({} rejected) from {} lines",
            outcome.accepted, outcome.rejected, line_no
        );
        Ok(outcome)
    }

    /// Load a legacy OV2 stream.
    ///
    /// An unknown record tag or a stream that ends mid-record aborts the
    /// load and leaves `index` unchanged.
    pub fn load_binary<R: Read>(&self, reader: R, index: &mut PoiIndex) -> Result<LoadOutcome> {
        let mut admission = Admission::default();
        let mut decoder = Ov2Decoder::new(reader);

        for record in decoder.by_ref() {
            admission.offer(record?, self.progress_interval);
        }

        let outcome = admission.commit(index);
        info!(
            "Loaded {} OV2 records ({} rejected) from {} bytes",
            outcome.accepted,
            outcome.rejected,
            decoder.offset()
        );
        Ok(outcome)
    }
}
