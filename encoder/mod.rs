//! Serializes a [`PartitionNode`] tree into OV2 bytes.
//!
//! Every non-empty block is prefixed by a 21-byte skipper record carrying
//! the block's total byte length and bounds, so readers can step over whole
//! subtrees. Empty blocks produce no bytes at all.

pub mod progress;

use tracing::debug;

use crate::error::{Ov2Error, Result};
use crate::format::{latin1, RecordType, POI_HEADER_LEN, SKIPPER_LEN, TERMINATOR};
use crate::index::PoiIndex;
use crate::partition::{PartitionNode, Partitioner};
use crate::poi::{BoundingRect, PoiRecord};

pub use progress::{NoProgress, Progress};

/// Tree-to-bytes encoder.
#[derive(Debug, Clone, Copy)]
pub struct TreeEncoder {
    progress_interval: usize,
}

impl Default for TreeEncoder {
    fn default() -> Self {
        Self {
            progress_interval: 100,
        }
    }
}

enum Step<'a> {
    Enter(&'a PartitionNode),
    Close { start: usize },
}

impl TreeEncoder {
    /// Report progress every `interval` records (0 reports only at the end).
    pub fn with_progress_interval(interval: usize) -> Self {
        Self {
            progress_interval: interval,
        }
    }

    /// Encode `root` depth-first.
    ///
    /// Skipper lengths are patched in place once a block's body is known,
    /// so the whole file is built in one buffer without concatenation.
    pub fn encode(&self, root: &PartitionNode, progress: &mut dyn Progress) -> Result<Vec<u8>> {
        let mut out = Vec::new();
        let mut processed = 0usize;
        let mut stack = vec![Step::Enter(root)];

        while let Some(step) = stack.pop() {
            match step {
                Step::Enter(PartitionNode::Leaf { bounds, records }) => {
                    if records.is_empty() {
                        continue;
                    }
                    let start = begin_skipper(&mut out, bounds);
                    for record in records {
                        write_record(&mut out, record)?;
                        processed += 1;
                        if self.progress_interval > 0 && processed % self.progress_interval == 0 {
                            progress.update(processed);
                        }
                    }
                    finish_skipper(&mut out, start)?;
                }
                Step::Enter(PartitionNode::Branch { bounds, children }) => {
                    let start = begin_skipper(&mut out, bounds);
                    stack.push(Step::Close { start });
                    stack.push(Step::Enter(&children[1]));
                    stack.push(Step::Enter(&children[0]));
                }
                Step::Close { start } => finish_skipper(&mut out, start)?,
            }
        }

        let reported = self.progress_interval > 0
            && processed > 0
            && processed % self.progress_interval == 0;
        if !reported {
            progress.update(processed);
        }
        debug!("encoded {} records into {} bytes", processed, out.len());
        Ok(out)
    }
}

/// Encode a tree with no progress reporting.
pub fn encode(root: &PartitionNode) -> Result<Vec<u8>> {
    TreeEncoder::default().encode(root, &mut NoProgress)
}

/// Partition `bounds` against `index` and encode the result.
///
/// Returns an empty vector when `bounds` holds no records, and a
/// [`Ov2Error::Config`] when `max_per_block` is zero.
pub fn build_and_encode(
    index: &PoiIndex,
    bounds: BoundingRect,
    max_per_block: usize,
    progress: &mut dyn Progress,
) -> Result<Vec<u8>> {
    let tree = Partitioner::new(max_per_block)?.partition(index, bounds);
    TreeEncoder::default().encode(&tree, progress)
}

/// Byte length of `record` once encoded, header included.
pub fn record_len(record: &PoiRecord) -> usize {
    let mut text = latin1::encoded_len(&record.name) + 1;
    if let Some(extra) = &record.extra {
        text += latin1::encoded_len(extra) + 1;
    }
    POI_HEADER_LEN as usize + text
}

/// Append one type 2 or type 3 record.
pub fn write_record(out: &mut Vec<u8>, record: &PoiRecord) -> Result<()> {
    let kind = if record.extra.is_some() {
        RecordType::Extended
    } else {
        RecordType::Simple
    };
    let length = length_field(record_len(record))?;

    out.push(kind.tag());
    out.extend_from_slice(&length.to_le_bytes());
    out.extend_from_slice(&record.lon.to_le_bytes());
    out.extend_from_slice(&record.lat.to_le_bytes());
    latin1::encode_into(&record.name, out);
    out.push(TERMINATOR);
    if let Some(extra) = &record.extra {
        latin1::encode_into(extra, out);
        out.push(TERMINATOR);
    }
    Ok(())
}

// Writes a skipper with a zero length and returns where it starts.
fn begin_skipper(out: &mut Vec<u8>, bounds: &BoundingRect) -> usize {
    let start = out.len();
    out.push(RecordType::Skipper.tag());
    out.extend_from_slice(&0i32.to_le_bytes());
    for edge in [bounds.east, bounds.north, bounds.west, bounds.south] {
        out.extend_from_slice(&edge.to_le_bytes());
    }
    start
}

// Fills in the skipper length, or drops the skipper if nothing followed it.
fn finish_skipper(out: &mut Vec<u8>, start: usize) -> Result<()> {
    let total = out.len() - start;
    if total == SKIPPER_LEN {
        out.truncate(start);
        return Ok(());
    }
    let length = length_field(total)?;
    out[start + 1..start + 5].copy_from_slice(&length.to_le_bytes());
    Ok(())
}

fn length_field(len: usize) -> Result<i32> {
    i32::try_from(len).map_err(|_| Ov2Error::OutputTooLarge { len })
}
