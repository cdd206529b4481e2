//! File-level driver: load one input, partition, encode, write atomically.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use tracing::{debug, error, info, warn};

use crate::config::Ov2Config;
use crate::encoder::TreeEncoder;
use crate::error::{Ov2Error, Result};
use crate::index::PoiIndex;
use crate::loader::{LoadOutcome, Loader};
use crate::partition::{PartitionNode, Partitioner};

/// How an input file is read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    /// Delimited text, one POI per line.
    Text,
    /// Legacy OV2 binary.
    Ov2,
}

/// Shape of the tree written for one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TreeStats {
    pub records: usize,
    pub leaves: usize,
    pub branches: usize,
    pub depth: usize,
}

impl TreeStats {
    pub fn of(tree: &PartitionNode) -> Self {
        Self {
            records: tree.record_count(),
            leaves: tree.leaf_count(),
            branches: tree.branch_count(),
            depth: tree.depth(),
        }
    }
}

/// What happened to one input file.
#[derive(Debug, Clone, PartialEq)]
pub enum FileOutcome {
    /// An optimized file was written to `output`.
    Written {
        output: PathBuf,
        accepted: usize,
        rejected: usize,
        bytes: usize,
        stats: TreeStats,
        load_time: Duration,
        encode_time: Duration,
    },
    /// Nothing survived validation, so no file was written.
    Empty { rejected: usize },
}

impl FileOutcome {
    pub fn accepted(&self) -> usize {
        match self {
            FileOutcome::Written { accepted, .. } => *accepted,
            FileOutcome::Empty { .. } => 0,
        }
    }
}

/// Runs the load → partition → encode pipeline for input files.
#[derive(Debug, Clone)]
pub struct Optimizer {
    config: Ov2Config,
    loader: Loader,
}

impl Optimizer {
    pub fn new(config: Ov2Config) -> Result<Self> {
        config.validate()?;
        let loader = Loader::new()
            .with_delimiter(config.delimiter()?)
            .with_progress_interval(config.progress.interval);
        Ok(Self { config, loader })
    }

    pub fn config(&self) -> &Ov2Config {
        &self.config
    }

    /// Text for configured text extensions, OV2 otherwise.
    pub fn input_kind(&self, path: &Path) -> InputKind {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if self.config.is_text_extension(ext) => InputKind::Text,
            _ => InputKind::Ov2,
        }
    }

    /// `<stem>.<output extension>` next to `input`.
    pub fn default_output(&self, input: &Path) -> PathBuf {
        input.with_extension(&self.config.output.extension)
    }

    /// Load `path` into `index`, picking the reader by extension.
    pub fn load(&self, path: &Path, index: &mut PoiIndex) -> Result<LoadOutcome> {
        let reader = BufReader::new(File::open(path)?);
        match self.input_kind(path) {
            InputKind::Text => self.loader.load_text(reader, index),
            InputKind::Ov2 => self.loader.load_binary(reader, index),
        }
    }

    /// Optimize one file into `output`.
    ///
    /// When `dump_tree` is given the partition tree is also written there
    /// as JSON. Returns [`FileOutcome::Empty`] without touching `output`
    /// when no record was accepted.
    pub fn optimize_file(
        &self,
        input: &Path,
        output: &Path,
        dump_tree: Option<&Path>,
    ) -> Result<FileOutcome> {
        info!("Optimizing {}", input.display());

        let started = Instant::now();
        let mut index = PoiIndex::new();
        let loaded = self.load(input, &mut index)?;
        let load_time = started.elapsed();

        if loaded.is_empty() {
            warn!("{}: no valid records, nothing written", input.display());
            return Ok(FileOutcome::Empty {
                rejected: loaded.rejected,
            });
        }

        let started = Instant::now();
        let tree = Partitioner::new(self.config.tree.max_per_block)?.partition(&index, loaded.bounds);
        let stats = TreeStats::of(&tree);
        info!(
            "{}: {} records in {} blocks ({} leaves, depth {})",
            input.display(),
            stats.records,
            stats.leaves + stats.branches,
            stats.leaves,
            stats.depth
        );

        if let Some(path) = dump_tree {
            std::fs::write(path, tree.export_to_json()?)?;
            debug!("tree written to {}", path.display());
        }

        let total = stats.records;
        let mut progress = |processed: usize| debug!("encoded {}/{} records", processed, total);
        let bytes = TreeEncoder::with_progress_interval(self.config.progress.interval)
            .encode(&tree, &mut progress)?;
        let encode_time = started.elapsed();

        write_atomic(output, &bytes)?;
        info!("{}: wrote {} bytes to {}", input.display(), bytes.len(), output.display());

        Ok(FileOutcome::Written {
            output: output.to_path_buf(),
            accepted: loaded.accepted,
            rejected: loaded.rejected,
            bytes: bytes.len(),
            stats,
            load_time,
            encode_time,
        })
    }

    /// Optimize every input to its default output.
    ///
    /// A fatal error on one file is logged and recorded; the rest still run.
    pub fn optimize_batch(&self, inputs: &[PathBuf]) -> Vec<(PathBuf, Result<FileOutcome>)> {
        inputs
            .iter()
            .map(|input| {
                let output = self.default_output(input);
                let result = self.optimize_file(input, &output, None);
                if let Err(e) = &result {
                    error!("{}: {}", input.display(), e);
                }
                (input.clone(), result)
            })
            .collect()
    }
}

/// Write `bytes` to a `.tmp` sibling, then rename it over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let mut tmp_name = path
        .file_name()
        .ok_or_else(|| Ov2Error::Config(format!("Invalid output path: {}", path.display())))?
        .to_os_string();
    tmp_name.push(".tmp");
    let tmp = path.with_file_name(tmp_name);

    if let Err(e) = std::fs::write(&tmp, bytes).and_then(|_| std::fs::rename(&tmp, path)) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
