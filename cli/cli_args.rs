use clap::Parser;
use std::path::PathBuf;

use crate::config::Ov2Config;

#[derive(Parser, Debug)]
#[command(
    name = "ov2-optimize",
    version,
    about = "Rebuild OV2 POI files into a block tree for fast lookup",
    long_about = "ov2-optimize reads POI lists (delimited text or legacy OV2) and writes OV2 files\nwhose records are grouped into nested blocks of at most N POI, each preceded by a\nskipper record so navigation units can skip whole regions."
)]
pub struct CliArgs {
    /// Input files (.csv/.txt are read as text, anything else as OV2)
    #[arg(required_unless_present = "generate_config")]
    pub inputs: Vec<PathBuf>,

    /// Output file (single input only)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,

    /// Process several inputs without asking for confirmation
    #[arg(short = 'y', long = "yes")]
    pub yes: bool,

    /// Write the partition tree as JSON (single input only)
    #[arg(long = "dump-tree")]
    pub dump_tree: Option<PathBuf>,

    /// Config file path
    #[arg(short = 'c', long = "config", default_value = "ov2tree.toml")]
    pub config: String,

    /// Write a default config file to --config and exit
    #[arg(long)]
    pub generate_config: bool,

    /// POI per block (overrides config file)
    #[arg(long)]
    pub capacity: Option<usize>,

    /// Text column delimiter (overrides config file)
    #[arg(long)]
    pub delimiter: Option<String>,

    /// Log level (overrides config file)
    #[arg(long)]
    pub log_level: Option<String>,
}

impl CliArgs {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.generate_config {
            return Ok(());
        }

        if self.inputs.is_empty() {
            return Err("No input files specified.".to_string());
        }

        if self.is_batch() && self.output.is_some() {
            return Err("--output can only be used with a single input file".to_string());
        }

        if self.is_batch() && self.dump_tree.is_some() {
            return Err("--dump-tree can only be used with a single input file".to_string());
        }

        if self.capacity == Some(0) {
            return Err("Capacity must be greater than 0".to_string());
        }

        Ok(())
    }

    pub fn is_batch(&self) -> bool {
        self.inputs.len() > 1
    }

    /// Apply command-line overrides on top of loaded settings.
    pub fn apply_to(&self, config: &mut Ov2Config) {
        if let Some(capacity) = self.capacity {
            config.tree.max_per_block = capacity;
        }
        if let Some(delimiter) = &self.delimiter {
            config.input.delimiter = delimiter.clone();
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
    }
}
