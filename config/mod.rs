use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::error::{Ov2Error, Result};

/// ov2tree settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ov2Config {
    /// Block partitioning
    pub tree: TreeConfig,

    /// Input parsing
    pub input: InputConfig,

    /// Output files
    pub output: OutputConfig,

    /// Progress reporting
    pub progress: ProgressConfig,

    /// Logging
    pub logging: LoggingConfig,
}

/// Block partitioning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TreeConfig {
    /// POI per block before a block is split
    #[serde(default = "default_max_per_block")]
    pub max_per_block: usize,
}

/// Input parsing
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// Column separator for text input (a single character)
    #[serde(default = "default_delimiter")]
    pub delimiter: String,

    /// Extensions read as delimited text; anything else is read as OV2
    #[serde(default = "default_text_extensions")]
    pub text_extensions: Vec<String>,
}

/// Output files
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Extension given to generated files
    #[serde(default = "default_extension")]
    pub extension: String,
}

/// Progress reporting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProgressConfig {
    /// Records between progress events (0 = only at the end)
    #[serde(default = "default_progress_interval")]
    pub interval: usize,
}

/// Logging
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log output: stdout, file
    #[serde(default = "default_log_output")]
    pub output: String,

    /// Log file path (when output = file)
    pub log_file: Option<PathBuf>,
}

// ============================================================================
// Defaults
// ============================================================================

fn default_max_per_block() -> usize {
    crate::partition::DEFAULT_MAX_PER_BLOCK
}

fn default_delimiter() -> String {
    ",".to_string()
}

fn default_text_extensions() -> Vec<String> {
    vec!["csv".to_string(), "txt".to_string()]
}

fn default_extension() -> String {
    "ov2".to_string()
}

fn default_progress_interval() -> usize {
    100
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_output() -> String {
    "stdout".to_string()
}

// ============================================================================
// Implementation
// ============================================================================

impl Default for Ov2Config {
    fn default() -> Self {
        Self {
            tree: TreeConfig {
                max_per_block: default_max_per_block(),
            },
            input: InputConfig {
                delimiter: default_delimiter(),
                text_extensions: default_text_extensions(),
            },
            output: OutputConfig {
                extension: default_extension(),
            },
            progress: ProgressConfig {
                interval: default_progress_interval(),
            },
            logging: LoggingConfig {
                level: default_log_level(),
                output: default_log_output(),
                log_file: None,
            },
        }
    }
}

impl Ov2Config {
    /// Load settings.
    ///
    /// Sources, lowest precedence first:
    /// 1. built-in defaults (embedded `default.toml`)
    /// 2. the user file at `path` (optional, missing is fine)
    /// 3. environment variables prefixed `OV2__`, `__` separating sections
    ///
    /// ```no_run
    /// use ov2tree::config::Ov2Config;
    ///
    /// let config = Ov2Config::from_file("ov2tree.toml").unwrap();
    /// ```
    pub fn from_file(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from_str(
                include_str!("default.toml"),
                config::FileFormat::Toml,
            ))
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::Environment::with_prefix("OV2").separator("__"))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// Write the settings as TOML.
    pub fn save_to_file(&self, path: &str) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_string)?;
        Ok(())
    }

    /// The configured delimiter as a `char`.
    pub fn delimiter(&self) -> Result<char> {
        let mut chars = self.input.delimiter.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(c),
            _ => Err(Ov2Error::Config(format!(
                "Delimiter must be a single character, got '{}'",
                self.input.delimiter
            ))),
        }
    }

    /// Whether a file with this extension is read as delimited text.
    pub fn is_text_extension(&self, extension: &str) -> bool {
        self.input
            .text_extensions
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Reject settings that cannot produce a valid run.
    pub fn validate(&self) -> Result<()> {
        if self.tree.max_per_block == 0 {
            return Err(Ov2Error::Config(
                "tree.max_per_block must be at least 1".to_string(),
            ));
        }

        self.delimiter()?;

        if self.output.extension.is_empty() {
            return Err(Ov2Error::Config("output.extension must not be empty".to_string()));
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => {
                return Err(Ov2Error::Config(format!(
                    "Invalid log level: '{}'. Must be one of: trace, debug, info, warn, error",
                    self.logging.level
                )))
            }
        }

        match self.logging.output.as_str() {
            "stdout" => {}
            "file" if self.logging.log_file.is_some() => {}
            "file" => {
                return Err(Ov2Error::Config(
                    "Log output is 'file' but log_file path is not specified".to_string(),
                ))
            }
            other => {
                return Err(Ov2Error::Config(format!(
                    "Invalid log output: '{}'. Must be one of: stdout, file",
                    other
                )))
            }
        }

        Ok(())
    }

    /// Print the effective settings.
    pub fn print_summary(&self) {
        println!("ov2tree configuration:");
        println!("   Max per block: {}", self.tree.max_per_block);
        println!("   Delimiter:     '{}'", self.input.delimiter);
        println!("   Text inputs:   {}", self.input.text_extensions.join(", "));
        println!("   Output ext:    {}", self.output.extension);
        println!("   Log level:     {}", self.logging.level);
        println!("   Log output:    {}", self.logging.output);
        if let Some(ref log_file) = self.logging.log_file {
            println!("   Log file:      {}", log_file.display());
        }
        println!();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Ov2Config::default();
        assert_eq!(config.tree.max_per_block, 20);
        assert_eq!(config.delimiter().unwrap(), ',');
        assert!(config.is_text_extension("CSV"));
        assert!(!config.is_text_extension("ov2"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = Ov2Config::default();

        config.tree.max_per_block = 0;
        assert!(config.validate().is_err());
        config.tree.max_per_block = 20;

        config.input.delimiter = ";;".to_string();
        assert!(config.validate().is_err());
        config.input.delimiter = String::new();
        assert!(config.validate().is_err());
        config.input.delimiter = "\t".to_string();
        assert!(config.validate().is_ok());

        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());
        config.logging.level = "debug".to_string();

        config.logging.output = "file".to_string();
        assert!(config.validate().is_err());
        config.logging.log_file = Some(PathBuf::from("ov2tree.log"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        let config = Ov2Config::from_file(path.to_str().unwrap()).unwrap();
        assert_eq!(config.tree.max_per_block, 20);
        assert_eq!(config.output.extension, "ov2");
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ov2tree.toml");
        let path = path.to_str().unwrap();

        let mut config = Ov2Config::default();
        config.tree.max_per_block = 12;
        config.input.delimiter = "|".to_string();
        config.save_to_file(path).unwrap();

        let loaded = Ov2Config::from_file(path).unwrap();
        assert_eq!(loaded.tree.max_per_block, 12);
        assert_eq!(loaded.delimiter().unwrap(), '|');
    }
}
