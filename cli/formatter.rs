use colored::*;
use std::path::Path;
use std::time::Duration;

use crate::error::Ov2Error;
use crate::optimizer::FileOutcome;

pub struct OutputFormatter;

impl OutputFormatter {
    pub fn format_outcome(input: &Path, result: &Result<FileOutcome, Ov2Error>) -> String {
        let name = input.display().to_string();
        match result {
            Ok(FileOutcome::Written {
                output,
                accepted,
                rejected,
                bytes,
                stats,
                load_time,
                encode_time,
            }) => {
                let mut line = format!(
                    "{} {} -> {}: {} POI in {} blocks, {} (load {}, encode {})",
                    "✔".green(),
                    name.cyan(),
                    output.display().to_string().cyan(),
                    accepted.to_string().green(),
                    (stats.leaves + stats.branches).to_string().blue(),
                    Self::format_size(*bytes),
                    Self::format_duration(*load_time),
                    Self::format_duration(*encode_time),
                );
                if *rejected > 0 {
                    line.push_str(&format!(", {} rejected", rejected.to_string().yellow()));
                }
                line
            }
            Ok(FileOutcome::Empty { rejected }) => format!(
                "{} {}: no valid POI ({} rejected), nothing written",
                "!".yellow(),
                name.cyan(),
                rejected
            ),
            Err(err) => format!("{} {}: {}", "✘".red(), name.cyan(), err.to_string().red()),
        }
    }

    pub fn format_size(bytes: usize) -> String {
        if bytes < 1024 {
            format!("{} B", bytes)
        } else if bytes < 1024 * 1024 {
            format!("{:.1} KiB", bytes as f64 / 1024.0)
        } else {
            format!("{:.1} MiB", bytes as f64 / (1024.0 * 1024.0))
        }
    }

    pub fn format_duration(duration: Duration) -> String {
        let millis = duration.as_secs_f64() * 1000.0;
        if millis < 1000.0 {
            format!("{:.1} ms", millis)
        } else {
            format!("{:.2} s", millis / 1000.0)
        }
    }

    pub fn format_batch_prompt(count: usize) -> String {
        format!(
            "Optimize {} files, replacing any existing .ov2 outputs? [y/N] ",
            count.to_string().yellow()
        )
    }

    pub fn format_batch_summary(written: usize, empty: usize, failed: usize) -> String {
        let failed_text = if failed > 0 {
            failed.to_string().red().to_string()
        } else {
            failed.to_string()
        };
        format!(
            "{} written, {} empty, {} failed",
            written.to_string().green(),
            empty.to_string().yellow(),
            failed_text
        )
    }
}
