use std::io::{self, BufRead, Write};
use std::process::ExitCode;

use ov2tree::cli::{CliArgs, OutputFormatter};
use ov2tree::{FileOutcome, Optimizer, Ov2Config, Result};
use tracing::{info, Level};

fn main() -> ExitCode {
    let args = CliArgs::parse_args();

    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        return ExitCode::from(2);
    }

    match run(args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

/// Returns `Ok(false)` when at least one input failed.
fn run(args: CliArgs) -> Result<bool> {
    if args.generate_config {
        let config = Ov2Config::default();
        config.save_to_file(&args.config)?;
        println!("✅ Generated default configuration: {}", args.config);
        return Ok(true);
    }

    let mut config = Ov2Config::from_file(&args.config)?;
    args.apply_to(&mut config);
    config.validate()?;

    init_logging(&config.logging);
    info!("ov2-optimize {}", env!("CARGO_PKG_VERSION"));
    if config.logging.level == "debug" || config.logging.level == "trace" {
        config.print_summary();
    }

    let optimizer = Optimizer::new(config)?;

    if !args.is_batch() {
        let input = &args.inputs[0];
        let output = args
            .output
            .clone()
            .unwrap_or_else(|| optimizer.default_output(input));
        let result = optimizer.optimize_file(input, &output, args.dump_tree.as_deref());
        println!("{}", OutputFormatter::format_outcome(input, &result));
        return Ok(result.is_ok());
    }

    if !args.yes && !confirm_batch(args.inputs.len())? {
        println!("Aborted.");
        return Ok(true);
    }

    let (mut written, mut empty, mut failed) = (0, 0, 0);
    for (input, result) in optimizer.optimize_batch(&args.inputs) {
        match &result {
            Ok(FileOutcome::Written { .. }) => written += 1,
            Ok(FileOutcome::Empty { .. }) => empty += 1,
            Err(_) => failed += 1,
        }
        println!("{}", OutputFormatter::format_outcome(&input, &result));
    }
    println!("{}", OutputFormatter::format_batch_summary(written, empty, failed));

    Ok(failed == 0)
}

fn confirm_batch(count: usize) -> Result<bool> {
    print!("{}", OutputFormatter::format_batch_prompt(count));
    io::stdout().flush()?;

    let mut answer = String::new();
    io::stdin().lock().read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes"))
}

fn init_logging(config: &ov2tree::config::LoggingConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let filter = match config.level.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let log_file = match (config.output.as_str(), &config.log_file) {
        ("file", Some(path)) => {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            match std::fs::OpenOptions::new().create(true).append(true).open(path) {
                Ok(file) => Some(file),
                Err(e) => {
                    eprintln!("Cannot open log file {}: {}, logging to stdout", path.display(), e);
                    None
                }
            }
        }
        _ => None,
    };

    match log_file {
        Some(file) => {
            tracing_subscriber::registry()
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_writer(std::sync::Mutex::new(file))
                        .with_ansi(false)
                        .with_target(false),
                )
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
        None => {
            tracing_subscriber::registry()
                .with(tracing_subscriber::fmt::layer().with_target(false))
                .with(tracing_subscriber::filter::LevelFilter::from_level(filter))
                .init();
        }
    }
}
