// SPDX-License-Identifier: MIT OR Apache-2.0

#![forbid(unsafe_code)]

use clap::{Args, Parser, Subcommand, ValueEnum};
use dropoff_cli::{CliError, InputSummary, load_config, load_rows};
use dropoff_core::{BreakpointResult, DetectorConfig, Depth, DuplicatePolicy};
use dropoff_detect::BreakpointDetector;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

const DEFAULT_LOG_FILTER: &str = "dropoff_cli=info,dropoff_detect=info,dropoff_core=info";

#[derive(Parser, Debug)]
#[command(name = "dropoff", version, about = "Locate bottleneck and recovery depths in a drop-off curve")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect the two breakpoints of one depth/rate curve
    Detect(DetectArgs),
}

#[derive(Args, Debug)]
struct DetectArgs {
    /// Input series (.csv with depth,rate columns or .json array)
    #[arg(long)]
    input: PathBuf,

    /// Detector config JSON; flags below override its fields
    #[arg(long)]
    config: Option<PathBuf>,

    /// Inclusive upper depth of the early window
    #[arg(long)]
    early_max: Option<Depth>,

    /// Std-dev multiplier for the early threshold
    #[arg(long, allow_hyphen_values = true)]
    z_k: Option<f64>,

    /// Inclusive lower depth of the late window
    #[arg(long)]
    tail_min: Option<Depth>,

    /// Consecutive rising steps that confirm a late recovery
    #[arg(long)]
    n_pos: Option<usize>,

    /// Minimum separation pushed between the breakpoints
    #[arg(long)]
    min_gap: Option<Depth>,

    /// Which row wins when depths repeat
    #[arg(long, value_enum)]
    duplicates: Option<DuplicatesArg>,

    /// Write JSON output to this file instead of stdout
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DuplicatesArg {
    First,
    Last,
    Mean,
}

impl From<DuplicatesArg> for DuplicatePolicy {
    fn from(value: DuplicatesArg) -> Self {
        match value {
            DuplicatesArg::First => Self::First,
            DuplicatesArg::Last => Self::Last,
            DuplicatesArg::Mean => Self::Mean,
        }
    }
}

#[derive(Serialize)]
struct DetectOutput<'a> {
    command: &'static str,
    input: InputSummary,
    config: &'a DetectorConfig,
    result: BreakpointResult,
}

#[derive(Serialize)]
struct ErrorEnvelope {
    error: ErrorPayload,
}

#[derive(Serialize)]
struct ErrorPayload {
    code: String,
    message: String,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER)),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Detect(args) => handle_detect(args),
    };

    if let Err(err) = outcome {
        emit_structured_error(&err);
        process::exit(1);
    }
}

fn resolve_config(args: &DetectArgs) -> Result<DetectorConfig, CliError> {
    let mut config = match args.config.as_deref() {
        Some(path) => load_config(path)?,
        None => DetectorConfig::default(),
    };

    if let Some(early_max) = args.early_max {
        config.early_max = early_max;
    }
    if let Some(z_k) = args.z_k {
        config.z_k = z_k;
    }
    if let Some(tail_min) = args.tail_min {
        config.tail_min = tail_min;
    }
    if let Some(n_pos) = args.n_pos {
        config.n_pos = n_pos;
    }
    if let Some(min_gap) = args.min_gap {
        config.min_gap = min_gap;
    }
    if let Some(duplicates) = args.duplicates {
        config.duplicate_policy = duplicates.into();
    }

    Ok(config)
}

fn handle_detect(args: DetectArgs) -> Result<(), CliError> {
    let config = resolve_config(&args)?;
    let detector = BreakpointDetector::new(config)?;

    let input = load_rows(&args.input)?;
    tracing::info!(
        path = %input.path.display(),
        format = input.format,
        rows = input.rows.len(),
        "loaded drop-off series"
    );

    let summary = input.summary();
    let result = detector.detect(input.rows);
    for warning in &result.diagnostics.warnings {
        tracing::warn!(%warning, "detector warning");
    }

    write_json_output(
        &DetectOutput {
            command: "detect",
            input: summary,
            config: detector.config(),
            result,
        },
        args.output.as_deref(),
    )
}

fn write_json_output<T: Serialize>(payload: &T, output_path: Option<&Path>) -> Result<(), CliError> {
    let encoded = serde_json::to_string_pretty(payload)
        .map_err(|source| CliError::json("failed to serialize JSON output", source))?;

    if let Some(path) = output_path {
        fs::write(path, format!("{encoded}\n"))
            .map_err(|source| CliError::io(format!("failed to write '{}'", path.display()), source))?;
        tracing::info!(path = %path.display(), "wrote detection output");
        Ok(())
    } else {
        println!("{encoded}");
        Ok(())
    }
}

fn render_structured_error(err: &CliError) -> String {
    let envelope = ErrorEnvelope {
        error: ErrorPayload {
            code: err.code().to_string(),
            message: err.to_string(),
        },
    };

    serde_json::to_string_pretty(&envelope).unwrap_or_else(|_| {
        format!(
            "{{\"error\":{{\"code\":\"{}\",\"message\":\"{}\"}}}}",
            err.code(),
            err
        )
    })
}

fn emit_structured_error(err: &CliError) {
    eprintln!("{}", render_structured_error(err));
}
