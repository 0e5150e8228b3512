//! Top-level application orchestration.
//!
//! `src/main.rs` is intentionally tiny; this module is the "real main" that:
//! - loads `.env` and parses CLI arguments
//! - installs the log subscriber
//! - resolves paths into a `PipelineConfig`
//! - runs the requested pipeline steps and prints their reports

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::aggregate::{group_by_genre, sink_payload};
use crate::align::align_movie;
use crate::cli::{AlignArgs, Cli, Command, PathArgs, SummaryArgs};
use crate::domain::{PipelineConfig, RetentionWindow};
use crate::error::{AppError, PipelineError};
use crate::io::registry::{LoadedRegistry, Registry};
use crate::matcher::match_title;

pub mod pipeline;

pub const DEFAULT_METADATA: &str = "movie_metadata.csv";
pub const DEFAULT_TRENDS_DIR: &str = "movie-files";
pub const DEFAULT_RAW_PREFIX: &str = "multiTimeline";

const ENV_METADATA: &str = "HYPE_METADATA";
const ENV_TRENDS_DIR: &str = "HYPE_TRENDS_DIR";
const ENV_RAW_PREFIX: &str = "HYPE_RAW_PREFIX";

/// Entry point for the `hype` binary.
pub fn run() -> Result<(), AppError> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let config = config_from_args(&cli.paths, |key| std::env::var(key).ok());
    let loaded = load_registry(&config)?;
    let registry = &loaded.registry;

    match cli.command {
        Command::Reconcile => handle_reconcile(&config, registry),
        Command::Align(args) => handle_align(&config, registry, &args),
        Command::Summary(args) => handle_summary(&config, registry, &args),
        Command::Run(args) => {
            handle_reconcile(&config, registry)?;
            println!();
            handle_summary(&config, registry, &args)
        }
    }
}

/// Install the stderr log subscriber. `RUST_LOG` wins over `-v`.
fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Resolve paths: flag, then environment (via `env`), then default.
pub fn config_from_args(paths: &PathArgs, env: impl Fn(&str) -> Option<String>) -> PipelineConfig {
    let from_env = |key: &str| env(key).filter(|v| !v.trim().is_empty());

    PipelineConfig {
        metadata_path: paths
            .metadata
            .clone()
            .or_else(|| from_env(ENV_METADATA).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_METADATA)),
        trends_dir: paths
            .dir
            .clone()
            .or_else(|| from_env(ENV_TRENDS_DIR).map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_TRENDS_DIR)),
        raw_prefix: paths
            .prefix
            .clone()
            .or_else(|| from_env(ENV_RAW_PREFIX))
            .unwrap_or_else(|| DEFAULT_RAW_PREFIX.to_string()),
        window: RetentionWindow::DEFAULT,
    }
}

fn load_registry(config: &PipelineConfig) -> Result<LoadedRegistry, AppError> {
    let loaded = pipeline::load(config)?;
    if !loaded.row_errors.is_empty() {
        println!(
            "Registry: {} movies ({} rows skipped, see -v for details)",
            loaded.registry.len(),
            loaded.row_errors.len()
        );
    }
    Ok(loaded)
}

fn handle_reconcile(config: &PipelineConfig, registry: &Registry) -> Result<(), AppError> {
    let report = pipeline::run_reconcile(config, registry)?;
    print!("{}", crate::report::format_reconcile_report(&report));
    Ok(())
}

fn handle_align(config: &PipelineConfig, registry: &Registry, args: &AlignArgs) -> Result<(), AppError> {
    let owner = registry
        .get(&args.title)
        .or_else(|| match_title(&args.title, registry))
        .ok_or_else(|| AppError::from(PipelineError::UnmatchedTitle { label: args.title.clone() }))?;

    match align_movie(&config.trends_dir, owner, config.window) {
        Ok(aligned) => print!("{}", crate::report::format_aligned_series(&aligned)),
        Err(PipelineError::MissingSeriesFile { .. }) => {
            println!("skip  {}: no series file", owner.title);
        }
        Err(err) => return Err(err.into()),
    }
    Ok(())
}

fn handle_summary(config: &PipelineConfig, registry: &Registry, args: &SummaryArgs) -> Result<(), AppError> {
    let output = pipeline::run_summary(config, registry, args.genre.as_deref());

    print!("{}", crate::report::format_alignment_status(&output.alignment));
    println!();
    print!(
        "{}",
        crate::report::format_summary_table(&output.summaries, config.window)
    );
    println!();
    print!(
        "{}",
        crate::report::format_genre_groups(&group_by_genre(&output.alignment.series))
    );

    if let Some(path) = &args.export {
        crate::io::export::write_sink_json(path, &sink_payload(&output.alignment.series))?;
        println!("Exported aligned series to {}", path.display());
    }

    Ok(())
}
