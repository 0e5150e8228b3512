//! Command-line parsing for the trends reconciliation tool.
//!
//! Argument parsing stays here; `app` resolves the arguments into a
//! `PipelineConfig` and dispatches.

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand};

/// Top-level CLI.
#[derive(Debug, Parser)]
#[command(name = "hype", version, about = "Reconcile and align movie search-interest exports")]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,

    /// Increase log verbosity (-v info, -vv debug). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Match raw exports to registry titles and rewrite them as canonical series files.
    Reconcile,
    /// Print the release-aligned series of one movie.
    Align(AlignArgs),
    /// Align every registry movie and print interest summaries by movie and genre.
    Summary(SummaryArgs),
    /// Reconcile, then summarize.
    Run(SummaryArgs),
}

/// Locations of the registry and the trends directory.
///
/// Unset flags fall back to `HYPE_METADATA`, `HYPE_TRENDS_DIR`, `HYPE_RAW_PREFIX`,
/// then to the defaults.
#[derive(Debug, Args, Clone, Default)]
pub struct PathArgs {
    /// Registry CSV (Title, Release Date, Popularity, Vote Average, Genres).
    #[arg(long, value_name = "CSV", global = true)]
    pub metadata: Option<PathBuf>,

    /// Directory holding raw exports and canonical series files.
    #[arg(long, value_name = "DIR", global = true)]
    pub dir: Option<PathBuf>,

    /// File name prefix of raw exports.
    #[arg(long, value_name = "PREFIX", global = true)]
    pub prefix: Option<String>,
}

#[derive(Debug, Args, Clone)]
pub struct AlignArgs {
    /// Registry title (exact, or any label the matcher resolves).
    #[arg(short, long)]
    pub title: String,
}

#[derive(Debug, Args, Clone, Default)]
pub struct SummaryArgs {
    /// Only show movies whose primary genre matches (case-insensitive).
    #[arg(short, long)]
    pub genre: Option<String>,

    /// Write the aligned series (title -> genre + points) to a JSON file.
    #[arg(long, value_name = "JSON")]
    pub export: Option<PathBuf>,
}
