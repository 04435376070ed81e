//! CLI argument parsing.

use camino::Utf8PathBuf;
use clap::{Parser, ValueEnum};

/// Converts Angular class components into React function components.
#[derive(Debug, Parser)]
#[command(name = "ng2react")]
#[command(version, about, long_about = None)]
pub struct Args {
    /// Source root of the Angular project
    #[arg(long, default_value = "src")]
    pub src: Utf8PathBuf,

    /// Directory the converted project is written to
    #[arg(long)]
    pub out: Utf8PathBuf,

    /// Path to ng2react.json (defaults to one next to or above the source root)
    #[arg(long)]
    pub config: Option<Utf8PathBuf>,

    /// Output format
    #[arg(long, value_enum, default_value = "human")]
    pub output: OutputFormat,

    /// Glob patterns to ignore
    #[arg(long)]
    pub ignore: Vec<String>,

    /// Print converted TSX to stderr (for debugging)
    #[arg(long = "emit-tsx")]
    pub emit_tsx: bool,
}

/// Output format options.
#[derive(Debug, Clone, Copy, ValueEnum, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable output (default)
    #[default]
    Human,
    /// JSON output
    Json,
}
