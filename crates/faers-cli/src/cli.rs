//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "faers-trend",
    version,
    about = "FAERS adverse-event trend analyzer",
    long_about = "Ingest FAERS quarterly ASCII dumps, build a consolidated adverse-event\n\
                  dataset with join diagnostics, aggregate it into monthly series, and\n\
                  detect statistically anomalous months."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,

    /// Allow case-level values in log output.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Build the consolidated event dataset and monthly aggregates.
    Build(BuildArgs),

    /// Detect and rank spikes in a monthly series.
    Spikes(SpikesArgs),

    /// List discovered quarterly folders and their table files.
    Quarters(QuartersArgs),
}

#[derive(Parser)]
pub struct BuildArgs {
    /// Raw data directory containing faers_ascii_YYYYqN folders.
    #[arg(value_name = "RAW_DIR")]
    pub raw_dir: PathBuf,

    /// Output directory for artifacts (default: <RAW_DIR>/../processed).
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Process only the N most recent quarters.
    #[arg(long = "limit-quarters", value_name = "N")]
    pub limit_quarters: Option<usize>,

    /// Field delimiter of the source files.
    #[arg(long = "delimiter", value_enum, default_value = "dollar")]
    pub delimiter: DelimiterArg,

    /// Rows per chunk when reading large files.
    #[arg(long = "chunk-size", value_name = "ROWS")]
    pub chunk_size: Option<usize>,

    /// Process and report without writing artifacts.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Disable the progress bar.
    #[arg(long = "no-progress")]
    pub no_progress: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum DelimiterArg {
    /// `$`-delimited (FAERS ASCII convention).
    Dollar,
    /// Tab-delimited.
    Tab,
}

impl DelimiterArg {
    pub fn as_byte(self) -> u8 {
        match self {
            DelimiterArg::Dollar => b'$',
            DelimiterArg::Tab => b'\t',
        }
    }
}

#[derive(Parser)]
pub struct SpikesArgs {
    /// Directory holding the monthly aggregate CSVs from `build`.
    #[arg(value_name = "DATA_DIR")]
    pub data_dir: PathBuf,

    /// Analyze one drug's series instead of the overall series.
    #[arg(long)]
    pub drug: Option<String>,

    /// Analyze one reaction's series instead of the overall series.
    #[arg(long, conflicts_with = "drug")]
    pub reaction: Option<String>,

    /// Detection method: seasonal (alias: stl) or rolling_z.
    #[arg(long, default_value = "seasonal")]
    pub method: String,

    /// Number of top spikes to report.
    #[arg(long = "top", value_name = "K", default_value_t = 3)]
    pub top: usize,

    /// Emit the summary as JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser)]
pub struct QuartersArgs {
    /// Raw data directory containing faers_ascii_YYYYqN folders.
    #[arg(value_name = "RAW_DIR")]
    pub raw_dir: PathBuf,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
