//! CLI argument definitions for tabload.

use std::path::PathBuf;

use clap::builder::TypedValueParser;
use clap::{ColorChoice, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;
use tracing::level_filters::LevelFilter;

use tabload_ingest::DEFAULT_SAMPLE_ROWS;
use tabload_load::DEFAULT_BATCH_SIZE;

use crate::logging::{LogConfig, LogFormat};

#[derive(Parser)]
#[command(
    name = "tabload",
    version,
    about = "Load a folder of delimited files into a relational database",
    long_about = "Load a folder of delimited files into a relational database.\n\n\
                  Each file becomes one table named after the file. Column types are\n\
                  inferred from a sample of rows, tables are created if absent, and\n\
                  rows are inserted in committed batches. Tables that already hold\n\
                  data are skipped, so re-running is safe."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pipe is `timestamp | level | message`).
    #[arg(long = "log-format", value_enum, default_value = "pipe", global = true)]
    pub log_format: LogFormatArg,

    /// Append logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    /// Build logging configuration from CLI flags with consistent precedence.
    ///
    /// `stderr_is_terminal` decides colors when the choice is `auto`.
    pub fn log_config(&self, stderr_is_terminal: bool) -> LogConfig {
        let level_filter = match self.log_level {
            Some(LogLevelArg::Error) => LevelFilter::ERROR,
            Some(LogLevelArg::Warn) => LevelFilter::WARN,
            Some(LogLevelArg::Info) => LevelFilter::INFO,
            Some(LogLevelArg::Debug) => LevelFilter::DEBUG,
            Some(LogLevelArg::Trace) => LevelFilter::TRACE,
            None => self.verbosity.tracing_level_filter(),
        };
        let format = match self.log_format {
            LogFormatArg::Pipe => LogFormat::Pipe,
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        };
        let with_ansi = match self.color.color {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => self.log_file.is_none() && stderr_is_terminal,
        };
        LogConfig {
            use_env_filter: !(self.verbosity.is_present() || self.log_level.is_some()),
            ..LogConfig::default()
        }
        .with_level_filter(level_filter)
        .with_format(format)
        .with_log_file(self.log_file.clone())
        .with_ansi(with_ansi)
    }
}

#[derive(Subcommand)]
pub enum Command {
    /// Create a table per source file and bulk-load its rows.
    Load(LoadArgs),

    /// Print the inferred schema of every source file without touching a database.
    Schema(SchemaArgs),
}

/// Options shared by every command that reads source files.
#[derive(clap::Args)]
pub struct SourceArgs {
    /// Folder containing the source files.
    #[arg(value_name = "SOURCE_DIR")]
    pub source_dir: PathBuf,

    /// Field delimiter (a single ASCII character).
    #[arg(long = "delimiter", default_value = ",", value_parser = parse_delimiter)]
    pub delimiter: u8,

    /// File extension that selects source files (case-insensitive).
    #[arg(long = "extension", default_value = "csv")]
    pub extension: String,

    /// Rows sampled per file for type inference.
    #[arg(long = "sample-rows", default_value_t = DEFAULT_SAMPLE_ROWS)]
    pub sample_rows: usize,
}

#[derive(Parser)]
pub struct LoadArgs {
    #[command(flatten)]
    pub source: SourceArgs,

    /// SQLite database file (default: <SOURCE_DIR>/tabload.db, `:memory:` for a throwaway run).
    #[arg(long = "database", value_name = "PATH")]
    pub database: Option<PathBuf>,

    /// Rows per insert batch; each batch is committed.
    #[arg(
        long = "batch-size",
        default_value_t = DEFAULT_BATCH_SIZE,
        value_parser = clap::value_parser!(u64).range(1..).map(|v| v as usize)
    )]
    pub batch_size: usize,

    /// Create tables only; do not insert rows.
    #[arg(long = "skip-load")]
    pub skip_load: bool,

    /// How to print the final summary.
    #[arg(long = "summary", value_enum, default_value = "table")]
    pub summary: SummaryFormatArg,
}

#[derive(Parser)]
pub struct SchemaArgs {
    #[command(flatten)]
    pub source: SourceArgs,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pipe,
    Pretty,
    Compact,
    Json,
}

/// Summary output choices.
#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SummaryFormatArg {
    Table,
    Json,
}

fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value.as_bytes() {
        [byte] if byte.is_ascii() => Ok(*byte),
        _ if value == "\\t" || value.eq_ignore_ascii_case("tab") => Ok(b'\t'),
        _ => Err(format!("delimiter must be a single ASCII character, got {value:?}")),
    }
}
