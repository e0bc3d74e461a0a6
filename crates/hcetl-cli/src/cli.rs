//! CLI argument definitions for the encounter ETL.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "hcetl",
    version,
    about = "Healthcare encounter ETL - load a flat extract into a star schema",
    long_about = "Clean a flat healthcare encounter extract and load it as a star schema.\n\n\
                  Builds patient, doctor, hospital, and insurance dimensions with dense\n\
                  surrogate keys plus one admissions fact table, and loads them into\n\
                  SQLite or a directory of CSV files."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
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

    /// Allow raw cell values (PHI) in debug logs.
    #[arg(long = "log-data", global = true)]
    pub log_data: bool,

    /// TOML configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the full pipeline: extract, normalize, build the star schema, load.
    Run(RunArgs),

    /// Normalize the extract only and report field-level issues.
    Normalize(NormalizeArgs),

    /// Print the DDL of every target table.
    Schema(TargetArgs),
}

/// Target naming overrides shared by several commands.
#[derive(Args, Clone, Default)]
pub struct TargetArgs {
    /// Target schema name.
    #[arg(long = "schema", value_name = "NAME")]
    pub schema: Option<String>,

    /// Fact table name.
    #[arg(long = "fact-table", value_name = "NAME")]
    pub fact_table: Option<String>,
}

#[derive(Parser)]
pub struct RunArgs {
    /// Source CSV extract.
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    #[command(flatten)]
    pub target: TargetArgs,

    /// Sink driver.
    #[arg(long = "sink", value_enum)]
    pub sink: Option<SinkDriverArg>,

    /// SQLite database file, or output directory for the CSV sink.
    #[arg(long = "sink-path", value_name = "PATH")]
    pub sink_path: Option<PathBuf>,

    /// Abort when more than this many fields fail to parse.
    #[arg(long = "max-field-failures", value_name = "N")]
    pub max_field_failures: Option<usize>,

    /// Rows per insert statement.
    #[arg(long = "batch-size", value_name = "N")]
    pub batch_size: Option<usize>,

    /// Build dimensions one after another instead of in parallel.
    #[arg(long = "sequential")]
    pub sequential: bool,

    /// Run every stage except the load.
    #[arg(long = "dry-run")]
    pub dry_run: bool,

    /// Write the run report as JSON.
    #[arg(long = "report", value_name = "PATH")]
    pub report: Option<PathBuf>,
}

#[derive(Parser)]
pub struct NormalizeArgs {
    /// Source CSV extract.
    #[arg(value_name = "SOURCE")]
    pub source: Option<PathBuf>,

    /// Write the normalized rows to this CSV file.
    #[arg(long = "output", short = 'o', value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Abort when more than this many fields fail to parse.
    #[arg(long = "max-field-failures", value_name = "N")]
    pub max_field_failures: Option<usize>,

    /// Number of individual field issues to list.
    #[arg(long = "show-issues", value_name = "N", default_value_t = 20)]
    pub show_issues: usize,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum SinkDriverArg {
    Sqlite,
    Csv,
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
    Pretty,
    Compact,
    Json,
}
