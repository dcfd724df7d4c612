//! CLI argument definitions using clap.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// bulk - batch commands into blocks and fan them out to sinks
#[derive(Parser, Debug)]
#[command(
    name = "bulk",
    author,
    version,
    about = "Command batching pipeline",
    long_about = "Reads newline-delimited commands from stdin or TCP clients, groups them \n\
                  into blocks (every N commands, or explicit { ... } sections) and writes \n\
                  every block to the console and to files."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "BULK_VERBOSE")]
    pub verbose: u8,

    /// Suppress all log output except warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format (logs always go to stderr)
    #[arg(
        long,
        value_enum,
        default_value = "compact",
        global = true,
        env = "BULK_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    /// Prometheus metrics port (0 = disabled)
    #[arg(long, default_value = "0", global = true, env = "BULK_METRICS_PORT")]
    pub metrics_port: u16,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Batch commands read from stdin
    Run(RunArgs),

    /// Accept TCP clients and batch their commands
    Serve(ServeArgs),

    /// Validate configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Settings shared by every command that builds a pipeline
#[derive(Args, Debug, Clone, Default)]
pub struct PipelineArgs {
    /// Path to configuration file (TOML or JSON); defaults apply without one
    #[arg(short, long, env = "BULK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the output directory for block files
    #[arg(long, env = "BULK_OUTPUT_DIR")]
    pub output_dir: Option<PathBuf>,

    /// Override the number of file workers
    #[arg(long, env = "BULK_FILE_WORKERS")]
    pub file_workers: Option<usize>,

    /// Disable the console sink
    #[arg(long)]
    pub no_console: bool,

    /// Disable the file sink
    #[arg(long)]
    pub no_file: bool,
}

/// Arguments for the `run` command
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// Commands per block
    #[arg(env = "BULK_THRESHOLD")]
    pub threshold: Option<usize>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Arguments for the `serve` command
#[derive(Args, Debug, Clone)]
pub struct ServeArgs {
    /// Commands per block
    #[arg(env = "BULK_THRESHOLD")]
    pub threshold: Option<usize>,

    /// Override the listen port
    #[arg(short, long, env = "BULK_PORT")]
    pub port: Option<u16>,

    /// Override the listen address
    #[arg(long, env = "BULK_BIND")]
    pub bind: Option<String>,

    #[command(flatten)]
    pub pipeline: PipelineArgs,
}

/// Arguments for the `validate` command
#[derive(Args, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "bulk.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Args, Debug)]
pub struct InfoArgs {
    /// Path to configuration file (defaults apply without one)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Copy, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    Pretty,
    /// Compact single-line format
    #[default]
    Compact,
}

impl From<LogFormat> for observability::LogFormat {
    fn from(format: LogFormat) -> Self {
        match format {
            LogFormat::Json => Self::Json,
            LogFormat::Pretty => Self::Pretty,
            LogFormat::Compact => Self::Compact,
        }
    }
}
