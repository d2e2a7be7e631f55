//! CLI argument definitions using clap.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// logspool - buffered spooling of message streams into rotated log files
#[derive(Parser, Debug)]
#[command(
    name = "logspool",
    author,
    version,
    about = "Buffered message spooling to rotated log files",
    long_about = "Reads newline-delimited records from stdin, batches them in \n\
                  fixed-capacity worker buffers, and writes them out as \n\
                  uniquely named, permissioned log files."
)]
pub struct Cli {
    /// Increase logging verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true, env = "LOGSPOOL_VERBOSE")]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(
        long,
        value_enum,
        default_value = "pretty",
        global = true,
        env = "LOGSPOOL_LOG_FORMAT"
    )]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Spool stdin records to log files
    Run(RunArgs),

    /// Validate a configuration file without running
    Validate(ValidateArgs),

    /// Display the effective configuration
    Info(InfoArgs),
}

/// Arguments for the `run` command
#[derive(Parser, Debug, Clone)]
pub struct RunArgs {
    /// Path to configuration file (TOML or JSON); defaults apply when omitted
    #[arg(short, long, env = "LOGSPOOL_CONFIG")]
    pub config: Option<PathBuf>,

    /// Override the final-file output directory
    #[arg(long, env = "LOGSPOOL_ROOT_DIR")]
    pub root_dir: Option<PathBuf>,

    /// Override the temp-file directory
    #[arg(long, env = "LOGSPOOL_TEMP_DIR")]
    pub temp_dir: Option<PathBuf>,

    /// Override the worker count
    #[arg(long, env = "LOGSPOOL_WORKERS")]
    pub workers: Option<usize>,

    /// Override the filename prefix
    #[arg(long, env = "LOGSPOOL_PREFIX")]
    pub prefix: Option<String>,

    /// Maximum number of records to spool (0 = unlimited)
    #[arg(long, default_value = "0", env = "LOGSPOOL_MAX_RECORDS")]
    pub max_records: u64,

    /// Metrics server port (0 = disabled)
    #[arg(long, default_value = "0", env = "LOGSPOOL_METRICS_PORT")]
    pub metrics_port: u16,
}

/// Arguments for the `validate` command
#[derive(Parser, Debug)]
pub struct ValidateArgs {
    /// Path to configuration file to validate
    #[arg(short, long, default_value = "spool.toml")]
    pub config: PathBuf,

    /// Output validation result as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for the `info` command
#[derive(Parser, Debug)]
pub struct InfoArgs {
    /// Path to configuration file; defaults apply when omitted
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

/// Log output format
#[derive(ValueEnum, Clone, Debug, Default)]
pub enum LogFormat {
    /// JSON structured logging
    Json,
    /// Human-readable pretty format
    #[default]
    Pretty,
    /// Compact single-line format
    Compact,
}
