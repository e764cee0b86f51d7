use clap::{Parser, Subcommand, ValueEnum};
use std::fmt;

#[derive(Parser)]
#[command(name = "tokensync")]
#[command(about = "Collect AI coding tool token usage and sync it", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Data directory (defaults to $TOKENSYNC_PATH, then the platform data dir)
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Overrides RUST_LOG; defaults to warn
    #[arg(long, global = true)]
    pub log_level: Option<LogLevel>,

    /// Overrides `api_url` from config.toml
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Aggregate local usage without uploading anything
    Scan {
        /// Restrict to these sources (repeatable)
        #[arg(long)]
        source: Vec<String>,

        #[arg(long)]
        json: bool,

        /// Print per-unit decode errors
        #[arg(long)]
        verbose: bool,

        /// Number of models in the summary
        #[arg(long, default_value_t = 5)]
        top: usize,
    },

    /// Upload new usage records and advance checkpoints
    Sync {
        #[arg(long)]
        source: Vec<String>,

        /// Scan and report without uploading or writing the checkpoint
        #[arg(long)]
        dry_run: bool,

        #[arg(long)]
        json: bool,

        /// Print progress events
        #[arg(long)]
        verbose: bool,
    },

    /// List supported sources and whether their data is present
    Sources {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
#[value(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogLevel::Error => write!(f, "error"),
            LogLevel::Warn => write!(f, "warn"),
            LogLevel::Info => write!(f, "info"),
            LogLevel::Debug => write!(f, "debug"),
            LogLevel::Trace => write!(f, "trace"),
        }
    }
}
