use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::config::ConfigArgs;

#[derive(Subcommand)]
pub enum Commands {
    /// Decode a metrics response and flatten it into a labeled frame
    Convert(ConvertCommand),
    /// Decode a metrics response and summarize its segment tree
    Inspect(InspectCommand),
}

#[derive(Args)]
pub struct ConvertCommand {
    /// Response JSON file, or - for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: PathBuf,

    /// Write the rendered frame to FILE instead of stdout
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    #[command(flatten)]
    pub config: ConfigArgs,

    #[command(flatten)]
    pub logging: LoggingConfig,
}

#[derive(Args)]
pub struct InspectCommand {
    /// Response JSON file, or - for stdin
    #[arg(value_name = "INPUT", default_value = "-")]
    pub input: PathBuf,

    #[command(flatten)]
    pub logging: LoggingConfig,
}

/// Logging configuration that can be set via CLI or env vars
#[derive(Debug, Clone, Default, Args)]
pub struct LoggingConfig {
    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long = "log-level", env = "SEGFRAME_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Log filter directives
    #[arg(long = "log-filter", env = "SEGFRAME_LOG_FILTER")]
    pub log_filter: Option<String>,
}

impl LoggingConfig {
    pub fn get_effective_level(&self) -> &str {
        match (self.verbose, self.log_level.as_deref()) {
            (v, _) if v >= 2 => "trace", // -vv flag
            (1, _) => "debug",           // -v flag
            (0, Some(level)) => level,   // Configured level
            _ => "warn",                 // Default
        }
    }
}
