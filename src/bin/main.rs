//! segframe binary.
//!
//! Converts saved segmented metrics responses into labeled frames and
//! inspects their shape.

use clap::Parser;
use segframe_core::cli::commands::Commands;
use segframe_core::cli::{handle_convert, handle_inspect};
use tracing::debug;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::fmt::time::ChronoUtc;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Get logging config from command
    let logging = match &cli.command {
        Commands::Convert(cmd) => &cmd.logging,
        Commands::Inspect(cmd) => &cmd.logging,
    };

    // Logs go to stderr so stdout carries only the rendered output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(
                    logging
                        .get_effective_level()
                        .parse::<LevelFilter>()
                        .unwrap_or(LevelFilter::WARN)
                        .into(),
                )
                .parse_lossy(logging.log_filter.as_deref().unwrap_or_default()),
        )
        .with_writer(std::io::stderr)
        .with_timer(ChronoUtc::rfc_3339())
        .with_target(true)
        .init();

    debug!("segframe starting up");

    match &cli.command {
        Commands::Convert(cmd) => handle_convert(cmd),
        Commands::Inspect(cmd) => handle_inspect(cmd),
    }
}
