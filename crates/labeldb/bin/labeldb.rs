//! `labeldb` binary entry point.
//!
//! A thin wrapper around the labeldb library that:
//! 1. Parses command-line arguments
//! 2. Initializes logging
//! 3. Runs the requested command
//!
//! For library usage, see the labeldb crate documentation.

use anyhow::Result;
use labeldb::Cli;

fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Log to stderr so `list` output stays clean on stdout
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(cli.default_log_level())),
        )
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!("Parsed arguments: {:?}", cli.command);

    labeldb::commands::run(cli.command)?;

    Ok(())
}
