//! Binary crate for the `terraclima` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Serving the humidity endpoint over HTTP
//! - Interactive configuration
//! - Human-friendly output formatting

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_logging(cmd.log_level.as_deref());
    cmd.run().await
}

/// `RUST_LOG` wins over `--log-level`; both fall back to `info`.
fn init_logging(level: Option<&str>) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level.unwrap_or("info")))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
