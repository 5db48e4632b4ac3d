//! Binary crate for the `heatgrid` command-line tool.
//!
//! This crate focuses on:
//! - Parsing CLI arguments into grid queries
//! - Interactive credential configuration
//! - Human-friendly or JSON output

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "heatgrid=info,heatgrid_core=info".into()),
        )
        .with_writer(std::io::stderr)
        .with_target(true)
        .init();

    let cmd = cli::Cli::parse();
    cmd.run().await
}
