//! Ledger - Command line entry point
//!
//! Loads configuration, installs logging, builds the session and runs one
//! command against the budget API.

mod cli;
mod commands;

use anyhow::Context;
use clap::Parser;
use ledger_infrastructure::{ClientConfig, build_session, init_logging};

use crate::cli::Cli;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config =
        ClientConfig::load(cli.config.as_deref()).context("failed to load configuration")?;
    init_logging(&config.log_filter).context("failed to initialize logging")?;

    tracing::info!("Starting ledger v{}", env!("CARGO_PKG_VERSION"));

    let session = build_session(&config).context("failed to create HTTP transport")?;
    commands::run(&session, &cli).await
}
