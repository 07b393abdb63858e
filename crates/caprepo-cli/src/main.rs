//! caprepo command line
//!
//! Finds capabilities in, and resolves maven artifacts into, a persistent
//! capability repository.

mod cli;
mod commands;
mod config;

use crate::cli::Cli;
use crate::config::CliConfig;
use anyhow::Result;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = CliConfig::load()?.with_overrides(
        cli.storage_dir.clone(),
        cli.maven_repository.clone(),
        cli.output,
    );

    init_tracing(&config.log_level)?;
    debug!("Loaded configuration: {:?}", config);

    commands::run(cli.command, &config).await
}

/// Initialize tracing subscriber, logging to stderr
fn init_tracing(default_filter: &str) -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialize tracing: {}", e))?;

    Ok(())
}
