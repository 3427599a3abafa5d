//! skippy CLI entrypoint

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use skippy::cli::Cli;
use skippy::config;

#[tokio::main]
async fn main() -> Result<()> {
    // Verbose logging from the config file applies unless RUST_LOG is set
    let default_level = match config::config() {
        Ok(cfg) if cfg.settings.logging.verbose => "debug",
        _ => "info",
    };

    // Initialize tracing
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();

    // Parse and execute CLI
    let cli = Cli::parse();
    cli.execute().await
}
