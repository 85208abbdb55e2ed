//! Forex tick tracker - entry point.

use anyhow::Result;
use clap::Parser;
use tracing::info;

/// Forex tick tracker
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Configuration file path (can also be set via FXWATCH_CONFIG env var)
    #[arg(short, long)]
    config: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize TLS crypto provider (must be before any WS connections)
    fxwatch_ws::init_crypto();

    let args = Args::parse();

    fxwatch_telemetry::init_logging()?;

    info!("Starting fxwatch v{}", env!("CARGO_PKG_VERSION"));

    // Determine config path: CLI arg > FXWATCH_CONFIG env var > default
    let config_path = args
        .config
        .or_else(|| std::env::var("FXWATCH_CONFIG").ok())
        .unwrap_or_else(|| "config/default.toml".to_string());

    info!(config_path = %config_path, "Loading configuration");
    let config = fxwatch_app::AppConfig::load(&config_path)?;

    let app = fxwatch_app::Application::new(config)?;
    app.run().await?;

    Ok(())
}
