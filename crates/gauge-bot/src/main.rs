//! Twitch chat vote gauge - Entry Point

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

/// Count +2 / -2 votes in Twitch chat and show them on a web gauge
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Environment file to load (default: .env in the working directory, if present)
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Web server port (overrides PORT)
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // TLS provider must be installed before the chat socket opens
    gauge_chat::init_crypto();

    let args = Args::parse();

    // Load .env before logging so RUST_LOG / RUST_ENV from the file apply
    let env_file = match &args.env_file {
        Some(path) => Some(
            dotenvy::from_path(path)
                .map(|()| path.clone())
                .with_context(|| format!("Failed to load env file {}", path.display()))?,
        ),
        None => dotenvy::dotenv().ok(),
    };

    gauge_telemetry::init_logging()?;

    info!("Starting gauge-bot v{}", env!("CARGO_PKG_VERSION"));
    if let Some(path) = env_file {
        info!(env_file = %path.display(), "Loaded environment file");
    }

    let config = gauge_bot::AppConfig::from_env()?.with_port(args.port);
    info!(?config, "Configuration loaded");

    gauge_bot::Application::new(config).run().await?;

    Ok(())
}
