//! Shipment tracker service.
//!
//! # Architecture Overview
//!
//! ```text
//!                         ┌──────────────────────────────────────────────────┐
//!                         │                 SHIPMENT TRACKER                 │
//!   GET /track?ref=…      │  ┌─────────┐   ┌──────────────┐   ┌───────────┐  │
//!  ───────────────────────┼─▶│  http   │──▶│   tracking   │──▶│  carrier  │──┼──▶ Chromium
//!                         │  │ server  │   │ cache/dedup  │   │  client   │  │    (portal)
//!                         │  └─────────┘   └──────┬───────┘   └─────┬─────┘  │
//!  ◀──────────────────────┼────────────────────── │ ◀── shipment ◀──┘        │
//!   { source, data }      │                       │    normalize             │
//!                         │  config · observability · resilience · lifecycle │
//!                         └──────────────────────────────────────────────────┘
//! ```

use clap::Parser;
use std::path::PathBuf;

use shipment_tracker::config::{load_config, override_bind_address, TrackerConfig};
use shipment_tracker::lifecycle::startup;
use shipment_tracker::observability::logging;

#[derive(Parser)]
#[command(name = "shipment-tracker")]
#[command(about = "Parcel tracking API backed by the carrier's public portal", long_about = None)]
struct Args {
    /// TOML configuration file. Defaults apply when omitted.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Override the listen address.
    #[arg(short, long)]
    bind: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => TrackerConfig::default(),
    };
    let config = override_bind_address(config, args.bind)?;

    logging::init_logging(&config.observability);
    tracing::info!("shipment-tracker v{} starting", env!("CARGO_PKG_VERSION"));

    startup::run(config).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
