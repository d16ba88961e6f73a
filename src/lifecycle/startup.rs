//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Start background tasks (metrics, signal handling)
//! - Bind the listener and begin accepting traffic
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The listener binds last (traffic only when ready)

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;

use crate::carrier::BrowserTrackingClient;
use crate::config::TrackerConfig;
use crate::http::HttpServer;
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::tracking::TrackingService;

/// Tracking service backed by a real browser.
pub fn build_service(config: &TrackerConfig) -> Arc<TrackingService> {
    let client = BrowserTrackingClient::from_config(config);
    Arc::new(TrackingService::new(Arc::new(client), config.cache.ttl()))
}

/// Run the tracker until a termination signal arrives.
pub async fn run(config: TrackerConfig) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        bind_address = %config.listener.bind_address,
        headless = config.carrier.headless,
        max_attempts = config.retries.max_attempts,
        cache_ttl_secs = config.cache.ttl_secs,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr);
    }

    let server = HttpServer::new(build_service(&config));

    let shutdown = Shutdown::new();
    signals::spawn_signal_handler(shutdown.clone());

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    server.run(listener, shutdown.subscribe()).await?;
    Ok(())
}
