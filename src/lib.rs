//! Shipment tracker library.
//!
//! Scrapes the carrier's public tracking portal through a real browser,
//! normalizes the captured payload and serves it over HTTP with caching and
//! request deduplication.

pub mod carrier;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod resilience;
pub mod shipment;
pub mod tracking;

pub use carrier::{BrowserTrackingClient, TrackingError, TrackingSource};
pub use config::TrackerConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use shipment::{normalize, ShipmentData};
pub use tracking::{Source, TrackingService};
