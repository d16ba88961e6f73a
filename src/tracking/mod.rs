//! Request coordination in front of the carrier.
//!
//! # Data Flow
//! ```text
//! HTTP handler
//!     → service.rs (lookup order: cache → in flight → live)
//!     → cache.rs (TTL entries, lazy eviction)
//!     → inflight.rs (one shared fetch per reference)
//!     → carrier::TrackingSource
//! ```
//!
//! # Design Decisions
//! - State is owned by one TrackingService, shared via Arc, never global
//! - DashMap shard locks make check-then-insert atomic across threads
//! - No retries here; the carrier client is the only retry boundary

pub mod cache;
pub mod inflight;
pub mod service;

pub use cache::ShipmentCache;
pub use inflight::InFlightRegistry;
pub use service::{Source, Tracked, TrackingService};
