//! Shipment domain model.
//!
//! # Data Flow
//! ```text
//! carrier details payload (serde_json::Value)
//!     → normalize.rs (structural reshape, defaults for absent data)
//!     → model.rs ShipmentData (immutable, shared via Arc)
//! ```

pub mod model;
pub mod normalize;

pub use model::{
    Address, DeliveryDate, EventLocation, Package, PackageEvent, PackageSummary, ShipmentData,
    TrackingEvent,
};
pub use normalize::normalize;
