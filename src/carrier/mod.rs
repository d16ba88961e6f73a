//! Carrier integration subsystem.
//!
//! # Data Flow
//! ```text
//! reference number
//!     → client.rs (retry loop, one browser session per fetch)
//!     → browser.rs / chromium.rs (launch, navigate, capture responses)
//!     → intercept.rs (wait for the first matching captured response)
//!     → raw details payload (serde_json::Value)
//! ```
//!
//! # Design Decisions
//! - Structured data comes from the portal's own API calls, not the DOM
//! - source.rs is the adapter seam the tracking service depends on
//! - Browser library specifics stay inside chromium.rs

pub mod browser;
pub mod chromium;
pub mod client;
pub mod error;
pub mod intercept;
pub mod source;

pub use browser::{BrowserLauncher, BrowserSession};
pub use chromium::ChromiumLauncher;
pub use client::{BrowserTrackingClient, FetchOptions};
pub use error::{TrackingError, TrackingResult};
pub use intercept::{wait_for_match, CapturedResponse, WaitError};
pub use source::TrackingSource;
