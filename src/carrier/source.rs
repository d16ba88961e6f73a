//! Upstream adapter seam.
//!
//! The tracking service only knows that something can turn a reference into
//! the carrier's raw details payload. Swapping the interception strategy or
//! the carrier means providing another implementation of this trait.

use async_trait::async_trait;
use serde_json::Value;

use crate::carrier::error::TrackingResult;

#[async_trait]
pub trait TrackingSource: Send + Sync {
    /// Fetch the raw details payload for `reference`.
    ///
    /// # Errors
    ///
    /// Returns [`TrackingError::NotFound`](crate::carrier::TrackingError::NotFound)
    /// when the carrier reports no shipment, any other variant for upstream
    /// failures once retries are exhausted.
    async fn fetch(&self, reference: &str) -> TrackingResult<Value>;
}
