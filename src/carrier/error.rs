//! Carrier fetch error definitions.

use thiserror::Error;

/// Errors that can occur while fetching tracking data from the carrier.
///
/// Every variant except [`TrackingError::NotFound`] is an upstream failure
/// and is reported to API clients as `502`. The type is `Clone` because one
/// failed fetch is handed to every caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackingError {
    /// The carrier affirmatively reports no shipment for the reference.
    #[error("{0}")]
    NotFound(String),

    /// Browser could not be started.
    #[error("Browser launch failed: {0}")]
    Launch(String),

    /// Page navigation failed.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// A per-attempt wait ran out.
    #[error("Timed out after {millis} ms waiting for {stage}")]
    Timeout { stage: &'static str, millis: u64 },

    /// The search response was not JSON. The page format likely changed.
    #[error("{0}")]
    UnexpectedFormat(String),

    /// The search endpoint answered with an error status.
    #[error("Search failed ({status}): {message}")]
    SearchFailed { status: u16, message: String },

    /// The browser stopped delivering network responses.
    #[error("Network capture closed: {0}")]
    ChannelClosed(String),

    /// The captured details payload lacks the expected fields.
    #[error("Captured JSON does not match expected tracking schema (blocked, rate-limited, or site changed).")]
    SchemaMismatch,

    /// The reference could not be embedded in the tracking URL.
    #[error("Invalid tracking reference: {0}")]
    InvalidReference(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl TrackingError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, TrackingError::NotFound(_))
    }

    /// Whether another navigation attempt could change the outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            TrackingError::Navigation(_)
                | TrackingError::Timeout { .. }
                | TrackingError::SearchFailed { .. }
                | TrackingError::ChannelClosed(_)
        )
    }

    /// Short label for logs and metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            TrackingError::NotFound(_) => "not_found",
            TrackingError::Launch(_) => "launch",
            TrackingError::Navigation(_) => "navigation",
            TrackingError::Timeout { .. } => "timeout",
            TrackingError::UnexpectedFormat(_) => "unexpected_format",
            TrackingError::SearchFailed { .. } => "search_failed",
            TrackingError::ChannelClosed(_) => "channel_closed",
            TrackingError::SchemaMismatch => "schema_mismatch",
            TrackingError::InvalidReference(_) => "invalid_reference",
            TrackingError::Internal(_) => "internal",
        }
    }
}

/// Result type for carrier operations.
pub type TrackingResult<T> = Result<T, TrackingError>;
