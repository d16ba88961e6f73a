//! Retry logic.
//!
//! # Responsibilities
//! - Decide whether a failed attempt is followed by another one
//! - Compute the pause before it
//!
//! # Design Decisions
//! - The browser tracking client is the only retry boundary
//! - "Not found" is an answer, not a failure: never retried
//! - Attempts are bounded by a fixed budget, with linear backoff

use std::time::Duration;

use crate::carrier::TrackingError;
use crate::config::RetryConfig;
use crate::resilience::backoff::calculate_backoff;

/// Attempt budget and backoff for one fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay_ms: u64,
}

impl RetryPolicy {
    /// A budget of zero attempts is treated as one.
    pub fn new(max_attempts: u32, base_delay_ms: u64) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay_ms,
        }
    }

    pub fn from_config(config: &RetryConfig) -> Self {
        Self::new(config.max_attempts, config.base_delay_ms)
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Whether `error`, raised by attempt number `attempt` (1-based), gets
    /// another attempt.
    pub fn should_retry(&self, error: &TrackingError, attempt: u32) -> bool {
        attempt < self.max_attempts && error.is_retryable()
    }

    /// Pause after failed attempt number `attempt`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay_ms)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&RetryConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transient() -> TrackingError {
        TrackingError::Timeout { stage: "search response", millis: 1500 }
    }

    #[test]
    fn test_budget() {
        let policy = RetryPolicy::new(3, 100);
        assert!(policy.should_retry(&transient(), 1));
        assert!(policy.should_retry(&transient(), 2));
        assert!(!policy.should_retry(&transient(), 3));
    }

    #[test]
    fn test_not_found_never_retried() {
        let policy = RetryPolicy::new(5, 100);
        assert!(!policy.should_retry(&TrackingError::NotFound("gone".into()), 1));
    }

    #[test]
    fn test_zero_attempts_means_one() {
        let policy = RetryPolicy::new(0, 100);
        assert_eq!(policy.max_attempts(), 1);
        assert!(!policy.should_retry(&transient(), 1));
    }

    #[test]
    fn test_linear_delay() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_after(1), Duration::from_millis(1500));
        assert_eq!(policy.delay_after(2), Duration::from_millis(3000));
    }
}
