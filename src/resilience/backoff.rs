//! Linear backoff between fetch attempts.

use std::time::Duration;

/// Delay before the attempt following `attempt`: `base * attempt`.
pub fn calculate_backoff(attempt: u32, base_ms: u64) -> Duration {
    Duration::from_millis(base_ms.saturating_mul(u64::from(attempt)))
}
