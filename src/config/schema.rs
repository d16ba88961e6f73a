//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the tracker.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the shipment tracker.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct TrackerConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Carrier portal and browser settings.
    pub carrier: CarrierConfig,

    /// Retry configuration for browser fetches.
    pub retries: RetryConfig,

    /// Per-attempt timeouts.
    pub timeouts: TimeoutConfig,

    /// Result cache settings.
    pub cache: CacheConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:4001").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:4001".to_string(),
        }
    }
}

/// Carrier portal configuration.
///
/// The endpoint markers are substrings matched against captured response
/// URLs; they pin the carrier's internal API shape.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CarrierConfig {
    /// Public tracking page. The reference is appended as `refNumber`.
    pub tracking_url: String,

    /// URL marker of the search (existence probe) endpoint.
    pub search_marker: String,

    /// URL marker of the details endpoint.
    pub details_marker: String,

    /// Query marker that distinguishes search calls from details calls.
    pub query_marker: String,

    /// Run the browser without a window.
    pub headless: bool,

    /// Explicit Chrome/Chromium executable. Auto-detected when unset.
    pub chrome_executable: Option<String>,

    /// Pass `--no-sandbox` to the browser (needed in most containers).
    pub no_sandbox: bool,

    /// Browser window width in pixels.
    pub window_width: u32,

    /// Browser window height in pixels.
    pub window_height: u32,
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            tracking_url: "https://www.dbschenker.com/app/tracking-public/?language_region=en-US_US"
                .to_string(),
            search_marker: "/nges-portal/api/public/tracking-public/shipments?query=".to_string(),
            details_marker: "/nges-portal/api/public/tracking-public/shipments/".to_string(),
            query_marker: "?query=".to_string(),
            headless: true,
            chrome_executable: None,
            no_sandbox: false,
            window_width: 1280,
            window_height: 800,
        }
    }
}

/// Retry configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Total attempts per fetch, including the first one.
    pub max_attempts: u32,

    /// Base delay for linear backoff in milliseconds (delay = base * attempt).
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay_ms: 1500,
        }
    }
}

/// Timeout configuration. Each bound applies to a single attempt.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Page navigation timeout in milliseconds.
    pub navigation_ms: u64,

    /// Wait for the search response in milliseconds.
    pub search_ms: u64,

    /// Wait for the details response in milliseconds.
    pub details_ms: u64,
}

impl TimeoutConfig {
    pub fn navigation(&self) -> Duration {
        Duration::from_millis(self.navigation_ms)
    }

    pub fn search(&self) -> Duration {
        Duration::from_millis(self.search_ms)
    }

    pub fn details(&self) -> Duration {
        Duration::from_millis(self.details_ms)
    }
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            navigation_ms: 30_000,
            search_ms: 1_500,
            details_ms: 30_000,
        }
    }
}

/// Result cache configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time-to-live of a cached shipment in seconds.
    pub ttl_secs: u64,
}

impl CacheConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self { ttl_secs: 60 }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TrackerConfig::default();
        assert_eq!(config.listener.bind_address, "0.0.0.0:4001");
        assert_eq!(config.retries.max_attempts, 3);
        assert_eq!(config.cache.ttl(), Duration::from_secs(60));
        assert_eq!(config.timeouts.search(), Duration::from_millis(1500));
        assert!(config.timeouts.details() > config.timeouts.search());
        assert!(config.carrier.headless);
    }

    #[test]
    fn test_partial_toml() {
        let config: TrackerConfig = toml::from_str(
            r#"
            [cache]
            ttl_secs = 5

            [observability]
            log_format = "json"
            "#,
        )
        .unwrap();

        assert_eq!(config.cache.ttl_secs, 5);
        assert_eq!(config.observability.log_format, LogFormat::Json);
        // Untouched sections keep their defaults
        assert_eq!(config.retries.base_delay_ms, 1500);
        assert_eq!(config.carrier.window_width, 1280);
    }
}
