//! Browser tracking client.
//!
//! # Responsibilities
//! - Launch one isolated browser session per fetch
//! - Open the carrier tracking page for a reference
//! - Intercept the search (existence) response, then the details response
//! - Retry transient failures with linear backoff
//! - Close the session on every exit path
//!
//! # Protocol
//! ```text
//! navigate(tracking page?refNumber=REF)
//!     → search response (429 ignored)
//!         404 / result: []      → NotFound (terminal)
//!         not JSON / empty body → UnexpectedFormat (terminal)
//!         other non-2xx         → SearchFailed (retried)
//!     → details response (2xx JSON with sttNumber + events[])
//! ```

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use url::Url;

use crate::carrier::browser::{BrowserLauncher, BrowserSession};
use crate::carrier::chromium::ChromiumLauncher;
use crate::carrier::error::{TrackingError, TrackingResult};
use crate::carrier::intercept::{wait_for_match, CapturedResponse, WaitError};
use crate::carrier::source::TrackingSource;
use crate::config::{CarrierConfig, RetryConfig, TimeoutConfig, TrackerConfig};
use crate::observability::metrics;
use crate::resilience::RetryPolicy;

/// Per-call options of [`BrowserTrackingClient::fetch_tracking`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchOptions {
    pub headless: bool,
    pub max_attempts: u32,
}

impl Default for FetchOptions {
    fn default() -> Self {
        Self {
            headless: true,
            max_attempts: RetryConfig::default().max_attempts,
        }
    }
}

/// Scrapes the carrier's tracking portal by intercepting its internal API calls.
pub struct BrowserTrackingClient {
    launcher: Arc<dyn BrowserLauncher>,
    carrier: CarrierConfig,
    timeouts: TimeoutConfig,
    retries: RetryConfig,
}

impl BrowserTrackingClient {
    pub fn new(
        launcher: Arc<dyn BrowserLauncher>,
        carrier: CarrierConfig,
        timeouts: TimeoutConfig,
        retries: RetryConfig,
    ) -> Self {
        Self {
            launcher,
            carrier,
            timeouts,
            retries,
        }
    }

    /// Client driving a real Chromium.
    pub fn from_config(config: &TrackerConfig) -> Self {
        Self::new(
            Arc::new(ChromiumLauncher::new(config.carrier.clone())),
            config.carrier.clone(),
            config.timeouts.clone(),
            config.retries.clone(),
        )
    }

    /// Options taken from configuration.
    pub fn default_options(&self) -> FetchOptions {
        FetchOptions {
            headless: self.carrier.headless,
            max_attempts: self.retries.max_attempts,
        }
    }

    /// Tracking page URL with the reference as `refNumber`.
    pub fn tracking_url(&self, reference: &str) -> TrackingResult<Url> {
        let mut url = Url::parse(&self.carrier.tracking_url)
            .map_err(|e| TrackingError::InvalidReference(format!("bad tracking URL: {e}")))?;
        url.query_pairs_mut().append_pair("refNumber", reference);
        Ok(url)
    }

    /// Fetch the raw details payload for `reference`.
    pub async fn fetch_tracking(
        &self,
        reference: &str,
        options: FetchOptions,
    ) -> TrackingResult<Value> {
        let url = self.tracking_url(reference)?;
        let policy = RetryPolicy::new(options.max_attempts, self.retries.base_delay_ms);
        let started = Instant::now();

        let mut session = self.launcher.launch(options.headless).await?;
        let outcome = self
            .run_attempts(session.as_mut(), url.as_str(), reference, policy)
            .await;

        if let Err(e) = session.close().await {
            tracing::warn!(reference = %reference, error = %e, "Failed to close browser session");
        }

        let outcome = outcome.and_then(|details| {
            if has_tracking_shape(&details) {
                Ok(details)
            } else {
                Err(TrackingError::SchemaMismatch)
            }
        });

        match &outcome {
            Ok(_) => {
                tracing::info!(
                    reference = %reference,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Tracking details captured"
                );
                metrics::record_browser_session("success", started);
            }
            Err(e) => {
                tracing::info!(
                    reference = %reference,
                    error = %e,
                    kind = e.kind(),
                    "Tracking fetch failed"
                );
                metrics::record_browser_session(e.kind(), started);
            }
        }

        outcome
    }

    async fn run_attempts(
        &self,
        session: &mut dyn BrowserSession,
        url: &str,
        reference: &str,
        policy: RetryPolicy,
    ) -> TrackingResult<Value> {
        let mut attempt = 1;
        loop {
            match self.attempt(session, url).await {
                Ok(details) => {
                    metrics::record_fetch_attempt("success");
                    return Ok(details);
                }
                Err(e) if policy.should_retry(&e, attempt) => {
                    metrics::record_fetch_attempt(e.kind());
                    let delay = policy.delay_after(attempt);
                    tracing::warn!(
                        reference = %reference,
                        attempt,
                        max_attempts = policy.max_attempts(),
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Retrying tracking fetch"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(e) => {
                    metrics::record_fetch_attempt(e.kind());
                    return Err(e);
                }
            }
        }
    }

    /// One navigation plus the two response waits.
    async fn attempt(&self, session: &mut dyn BrowserSession, url: &str) -> TrackingResult<Value> {
        // Subscribe first: the search call fires while the page is still loading.
        let mut responses = session.subscribe();

        let navigation = self.timeouts.navigation();
        tokio::time::timeout(navigation, session.navigate(url))
            .await
            .map_err(|_| TrackingError::Timeout {
                stage: "page navigation",
                millis: self.timeouts.navigation_ms,
            })??;

        let search = wait_for_match(&mut responses, self.timeouts.search(), |r| {
            self.is_search_response(r).then(|| r.clone())
        })
        .await
        .map_err(|e| wait_error(e, "search response", self.timeouts.search_ms))?;

        check_search_response(&search)?;

        wait_for_match(&mut responses, self.timeouts.details(), |r| {
            self.details_payload(r)
        })
        .await
        .map_err(|e| wait_error(e, "details response", self.timeouts.details_ms))
    }

    fn is_search_response(&self, response: &CapturedResponse) -> bool {
        // The portal answers 429 to one of its own calls on every load.
        response.url.contains(&self.carrier.search_marker) && response.status != 429
    }

    fn details_payload(&self, response: &CapturedResponse) -> Option<Value> {
        if !response.is_success()
            || !response.url.contains(&self.carrier.details_marker)
            || response.url.contains(&self.carrier.query_marker)
            || !response.is_json()
        {
            return None;
        }
        let body = response.json()?;
        has_tracking_shape(&body).then_some(body)
    }
}

#[async_trait]
impl TrackingSource for BrowserTrackingClient {
    async fn fetch(&self, reference: &str) -> TrackingResult<Value> {
        self.fetch_tracking(reference, self.default_options()).await
    }
}

/// Classify the search response. `Ok` means the shipment exists.
fn check_search_response(response: &CapturedResponse) -> TrackingResult<()> {
    let text = response.text();
    if !response.is_json() || text.trim().is_empty() {
        return Err(TrackingError::UnexpectedFormat(format!(
            "Expected JSON but got {} content-type={} bodyLen={}",
            response.status,
            response.content_type,
            text.len()
        )));
    }

    let body: Value = serde_json::from_str(text).map_err(|e| {
        TrackingError::UnexpectedFormat(format!("Search response is not valid JSON: {e}"))
    })?;
    let message = body.get("message").and_then(Value::as_str);

    if response.status == 404 {
        return Err(TrackingError::NotFound(
            message.unwrap_or("Shipment not found").to_string(),
        ));
    }

    if !response.is_success() {
        return Err(TrackingError::SearchFailed {
            status: response.status,
            message: message.unwrap_or("Unknown error").to_string(),
        });
    }

    // The carrier reports "no shipment" as an empty result list with 200.
    if body
        .get("result")
        .and_then(Value::as_array)
        .is_some_and(Vec::is_empty)
    {
        return Err(TrackingError::NotFound("Tracking reference not found".to_string()));
    }

    Ok(())
}

/// Details payloads carry a truthy `sttNumber` and an `events` array.
pub fn has_tracking_shape(details: &Value) -> bool {
    let has_id = match details.get("sttNumber") {
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Number(n)) => n.as_f64() != Some(0.0),
        Some(Value::Bool(b)) => *b,
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    };
    has_id && details.get("events").is_some_and(Value::is_array)
}

fn wait_error(error: WaitError, stage: &'static str, millis: u64) -> TrackingError {
    match error {
        WaitError::Timeout => TrackingError::Timeout { stage, millis },
        WaitError::Closed => {
            TrackingError::ChannelClosed(format!("browser stopped while waiting for {stage}"))
        }
    }
}
