//! Network response interception.
//!
//! A browser session publishes every response it observes on a broadcast
//! channel. Callers subscribe before navigating and then wait for the first
//! response a matcher accepts, bounded by a timeout.

use serde_json::Value;
use std::time::Duration;
use tokio::sync::broadcast::{self, error::RecvError};
use tokio::time::timeout;

/// A network response observed by the browser.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedResponse {
    pub url: String,
    pub status: u16,
    /// Lowercased content type / MIME type.
    pub content_type: String,
    /// Response body, when it was captured as text.
    pub body: Option<String>,
}

impl CapturedResponse {
    pub fn new(url: impl Into<String>, status: u16, content_type: &str, body: Option<String>) -> Self {
        Self {
            url: url.into(),
            status,
            content_type: content_type.to_ascii_lowercase(),
            body,
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_json(&self) -> bool {
        self.content_type.contains("application/json")
    }

    /// Body text, empty when nothing was captured.
    pub fn text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }

    /// Body parsed as JSON.
    pub fn json(&self) -> Option<Value> {
        serde_json::from_str(self.body.as_deref()?).ok()
    }
}

/// Why a wait ended without a match.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitError {
    Timeout,
    Closed,
}

/// Wait for the first captured response for which `matcher` returns `Some`.
///
/// Responses the matcher rejects are skipped. A lagging receiver keeps
/// waiting on newer messages.
pub async fn wait_for_match<T, F>(
    responses: &mut broadcast::Receiver<CapturedResponse>,
    limit: Duration,
    mut matcher: F,
) -> Result<T, WaitError>
where
    F: FnMut(&CapturedResponse) -> Option<T>,
{
    let wait = async {
        loop {
            match responses.recv().await {
                Ok(response) => {
                    if let Some(found) = matcher(&response) {
                        return Ok(found);
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Response capture lagged");
                }
                Err(RecvError::Closed) => return Err(WaitError::Closed),
            }
        }
    };

    timeout(limit, wait).await.unwrap_or(Err(WaitError::Timeout))
}
