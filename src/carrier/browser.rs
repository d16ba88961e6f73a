//! Browser automation seam.
//!
//! The tracking client only needs three things from a browser: a stream of
//! captured network responses, navigation, and teardown. Keeping them behind
//! traits lets tests script sessions without a real browser.

use async_trait::async_trait;
use tokio::sync::broadcast;

use crate::carrier::error::TrackingResult;
use crate::carrier::intercept::CapturedResponse;

/// Starts isolated browser sessions.
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Launch a fresh session. Sessions are never pooled.
    async fn launch(&self, headless: bool) -> TrackingResult<Box<dyn BrowserSession>>;
}

/// One running browser with a single page.
#[async_trait]
pub trait BrowserSession: Send {
    /// Subscribe to responses captured from now on.
    fn subscribe(&self) -> broadcast::Receiver<CapturedResponse>;

    /// Navigate the page to `url`. Returns once the document has loaded.
    async fn navigate(&mut self, url: &str) -> TrackingResult<()>;

    /// Shut the browser down.
    async fn close(&mut self) -> TrackingResult<()>;
}
