//! Chromium-backed browser sessions over the DevTools protocol.
//!
//! # Responsibilities
//! - Launch an isolated Chromium per session
//! - Drive the CDP connection on a background task
//! - Turn `Network.responseReceived` + `Network.loadingFinished` pairs into
//!   [`CapturedResponse`] messages, including JSON bodies
//!
//! # Design Decisions
//! - Bodies are only fetched for JSON responses; the tracker never reads
//!   anything else
//! - A response whose loading failed is dropped, never published

use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::{
    EnableParams, EventLoadingFailed, EventLoadingFinished, EventResponseReceived,
    GetResponseBodyParams, RequestId,
};
use chromiumoxide::listeners::EventStream;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures_util::StreamExt;
use std::collections::HashMap;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

use crate::carrier::browser::{BrowserLauncher, BrowserSession};
use crate::carrier::error::{TrackingError, TrackingResult};
use crate::carrier::intercept::CapturedResponse;
use crate::config::CarrierConfig;

/// Capacity of the per-session response channel.
const CAPTURE_CAPACITY: usize = 256;

/// Launches a new Chromium process for every session.
#[derive(Debug, Clone)]
pub struct ChromiumLauncher {
    config: CarrierConfig,
}

impl ChromiumLauncher {
    pub fn new(config: CarrierConfig) -> Self {
        Self { config }
    }

    fn browser_config(&self, headless: bool) -> TrackingResult<BrowserConfig> {
        let mut builder = BrowserConfig::builder()
            .window_size(self.config.window_width, self.config.window_height);
        if !headless {
            builder = builder.with_head();
        }
        if self.config.no_sandbox {
            builder = builder.no_sandbox();
        }
        if let Some(path) = &self.config.chrome_executable {
            builder = builder.chrome_executable(path);
        }
        builder.build().map_err(TrackingError::Launch)
    }
}

#[async_trait]
impl BrowserLauncher for ChromiumLauncher {
    async fn launch(&self, headless: bool) -> TrackingResult<Box<dyn BrowserSession>> {
        let config = self.browser_config(headless)?;
        let (browser, mut handler) = Browser::launch(config)
            .await
            .map_err(|e| TrackingError::Launch(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!(error = %e, "CDP handler error");
                }
            }
        });

        match open_page(&browser).await {
            Ok((page, pump)) => {
                tracing::debug!(headless, "Browser session started");
                Ok(Box::new(ChromiumSession {
                    browser,
                    page,
                    capture: pump.capture,
                    pump_task: pump.task,
                    handler_task,
                }))
            }
            Err(e) => {
                let mut browser = browser;
                let _ = browser.close().await;
                let _ = browser.wait().await;
                handler_task.abort();
                Err(e)
            }
        }
    }
}

struct Pump {
    capture: broadcast::Sender<CapturedResponse>,
    task: JoinHandle<()>,
}

async fn open_page(browser: &Browser) -> TrackingResult<(Page, Pump)> {
    let cdp = |e: chromiumoxide::error::CdpError| TrackingError::Launch(e.to_string());

    let page = browser.new_page("about:blank").await.map_err(cdp)?;
    page.execute(EnableParams::default()).await.map_err(cdp)?;

    let received = page.event_listener::<EventResponseReceived>().await.map_err(cdp)?;
    let finished = page.event_listener::<EventLoadingFinished>().await.map_err(cdp)?;
    let failed = page.event_listener::<EventLoadingFailed>().await.map_err(cdp)?;

    let (capture, _) = broadcast::channel(CAPTURE_CAPACITY);
    let task = tokio::spawn(pump_responses(
        page.clone(),
        received,
        finished,
        failed,
        capture.clone(),
    ));

    Ok((page, Pump { capture, task }))
}

/// Response metadata waiting for its body to finish loading.
struct PendingResponse {
    request_id: RequestId,
    url: String,
    status: u16,
    mime_type: String,
}

async fn pump_responses(
    page: Page,
    mut received: EventStream<EventResponseReceived>,
    mut finished: EventStream<EventLoadingFinished>,
    mut failed: EventStream<EventLoadingFailed>,
    capture: broadcast::Sender<CapturedResponse>,
) {
    let mut pending: HashMap<String, PendingResponse> = HashMap::new();

    loop {
        tokio::select! {
            Some(event) = received.next() => {
                let response = &event.response;
                pending.insert(
                    event.request_id.inner().clone(),
                    PendingResponse {
                        request_id: event.request_id.clone(),
                        url: response.url.clone(),
                        status: u16::try_from(response.status).unwrap_or_default(),
                        mime_type: response.mime_type.to_ascii_lowercase(),
                    },
                );
            }
            Some(event) = finished.next() => {
                let Some(meta) = pending.remove(event.request_id.inner()) else {
                    continue;
                };
                let body = if meta.mime_type.contains("json") {
                    response_body(&page, meta.request_id).await
                } else {
                    None
                };
                // No subscribers is fine: nobody is waiting right now.
                let _ = capture.send(CapturedResponse::new(meta.url, meta.status, &meta.mime_type, body));
            }
            Some(event) = failed.next() => {
                pending.remove(event.request_id.inner());
            }
            else => break,
        }
    }
}

async fn response_body(page: &Page, request_id: RequestId) -> Option<String> {
    match page.execute(GetResponseBodyParams::new(request_id)).await {
        Ok(reply) if !reply.result.base64_encoded => Some(reply.result.body.clone()),
        Ok(_) => None,
        Err(e) => {
            tracing::debug!(error = %e, "Could not read response body");
            None
        }
    }
}

/// A running Chromium with one page under observation.
pub struct ChromiumSession {
    browser: Browser,
    page: Page,
    capture: broadcast::Sender<CapturedResponse>,
    pump_task: JoinHandle<()>,
    handler_task: JoinHandle<()>,
}

#[async_trait]
impl BrowserSession for ChromiumSession {
    fn subscribe(&self) -> broadcast::Receiver<CapturedResponse> {
        self.capture.subscribe()
    }

    async fn navigate(&mut self, url: &str) -> TrackingResult<()> {
        self.page
            .goto(url)
            .await
            .map(|_| ())
            .map_err(|e| TrackingError::Navigation(e.to_string()))
    }

    async fn close(&mut self) -> TrackingResult<()> {
        self.pump_task.abort();
        let closed = self
            .browser
            .close()
            .await
            .map(|_| ())
            .map_err(|e| TrackingError::Internal(format!("browser close failed: {e}")));
        let _ = self.browser.wait().await;
        self.handler_task.abort();
        closed
    }
}
