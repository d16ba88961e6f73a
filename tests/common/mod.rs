//! Shared fakes for integration tests: scripted browser sessions and
//! gated tracking sources.

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::{broadcast, Semaphore};

use shipment_tracker::carrier::{
    BrowserLauncher, BrowserSession, BrowserTrackingClient, CapturedResponse, TrackingError,
    TrackingResult, TrackingSource,
};
use shipment_tracker::config::TrackerConfig;

pub const SEARCH_URL: &str =
    "https://www.dbschenker.com/nges-portal/api/public/tracking-public/shipments?query=1234567890";
pub const DETAILS_URL: &str =
    "https://www.dbschenker.com/nges-portal/api/public/tracking-public/shipments/LAND/STT1?language=en";

/// What the fake page does on one navigation.
#[derive(Debug, Clone)]
pub enum Attempt {
    /// Navigation succeeds and these responses are captured, in order.
    Respond(Vec<CapturedResponse>),
    /// Navigation fails.
    FailNavigation(String),
}

/// Launches sessions that replay a shared script, one entry per navigation.
/// Navigations past the end of the script capture nothing.
#[derive(Default)]
pub struct ScriptedLauncher {
    script: Arc<Mutex<VecDeque<Attempt>>>,
    pub launches: AtomicUsize,
    pub navigations: Arc<AtomicUsize>,
    pub closes: Arc<AtomicUsize>,
    pub fail_launch: bool,
    pub fail_close: bool,
}

impl ScriptedLauncher {
    pub fn new(attempts: Vec<Attempt>) -> Arc<Self> {
        Arc::new(Self {
            script: Arc::new(Mutex::new(attempts.into())),
            ..Default::default()
        })
    }

    pub fn with_flags(attempts: Vec<Attempt>, fail_launch: bool, fail_close: bool) -> Arc<Self> {
        Arc::new(Self {
            script: Arc::new(Mutex::new(attempts.into())),
            fail_launch,
            fail_close,
            ..Default::default()
        })
    }

    pub fn launches(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BrowserLauncher for ScriptedLauncher {
    async fn launch(&self, _headless: bool) -> TrackingResult<Box<dyn BrowserSession>> {
        if self.fail_launch {
            return Err(TrackingError::Launch("no browser available".into()));
        }
        self.launches.fetch_add(1, Ordering::SeqCst);
        let (capture, _) = broadcast::channel(64);
        Ok(Box::new(ScriptedSession {
            script: self.script.clone(),
            capture,
            navigations: self.navigations.clone(),
            closes: self.closes.clone(),
            fail_close: self.fail_close,
        }))
    }
}

struct ScriptedSession {
    script: Arc<Mutex<VecDeque<Attempt>>>,
    capture: broadcast::Sender<CapturedResponse>,
    navigations: Arc<AtomicUsize>,
    closes: Arc<AtomicUsize>,
    fail_close: bool,
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    fn subscribe(&self) -> broadcast::Receiver<CapturedResponse> {
        self.capture.subscribe()
    }

    async fn navigate(&mut self, _url: &str) -> TrackingResult<()> {
        self.navigations.fetch_add(1, Ordering::SeqCst);
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Attempt::Respond(responses)) => {
                for response in responses {
                    let _ = self.capture.send(response);
                }
                Ok(())
            }
            Some(Attempt::FailNavigation(message)) => Err(TrackingError::Navigation(message)),
            None => Ok(()),
        }
    }

    async fn close(&mut self) -> TrackingResult<()> {
        self.closes.fetch_add(1, Ordering::SeqCst);
        if self.fail_close {
            Err(TrackingError::Internal("close failed".into()))
        } else {
            Ok(())
        }
    }
}

pub fn search(status: u16, body: Value) -> CapturedResponse {
    CapturedResponse::new(SEARCH_URL, status, "application/json", Some(body.to_string()))
}

pub fn search_found() -> CapturedResponse {
    search(200, json!({ "result": [{ "id": "LAND/STT1" }] }))
}

pub fn search_empty() -> CapturedResponse {
    search(200, json!({ "result": [] }))
}

pub fn details(body: Value) -> CapturedResponse {
    CapturedResponse::new(DETAILS_URL, 200, "application/json", Some(body.to_string()))
}

pub fn details_example() -> CapturedResponse {
    details(json!({ "sttNumber": "X", "events": [{ "code": "ENT", "date": "2024-01-01" }] }))
}

/// A page load that finds the shipment.
pub fn found() -> Attempt {
    Attempt::Respond(vec![search_found(), details_example()])
}

/// Client over `launcher` with default timeouts and retry budget.
pub fn client(launcher: Arc<ScriptedLauncher>) -> BrowserTrackingClient {
    let config = TrackerConfig::default();
    BrowserTrackingClient::new(launcher, config.carrier, config.timeouts, config.retries)
}

/// Source that blocks every fetch until the test opens the gate.
pub struct GatedSource {
    pub calls: AtomicUsize,
    gate: Semaphore,
    outcome: TrackingResult<Value>,
}

impl GatedSource {
    pub fn new(outcome: TrackingResult<Value>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            gate: Semaphore::new(0),
            outcome,
        })
    }

    /// Let `n` pending or future fetches finish.
    pub fn release(&self, n: usize) {
        self.gate.add_permits(n);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TrackingSource for GatedSource {
    async fn fetch(&self, _reference: &str) -> TrackingResult<Value> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| TrackingError::Internal(e.to_string()))?;
        permit.forget();
        self.outcome.clone()
    }
}
