//! Cache and request deduplication under concurrency.

mod common;

use common::*;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

use shipment_tracker::carrier::TrackingError;
use shipment_tracker::tracking::{Source, TrackingService};

const TTL: Duration = Duration::from_secs(60);

/// Let spawned callers run until they park on the shared fetch.
async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test]
async fn test_concurrent_callers_share_one_fetch() {
    let source = GatedSource::new(Ok(json!({ "sttNumber": "S1", "events": [] })));
    let service = Arc::new(TrackingService::new(source.clone(), TTL));

    let callers: Vec<_> = (0..10)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.get_tracking("1234567890").await })
        })
        .collect();

    settle().await;
    assert_eq!(service.in_flight_len(), 1);
    source.release(1);

    let mut results = Vec::new();
    for caller in callers {
        results.push(caller.await.unwrap().unwrap());
    }

    assert_eq!(source.calls(), 1);
    let live = results.iter().filter(|r| r.source == Source::Live).count();
    let deduped = results.iter().filter(|r| r.source == Source::Deduped).count();
    assert_eq!(live, 1);
    assert_eq!(deduped, 9);
    assert!(results.iter().all(|r| Arc::ptr_eq(&r.data, &results[0].data)));
    assert_eq!(results[0].data.stt_number.as_deref(), Some("S1"));

    assert_eq!(service.in_flight_len(), 0);
    let cached = service.get_tracking("1234567890").await.unwrap();
    assert_eq!(cached.source, Source::Cache);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_shared_failure_reaches_every_caller_and_is_not_cached() {
    let failure = TrackingError::Timeout {
        stage: "details response",
        millis: 30_000,
    };
    let source = GatedSource::new(Err(failure.clone()));
    let service = Arc::new(TrackingService::new(source.clone(), TTL));

    let callers: Vec<_> = (0..5)
        .map(|_| {
            let service = service.clone();
            tokio::spawn(async move { service.get_tracking("1234567890").await })
        })
        .collect();

    settle().await;
    source.release(1);

    for caller in callers {
        assert_eq!(caller.await.unwrap().unwrap_err(), failure);
    }
    assert_eq!(source.calls(), 1);
    assert_eq!(service.in_flight_len(), 0);
    assert_eq!(service.cache_len(), 0);

    // The next lookup starts a fresh fetch.
    source.release(1);
    let err = service.get_tracking("1234567890").await.unwrap_err();
    assert_eq!(err, failure);
    assert_eq!(source.calls(), 2);
}

#[tokio::test]
async fn test_different_references_fetch_independently() {
    let source = GatedSource::new(Ok(json!({ "sttNumber": "S1", "events": [] })));
    let service = Arc::new(TrackingService::new(source.clone(), TTL));

    let a = {
        let service = service.clone();
        tokio::spawn(async move { service.get_tracking("1111111111").await })
    };
    let b = {
        let service = service.clone();
        tokio::spawn(async move { service.get_tracking("2222222222").await })
    };

    settle().await;
    assert_eq!(service.in_flight_len(), 2);
    source.release(2);

    assert_eq!(a.await.unwrap().unwrap().source, Source::Live);
    assert_eq!(b.await.unwrap().unwrap().source, Source::Live);
    assert_eq!(source.calls(), 2);
    assert_eq!(service.cache_len(), 2);
}

#[tokio::test]
async fn test_abandoned_caller_does_not_cancel_fetch() {
    let source = GatedSource::new(Ok(json!({ "sttNumber": "S1", "events": [] })));
    let service = Arc::new(TrackingService::new(source.clone(), TTL));

    let caller = {
        let service = service.clone();
        tokio::spawn(async move { service.get_tracking("1234567890").await })
    };
    settle().await;
    caller.abort();
    source.release(1);

    while service.cache_len() == 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let cached = service.get_tracking("1234567890").await.unwrap();
    assert_eq!(cached.source, Source::Cache);
    assert_eq!(source.calls(), 1);
}

#[tokio::test]
async fn test_not_found_is_shared_like_any_failure() {
    let source = GatedSource::new(Err(TrackingError::NotFound(
        "Tracking reference not found".into(),
    )));
    let service = Arc::new(TrackingService::new(source.clone(), TTL));

    let first = {
        let service = service.clone();
        tokio::spawn(async move { service.get_tracking("0000000000").await })
    };
    let second = {
        let service = service.clone();
        tokio::spawn(async move { service.get_tracking("0000000000").await })
    };
    settle().await;
    source.release(1);

    assert!(first.await.unwrap().unwrap_err().is_not_found());
    assert!(second.await.unwrap().unwrap_err().is_not_found());
    assert_eq!(source.calls(), 1);
}
