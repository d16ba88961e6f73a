//! Cache and deduplication in front of the carrier.
//!
//! # Lookup order
//! ```text
//! get_tracking(ref)
//!     → cache hit (fresh)           → source = cache
//!     → fetch already in flight     → await it, source = deduped
//!     → otherwise start the fetch   → source = live
//!           on success: normalize, cache for TTL
//!           always: drop the in-flight entry
//! ```
//!
//! The fetch runs on its own task. A caller that goes away does not cancel
//! it, and its result still lands in the cache.

use futures_util::FutureExt;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;

use crate::carrier::{TrackingError, TrackingResult, TrackingSource};
use crate::observability::metrics;
use crate::shipment::{normalize, ShipmentData};
use crate::tracking::cache::ShipmentCache;
use crate::tracking::inflight::{InFlightGuard, InFlightRegistry, SharedFetch, Slot};

/// Where a result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    /// Fresh cached value.
    Cache,
    /// Joined a fetch started by a concurrent caller.
    Deduped,
    /// This call started the fetch.
    Live,
}

impl Source {
    pub fn as_str(&self) -> &'static str {
        match self {
            Source::Cache => "cache",
            Source::Deduped => "deduped",
            Source::Live => "live",
        }
    }
}

/// A lookup result tagged with its provenance.
#[derive(Debug, Clone)]
pub struct Tracked {
    pub source: Source,
    pub data: Arc<ShipmentData>,
}

/// Owns the process-wide cache and in-flight registry.
pub struct TrackingService {
    upstream: Arc<dyn TrackingSource>,
    cache: Arc<ShipmentCache>,
    in_flight: Arc<InFlightRegistry>,
}

impl TrackingService {
    pub fn new(upstream: Arc<dyn TrackingSource>, ttl: Duration) -> Self {
        Self {
            upstream,
            cache: Arc::new(ShipmentCache::new(ttl)),
            in_flight: Arc::new(InFlightRegistry::new()),
        }
    }

    /// Look up tracking data for `reference`.
    ///
    /// # Errors
    ///
    /// Propagates the fetch error unchanged; every caller attached to the
    /// same fetch receives the same error.
    pub async fn get_tracking(&self, reference: &str) -> TrackingResult<Tracked> {
        if let Some(data) = self.cache.get(reference) {
            return Ok(self.tracked(reference, Source::Cache, data));
        }

        let (source, fetch) = match self.in_flight.join_or_start(
            reference,
            || self.cache.get(reference),
            || self.spawn_fetch(reference),
        ) {
            Slot::Cached(data) => return Ok(self.tracked(reference, Source::Cache, data)),
            Slot::Joined(fetch) => (Source::Deduped, fetch),
            Slot::Started(fetch) => (Source::Live, fetch),
        };

        tracing::debug!(reference = %reference, source = source.as_str(), "Awaiting tracking fetch");
        let data = fetch.await?;
        Ok(self.tracked(reference, source, data))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    fn tracked(&self, reference: &str, source: Source, data: Arc<ShipmentData>) -> Tracked {
        tracing::info!(reference = %reference, source = source.as_str(), "Tracking lookup served");
        metrics::record_lookup(source.as_str());
        Tracked { source, data }
    }

    fn spawn_fetch(&self, reference: &str) -> SharedFetch {
        let upstream = self.upstream.clone();
        let cache = self.cache.clone();
        let guard = InFlightGuard::new(self.in_flight.clone(), reference);
        let reference = reference.to_string();

        let task = tokio::spawn(async move {
            // Dropped last: the cache is filled before the entry disappears.
            let _guard = guard;
            let details = upstream.fetch(&reference).await?;
            let data = Arc::new(normalize(&details));
            cache.insert(&reference, data.clone());
            Ok::<_, TrackingError>(data)
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(TrackingError::Internal(format!("tracking task failed: {e}")))
            })
        }
        .boxed()
        .shared()
    }
}
