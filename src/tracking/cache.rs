//! Time-limited cache of normalized shipments.

use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

use crate::observability::metrics;
use crate::shipment::ShipmentData;

/// A cached shipment and the instant it stops being served.
#[derive(Debug, Clone)]
pub struct CacheEntry {
    pub data: Arc<ShipmentData>,
    pub expires_at: Instant,
}

impl CacheEntry {
    /// Fresh while `now <= expires_at`.
    pub fn is_fresh(&self, now: Instant) -> bool {
        now <= self.expires_at
    }
}

/// Reference number → shipment, with lazy eviction on read.
#[derive(Debug)]
pub struct ShipmentCache {
    entries: DashMap<String, CacheEntry>,
    ttl: Duration,
}

impl ShipmentCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: DashMap::new(),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Fresh entry for `reference`. An expired entry is removed.
    pub fn get(&self, reference: &str) -> Option<Arc<ShipmentData>> {
        let now = Instant::now();
        if let Some(entry) = self.entries.get(reference) {
            if entry.is_fresh(now) {
                return Some(entry.data.clone());
            }
        }

        // Re-check under the write lock: a fresh fetch may have replaced it.
        if self
            .entries
            .remove_if(reference, |_, entry| !entry.is_fresh(now))
            .is_some()
        {
            tracing::debug!(reference = %reference, "Evicted expired cache entry");
            metrics::record_cache_size(self.entries.len());
        }
        None
    }

    /// Store `data` for `reference`, replacing any previous entry.
    pub fn insert(&self, reference: &str, data: Arc<ShipmentData>) {
        let entry = CacheEntry {
            data,
            expires_at: Instant::now() + self.ttl,
        };
        self.entries.insert(reference.to_string(), entry);
        metrics::record_cache_size(self.entries.len());
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
