//! Registry of fetches currently running, one per reference number.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use futures_util::future::{BoxFuture, Shared};
use std::sync::Arc;

use crate::carrier::TrackingResult;
use crate::shipment::ShipmentData;

/// A fetch every interested caller can await. Output is cloned per caller.
pub type SharedFetch = Shared<BoxFuture<'static, TrackingResult<Arc<ShipmentData>>>>;

/// Result of [`InFlightRegistry::join_or_start`].
pub enum Slot {
    /// A fetch finished and cached its result just before the lookup.
    Cached(Arc<ShipmentData>),
    /// Another caller's fetch was already running.
    Joined(SharedFetch),
    /// This caller started the fetch.
    Started(SharedFetch),
}

/// Reference number → the one fetch underway for it.
#[derive(Default)]
pub struct InFlightRegistry {
    fetches: DashMap<String, SharedFetch>,
}

impl InFlightRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach to the running fetch for `reference`, or register the one
    /// produced by `start`.
    ///
    /// Lookup and insert happen under the same shard lock, so concurrent
    /// callers for one key never start two fetches. With no fetch running,
    /// `cached` is consulted under that lock first: a fetch caches its result
    /// before leaving the registry, so a result that landed after the
    /// caller's own cache miss is found here.
    pub fn join_or_start<C, F>(&self, reference: &str, cached: C, start: F) -> Slot
    where
        C: FnOnce() -> Option<Arc<ShipmentData>>,
        F: FnOnce() -> SharedFetch,
    {
        match self.fetches.entry(reference.to_string()) {
            Entry::Occupied(entry) => Slot::Joined(entry.get().clone()),
            Entry::Vacant(entry) => {
                if let Some(data) = cached() {
                    return Slot::Cached(data);
                }
                let fetch = start();
                entry.insert(fetch.clone());
                Slot::Started(fetch)
            }
        }
    }

    pub fn remove(&self, reference: &str) {
        self.fetches.remove(reference);
    }

    pub fn contains(&self, reference: &str) -> bool {
        self.fetches.contains_key(reference)
    }

    pub fn len(&self) -> usize {
        self.fetches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetches.is_empty()
    }
}

/// Removes the registry entry when dropped, however the fetch ends.
pub struct InFlightGuard {
    registry: Arc<InFlightRegistry>,
    reference: String,
}

impl InFlightGuard {
    pub fn new(registry: Arc<InFlightRegistry>, reference: impl Into<String>) -> Self {
        Self {
            registry,
            reference: reference.into(),
        }
    }
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.registry.remove(&self.reference);
    }
}
