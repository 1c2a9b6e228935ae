//! Route cache implementations.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::model::{LegKind, Leg, PlaceId};
use crate::traits::RouteCache;

/// Cache key for one routed segment.
pub fn segment_key(kind: LegKind, place_ids: &[PlaceId]) -> String {
    format!("seg:{}:{}", kind.as_str(), place_ids.join(">"))
}

/// Cache key for a day-trip triangle.
pub fn day_trip_key(start: &str, destination: &str, end: &str) -> String {
    format!("dt:{start}->{destination}->{end}")
}

/// Process-local cache guarded by a mutex.
#[derive(Debug, Default)]
pub struct InMemoryRouteCache {
    entries: Mutex<HashMap<String, Vec<Leg>>>,
}

impl InMemoryRouteCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// A panic elsewhere while holding the lock leaves the map intact, so
    /// keep using it.
    fn entries(&self) -> MutexGuard<'_, HashMap<String, Vec<Leg>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl RouteCache for InMemoryRouteCache {
    fn get(&self, key: &str) -> Option<Vec<Leg>> {
        self.entries().get(key).cloned()
    }

    fn put(&self, key: String, legs: Vec<Leg>) {
        self.entries().insert(key, legs);
    }
}

/// Cache that never remembers anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoCache;

impl RouteCache for NoCache {
    fn get(&self, _key: &str) -> Option<Vec<Leg>> {
        None
    }

    fn put(&self, _key: String, _legs: Vec<Leg>) {}
}
