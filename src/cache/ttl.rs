//! Time-boxed key/value cache
//!
//! Provides a `TtlCache` that memoizes values for a fixed window. Staleness is
//! checked when a key is read and stale entries are dropped at that point; there
//! is no background sweep, which keeps the cache free of timers.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::trace;

use super::CacheStats;

/// A stored value together with its insertion time
#[derive(Debug, Clone)]
struct CacheEntry<V> {
    /// The cached value
    value: V,
    /// When the value was stored
    stored_at: Instant,
}

impl<V> CacheEntry<V> {
    /// An entry is valid while `now - stored_at < ttl`
    fn is_fresh(&self, ttl: Duration, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < ttl
    }
}

/// In-memory cache with one time-to-live shared by every entry
///
/// Lookups never fail: a missing key and an expired key look the same to the
/// caller. The map is behind a synchronous mutex that is never held across an
/// await point, so `get` and `put` never suspend.
#[derive(Debug)]
pub struct TtlCache<V> {
    /// How long entries stay valid after `put`
    ttl: Duration,
    /// Stored entries keyed by request URL, indicator name, or symbol
    entries: Mutex<HashMap<String, CacheEntry<V>>>,
}

impl<V: Clone> TtlCache<V> {
    /// Creates an empty cache whose entries expire `ttl` after insertion
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Returns the time-to-live applied to every entry
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<String, CacheEntry<V>>> {
        // Every critical section leaves the map consistent, so a poisoned lock is still usable
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the cached value for `key` if it was stored less than one TTL ago
    ///
    /// An expired entry is removed as a side effect and reported as absent.
    pub fn get(&self, key: &str) -> Option<V> {
        let now = Instant::now();
        let mut entries = self.lock();

        match entries.get(key) {
            Some(entry) if entry.is_fresh(self.ttl, now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                trace!(key, "dropped expired cache entry");
                None
            }
            None => None,
        }
    }

    /// Stores `value` under `key`, replacing any previous entry and restarting its TTL
    pub fn put(&self, key: impl Into<String>, value: V) {
        let entry = CacheEntry {
            value,
            stored_at: Instant::now(),
        };
        self.lock().insert(key.into(), entry);
    }

    /// Removes every entry immediately
    pub fn clear(&self) {
        let mut entries = self.lock();
        let removed = entries.len();
        entries.clear();
        trace!(removed, "cleared cache");
    }

    /// Number of stored entries, including expired ones not yet looked up
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns true if nothing is stored
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

impl<V: Clone + Serialize> TtlCache<V> {
    /// Takes a diagnostic snapshot of the cache
    ///
    /// The memory figure is an estimate based on each value's JSON encoding.
    pub fn stats(&self) -> CacheStats {
        let entries = self.lock();

        let mut keys: Vec<String> = entries.keys().cloned().collect();
        keys.sort();

        let approx_memory_bytes = entries
            .iter()
            .map(|(key, entry)| {
                let value_bytes = serde_json::to_vec(&entry.value)
                    .map(|encoded| encoded.len())
                    .unwrap_or(0);
                key.len() + value_bytes
            })
            .sum();

        CacheStats {
            size: entries.len(),
            keys,
            approx_memory_bytes,
        }
    }
}
