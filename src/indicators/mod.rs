//! Computed market indicators
//!
//! Indicators such as the kimchi premium or the USD/KRW rate are derived from
//! several upstream calls, so the computed value is cached per indicator name
//! with a longer TTL than raw responses.

pub mod premium;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::debug;

use crate::cache::{CacheStats, TtlCache};

pub use premium::{kimchi_premium, InvalidPrice, PremiumQuote};

/// Name under which the kimchi premium of an asset is cached
pub fn premium_indicator_name(symbol: &str) -> String {
    format!("kimchi_premium_{}", symbol.to_lowercase())
}

/// A computed indicator value
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Indicator {
    /// Indicator name, also the cache key
    pub name: String,
    /// Computed value, in the indicator's own unit (percent for premiums)
    pub value: f64,
    /// When the value was computed
    pub computed_at: DateTime<Utc>,
}

impl Indicator {
    /// Stamps a freshly computed value with the current time
    pub fn new(name: impl Into<String>, value: f64) -> Self {
        Self {
            name: name.into(),
            value,
            computed_at: Utc::now(),
        }
    }
}

/// Per-name cache of computed indicators
#[derive(Debug)]
pub struct IndicatorService {
    cache: TtlCache<Indicator>,
}

impl IndicatorService {
    /// Creates a service whose indicators stay cached for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self {
            cache: TtlCache::new(ttl),
        }
    }

    /// Returns the cached indicator if it is still fresh
    pub fn get(&self, name: &str) -> Option<Indicator> {
        self.cache.get(name)
    }

    /// Returns the cached indicator or computes, caches, and returns a new one
    ///
    /// # Arguments
    /// * `name` - Indicator name used as cache key
    /// * `compute` - Produces the value on a miss; only runs when the cache is stale
    ///
    /// # Returns
    /// * `Ok(Indicator)` - Cached or freshly computed indicator
    /// * `Err(E)` - The error from `compute`; nothing is cached in that case
    pub async fn get_or_compute<F, Fut, E>(&self, name: &str, compute: F) -> Result<Indicator, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<f64, E>>,
    {
        if let Some(cached) = self.cache.get(name) {
            debug!(name, "indicator cache hit");
            return Ok(cached);
        }

        let value = compute().await?;
        let indicator = Indicator::new(name, value);
        self.cache.put(name, indicator.clone());
        debug!(name, value, "indicator computed");
        Ok(indicator)
    }

    /// Drops every cached indicator
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Diagnostic snapshot of the indicator cache
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }
}
