//! Cached JSON client for rate-limited upstream APIs
//!
//! Exchange and exchange-rate endpoints are polled far more often than their data
//! changes, so responses are memoized per request URL for a short window. Only
//! successful responses are cached; a failed request is retried on the next call.

use std::time::Duration;

use reqwest::{Client, StatusCode};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::cache::{CacheStats, TtlCache};

/// Errors that can occur when fetching from an upstream API
#[derive(Debug, Error)]
pub enum FetchError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Upstream answered with a non-success status
    #[error("Upstream returned {status} for {url}")]
    Status { url: String, status: StatusCode },

    /// Failed to parse JSON response
    #[error("Failed to parse JSON response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// HTTP GET client with a TTL cache in front of it
#[derive(Debug)]
pub struct CachedFetcher {
    client: Client,
    cache: TtlCache<Value>,
}

impl CachedFetcher {
    /// Creates a fetcher whose responses stay cached for `ttl`
    pub fn new(ttl: Duration) -> Self {
        Self::with_client(Client::new(), ttl)
    }

    /// Creates a fetcher with a custom HTTP client
    pub fn with_client(client: Client, ttl: Duration) -> Self {
        Self {
            client,
            cache: TtlCache::new(ttl),
        }
    }

    /// Fetches `url` as JSON, serving from cache while the previous response is fresh
    ///
    /// # Returns
    /// * `Ok(Value)` - Cached or freshly fetched body
    /// * `Err(FetchError)` - If the request, status, or parsing fails
    pub async fn get_json(&self, url: &str) -> Result<Value, FetchError> {
        if let Some(cached) = self.cache.get(url) {
            debug!(url, "upstream cache hit");
            return Ok(cached);
        }

        debug!(url, "upstream cache miss");
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: url.to_string(),
                status,
            });
        }

        let text = response.text().await?;
        let body: Value = serde_json::from_str(&text)?;

        self.cache.put(url, body.clone());
        Ok(body)
    }

    /// Drops every cached response
    pub fn clear(&self) {
        self.cache.clear();
    }

    /// Diagnostic snapshot of the response cache
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// The underlying cache
    pub fn cache(&self) -> &TtlCache<Value> {
        &self.cache
    }
}
