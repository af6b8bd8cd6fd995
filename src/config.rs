//! Runtime settings for the caches and the logo resolver

use std::time::Duration;

/// Staleness and timeout settings shared by the cache consumers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// TTL for raw upstream responses, keyed by request URL
    pub proxy_ttl: Duration,
    /// TTL for computed market indicators, keyed by indicator name
    pub indicator_ttl: Duration,
    /// How long a single logo candidate may take before it counts as failed
    pub attempt_timeout: Duration,
    /// Per-symbol budget when preloading logos in bulk
    pub preload_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            proxy_ttl: Duration::from_secs(10),
            indicator_ttl: Duration::from_secs(300),    // 5 minutes
            attempt_timeout: Duration::from_secs(2),
            preload_timeout: Duration::from_secs(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default() {
        let settings = Settings::default();
        assert_eq!(settings.proxy_ttl, Duration::from_millis(10_000));
        assert_eq!(settings.indicator_ttl, Duration::from_secs(5 * 60));
        assert_eq!(settings.attempt_timeout, Duration::from_secs(2));
        assert_eq!(settings.preload_timeout, Duration::from_secs(10));
    }

    #[test]
    fn test_settings_custom() {
        let settings = Settings {
            proxy_ttl: Duration::from_secs(1),
            ..Default::default()
        };
        assert_eq!(settings.proxy_ttl, Duration::from_secs(1));
        assert_eq!(settings.indicator_ttl, Duration::from_secs(300));
    }
}
