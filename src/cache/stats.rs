//! Diagnostic snapshots of cache contents

use serde::Serialize;

/// Point-in-time view of a cache, used for diagnostics only
///
/// `size` and `keys` include entries that have expired but have not been read
/// since, because expiry is only applied on lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Number of stored entries
    pub size: usize,
    /// Stored keys, sorted
    pub keys: Vec<String>,
    /// Best-effort estimate: key bytes plus serialized JSON length of each value
    pub approx_memory_bytes: usize,
}

impl CacheStats {
    /// Returns true if the snapshot holds no entries
    pub fn is_empty(&self) -> bool {
        self.size == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_stats_are_empty() {
        let stats = CacheStats::default();
        assert!(stats.is_empty());
        assert!(stats.keys.is_empty());
        assert_eq!(stats.approx_memory_bytes, 0);
    }

    #[test]
    fn test_stats_serialize_with_snake_case_fields() {
        let stats = CacheStats {
            size: 1,
            keys: vec!["BTCUSDT".to_string()],
            approx_memory_bytes: 24,
        };

        let json = serde_json::to_string(&stats).expect("Stats should serialize");

        assert!(json.contains("\"size\":1"));
        assert!(json.contains("\"keys\":[\"BTCUSDT\"]"));
        assert!(json.contains("\"approx_memory_bytes\":24"));
    }
}
