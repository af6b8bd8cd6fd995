//! In-memory caching of upstream responses and computed values
//!
//! This module provides a generic key/value cache with a fixed time-to-live per
//! instance. Distinct call sites own distinct instances with their own staleness
//! tolerance: raw proxy responses live for seconds, computed indicators for minutes.

mod stats;
mod ttl;

pub use stats::CacheStats;
pub use ttl::TtlCache;
