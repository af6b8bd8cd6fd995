//! Command-line interface parsing for coinboard
//!
//! This module handles parsing of CLI arguments using clap. Global flags override
//! the cache and resolver settings; subcommands drive the logo resolver, the cached
//! upstream fetcher, and the kimchi premium indicator.

use std::time::Duration;

use clap::{Parser, Subcommand};
use thiserror::Error;

use crate::config::Settings;

/// Error types for CLI argument validation
#[derive(Debug, Error)]
pub enum CliError {
    /// A TTL or timeout flag was zero
    #[error("Invalid --{0}: must be greater than zero")]
    ZeroDuration(&'static str),

    /// --repeat was zero
    #[error("Invalid --repeat: must be at least 1")]
    ZeroRepeat,
}

/// coinboard - cached price lookups and coin logo resolution
#[derive(Parser, Debug)]
#[command(name = "coinboard")]
#[command(about = "Cached crypto price lookups, kimchi premium, and coin logo resolution")]
#[command(version)]
pub struct Cli {
    /// TTL for cached upstream responses in milliseconds (default 10000)
    #[arg(long, value_name = "MS", global = true)]
    pub proxy_ttl_ms: Option<u64>,

    /// TTL for computed indicators in seconds (default 300)
    #[arg(long, value_name = "SECS", global = true)]
    pub indicator_ttl_secs: Option<u64>,

    /// Timeout for a single logo candidate in milliseconds (default 2000)
    #[arg(long, value_name = "MS", global = true)]
    pub attempt_timeout_ms: Option<u64>,

    /// Per-symbol timeout when preloading logos in milliseconds (default 10000)
    #[arg(long, value_name = "MS", global = true)]
    pub preload_timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Resolve logo URLs for one or more symbols (e.g. BTC, KRW-ETH, SOLUSDT)
    Logos {
        #[arg(required = true, value_name = "SYMBOL")]
        symbols: Vec<String>,
    },

    /// Fetch a JSON endpoint through the response cache
    Fetch {
        url: String,

        /// Number of times to request the URL; repeats inside the TTL hit the cache
        #[arg(long, default_value_t = 1)]
        repeat: u32,
    },

    /// Compute the kimchi premium from a KRW price, a USD price, and the USD/KRW rate
    Premium {
        /// Asset symbol, used to name the cached indicator
        #[arg(long, default_value = "BTC")]
        symbol: String,

        /// Price on the Korean exchange in KRW
        #[arg(long, allow_negative_numbers = true)]
        krw: f64,

        /// Price on the foreign exchange in USD
        #[arg(long, allow_negative_numbers = true)]
        usd: f64,

        /// KRW per USD
        #[arg(long, allow_negative_numbers = true)]
        rate: f64,
    },
}

fn duration_flag(
    name: &'static str,
    value: Option<u64>,
    to_duration: fn(u64) -> Duration,
    default: Duration,
) -> Result<Duration, CliError> {
    match value {
        None => Ok(default),
        Some(0) => Err(CliError::ZeroDuration(name)),
        Some(n) => Ok(to_duration(n)),
    }
}

impl Cli {
    /// Builds runtime settings from the defaults and any override flags
    ///
    /// # Returns
    /// * `Ok(Settings)` with overrides applied
    /// * `Err(CliError)` if a flag or subcommand argument is out of range
    pub fn settings(&self) -> Result<Settings, CliError> {
        let defaults = Settings::default();

        if let Command::Fetch { repeat: 0, .. } = self.command {
            return Err(CliError::ZeroRepeat);
        }

        Ok(Settings {
            proxy_ttl: duration_flag(
                "proxy-ttl-ms",
                self.proxy_ttl_ms,
                Duration::from_millis,
                defaults.proxy_ttl,
            )?,
            indicator_ttl: duration_flag(
                "indicator-ttl-secs",
                self.indicator_ttl_secs,
                Duration::from_secs,
                defaults.indicator_ttl,
            )?,
            attempt_timeout: duration_flag(
                "attempt-timeout-ms",
                self.attempt_timeout_ms,
                Duration::from_millis,
                defaults.attempt_timeout,
            )?,
            preload_timeout: duration_flag(
                "preload-timeout-ms",
                self.preload_timeout_ms,
                Duration::from_millis,
                defaults.preload_timeout,
            )?,
        })
    }
}
