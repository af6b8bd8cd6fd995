//! Coin logo resolution
//!
//! Logos come from several public icon sets with patchy coverage. For each symbol
//! the sources are tried in a fixed order, the first one that serves the image is
//! remembered, and symbols no source can serve are remembered as missing so the
//! dashboard renders a placeholder without hammering the icon hosts again.

mod probe;

pub use probe::HttpProbe;

use std::time::Duration;

use crate::config::Settings;
use crate::resolver::{Attempt, FallbackResolver, PreloadReport, ResolutionState, ResolverStats};

/// Market prefixes used by exchanges that quote pairs as `QUOTE-BASE`
const MARKET_PREFIXES: [&str; 3] = ["KRW-", "USDT-", "BTC-"];

/// Quote currencies appended by exchanges that quote pairs as `BASEQUOTE`
const QUOTE_SUFFIXES: [&str; 2] = ["USDT", "KRW"];

/// Reduces a ticker or market code to the bare asset symbol
///
/// `"krw-btc"`, `"BTCUSDT"` and `" btc "` all become `"BTC"`.
pub fn normalize_symbol(raw: &str) -> String {
    let symbol = raw.trim().to_uppercase();

    let symbol = MARKET_PREFIXES
        .iter()
        .find_map(|prefix| symbol.strip_prefix(prefix))
        .map(str::to_string)
        .unwrap_or(symbol);

    QUOTE_SUFFIXES
        .iter()
        .filter_map(|quote| symbol.strip_suffix(quote))
        .find(|base| !base.is_empty())
        .map(str::to_string)
        .unwrap_or(symbol)
}

/// CoinGecko image for assets whose CoinGecko id is known ahead of time
fn coingecko_logo(symbol: &str) -> Option<&'static str> {
    match symbol {
        "BTC" => Some("https://assets.coingecko.com/coins/images/1/large/bitcoin.png"),
        "ETH" => Some("https://assets.coingecko.com/coins/images/279/large/ethereum.png"),
        "XRP" => Some("https://assets.coingecko.com/coins/images/44/large/xrp-symbol-white-128.png"),
        "SOL" => Some("https://assets.coingecko.com/coins/images/4128/large/solana.png"),
        "DOGE" => Some("https://assets.coingecko.com/coins/images/5/large/dogecoin.png"),
        "ADA" => Some("https://assets.coingecko.com/coins/images/975/large/cardano.png"),
        _ => None,
    }
}

/// Ordered logo URLs to try for a normalized symbol
///
/// Returns an empty list for an empty symbol.
pub fn logo_candidates(symbol: &str) -> Vec<String> {
    if symbol.is_empty() {
        return Vec::new();
    }

    let lower = symbol.to_lowercase();
    let mut candidates = Vec::with_capacity(4);

    if let Some(url) = coingecko_logo(symbol) {
        candidates.push(url.to_string());
    }
    candidates.push(format!(
        "https://raw.githubusercontent.com/spothq/cryptocurrency-icons/master/128/color/{lower}.png"
    ));
    candidates.push(format!("https://assets.coincap.io/assets/icons/{lower}@2x.png"));
    candidates.push(format!("https://cryptoicons.org/api/icon/{lower}/200"));

    candidates
}

/// Resolves and memoizes a logo URL per coin symbol
pub struct LogoResolver {
    resolver: FallbackResolver<String>,
}

impl LogoResolver {
    /// Creates a resolver that probes candidates over HTTP
    pub fn new(settings: &Settings) -> Self {
        Self::with_attempt(
            HttpProbe::new(settings.attempt_timeout),
            settings.preload_timeout,
        )
    }

    /// Creates a resolver with a custom candidate check
    pub fn with_attempt<A>(attempt: A, preload_timeout: Duration) -> Self
    where
        A: Attempt<String> + 'static,
    {
        Self {
            resolver: FallbackResolver::new(attempt).with_preload_timeout(preload_timeout),
        }
    }

    /// Returns the logo URL for `symbol`, or `None` if no source serves it
    pub async fn logo_url(&self, symbol: &str) -> Option<String> {
        let key = normalize_symbol(symbol);
        self.resolver.resolve(&key, &logo_candidates(&key)).await
    }

    /// Discards the memoized outcome for `symbol` and resolves it again
    pub async fn refresh(&self, symbol: &str) -> Option<String> {
        let key = normalize_symbol(symbol);
        self.resolver.refresh(&key, &logo_candidates(&key)).await
    }

    /// Forgets the outcome for `symbol`
    pub fn reset(&self, symbol: &str) {
        self.resolver.reset(&normalize_symbol(symbol));
    }

    /// Forgets every outcome
    pub fn clear(&self) {
        self.resolver.clear_all();
    }

    /// Resolves logos for many symbols concurrently
    pub async fn preload<S: AsRef<str>>(&self, symbols: &[S]) -> PreloadReport {
        let mut keys: Vec<String> = symbols
            .iter()
            .map(|symbol| normalize_symbol(symbol.as_ref()))
            .collect();
        keys.sort();
        keys.dedup();

        self.resolver.preload(&keys, logo_candidates).await
    }

    /// Returns the resolution state of `symbol` after normalization
    pub fn state(&self, symbol: &str) -> ResolutionState<String> {
        self.resolver.state(&normalize_symbol(symbol))
    }

    /// Counts symbols by resolution state
    pub fn stats(&self) -> ResolverStats {
        self.resolver.stats()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::FnAttempt;
    use std::sync::{Arc, Mutex};

    /// Serves only URLs from the given host, recording every request
    fn host_only(
        host: &'static str,
    ) -> (
        FnAttempt<impl Fn(String) -> std::future::Ready<bool>>,
        Arc<Mutex<Vec<String>>>,
    ) {
        let requests = Arc::new(Mutex::new(Vec::new()));
        let log = requests.clone();
        let attempt = FnAttempt::new(move |url: String| {
            let served = url.contains(host);
            log.lock().unwrap().push(url);
            std::future::ready(served)
        });
        (attempt, requests)
    }

    #[test]
    fn test_normalize_symbol() {
        assert_eq!(normalize_symbol("btc"), "BTC");
        assert_eq!(normalize_symbol("  eth "), "ETH");
        assert_eq!(normalize_symbol("KRW-XRP"), "XRP");
        assert_eq!(normalize_symbol("usdt-sol"), "SOL");
        assert_eq!(normalize_symbol("BTC-ETH"), "ETH");
        assert_eq!(normalize_symbol("BTCUSDT"), "BTC");
        assert_eq!(normalize_symbol("DOGEKRW"), "DOGE");
    }

    #[test]
    fn test_normalize_keeps_quote_currency_itself() {
        assert_eq!(normalize_symbol("USDT"), "USDT");
        assert_eq!(normalize_symbol("KRW"), "KRW");
        assert_eq!(normalize_symbol(""), "");
    }

    #[test]
    fn test_known_symbol_tries_coingecko_first() {
        let candidates = logo_candidates("BTC");

        assert_eq!(candidates.len(), 4);
        assert!(candidates[0].starts_with("https://assets.coingecko.com/"));
        assert!(candidates[1].contains("spothq"));
        assert!(candidates[1].ends_with("/btc.png"));
    }

    #[test]
    fn test_unknown_symbol_skips_coingecko() {
        let candidates = logo_candidates("XYZ");

        assert_eq!(
            candidates,
            vec![
                "https://raw.githubusercontent.com/spothq/cryptocurrency-icons/master/128/color/xyz.png".to_string(),
                "https://assets.coincap.io/assets/icons/xyz@2x.png".to_string(),
                "https://cryptoicons.org/api/icon/xyz/200".to_string(),
            ]
        );
    }

    #[test]
    fn test_empty_symbol_has_no_candidates() {
        assert!(logo_candidates("").is_empty());
    }

    #[tokio::test]
    async fn test_logo_falls_back_and_memoizes() {
        let (attempt, requests) = host_only("coincap.io");
        let logos = LogoResolver::with_attempt(attempt, Duration::from_secs(10));

        let first = logos.logo_url("XYZ").await;
        let second = logos.logo_url("xyz").await;

        assert_eq!(
            first,
            Some("https://assets.coincap.io/assets/icons/xyz@2x.png".to_string())
        );
        assert_eq!(second, first);
        // spothq once, coincap once, nothing on the repeat lookup
        assert_eq!(requests.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_market_codes_share_one_entry() {
        let (attempt, requests) = host_only("coingecko.com");
        let logos = LogoResolver::with_attempt(attempt, Duration::from_secs(10));

        logos.logo_url("KRW-BTC").await;
        logos.logo_url("BTCUSDT").await;

        assert_eq!(requests.lock().unwrap().len(), 1);
        assert_eq!(logos.stats().resolved, 1);
    }

    #[tokio::test]
    async fn test_missing_logo_stays_missing_until_reset() {
        let (attempt, requests) = host_only("nowhere.invalid");
        let logos = LogoResolver::with_attempt(attempt, Duration::from_secs(10));

        assert!(logos.logo_url("XYZ").await.is_none());
        assert!(logos.logo_url("XYZ").await.is_none());
        assert_eq!(requests.lock().unwrap().len(), 3);
        assert_eq!(logos.state("XYZ"), ResolutionState::Failed);

        logos.reset("XYZ");
        assert_eq!(logos.state("XYZ"), ResolutionState::Unresolved);
    }

    #[tokio::test]
    async fn test_preload_dedupes_normalized_symbols() {
        let (attempt, _requests) = host_only("spothq");
        let logos = LogoResolver::with_attempt(attempt, Duration::from_secs(10));

        let report = logos.preload(&["btc", "KRW-BTC", "ETHUSDT", ""]).await;

        // "" normalizes to a key with no candidates
        assert_eq!(report.resolved, 2);
        assert_eq!(report.failed, 1);
        assert!(matches!(
            logos.state("ETH"),
            ResolutionState::Resolved(url) if url.ends_with("/eth.png")
        ));
    }

    #[tokio::test]
    async fn test_refresh_retries_failed_symbol() {
        let available = Arc::new(Mutex::new(false));
        let flag = available.clone();
        let attempt = FnAttempt::new(move |_url: String| {
            let up = *flag.lock().unwrap();
            std::future::ready(up)
        });
        let logos = LogoResolver::with_attempt(attempt, Duration::from_secs(10));

        assert!(logos.logo_url("XYZ").await.is_none());
        *available.lock().unwrap() = true;
        assert!(logos.logo_url("XYZ").await.is_none());

        let refreshed = logos.refresh("XYZ").await;
        assert!(refreshed.is_some());
    }
}
