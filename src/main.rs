//! coinboard - cached price lookups and coin logo resolution
//!
//! Drives the response cache, the indicator cache, and the logo resolver from the
//! terminal. Logs go to stderr; set `RUST_LOG` to change verbosity.

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use coinboard::cli::{Cli, Command};
use coinboard::config::Settings;
use coinboard::indicators::{premium_indicator_name, IndicatorService, PremiumQuote};
use coinboard::logos::{normalize_symbol, LogoResolver};
use coinboard::resolver::ResolutionState;
use coinboard::upstream::CachedFetcher;

/// Sets up stderr logging, defaulting to `coinboard=info`
fn init_logging() {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("coinboard=info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
}

/// Preloads logos and prints one `SYMBOL<TAB>URL` line per distinct symbol
async fn run_logos(settings: &Settings, symbols: &[String]) {
    let logos = LogoResolver::new(settings);
    logos.preload(symbols).await;

    let mut printed = Vec::new();
    for symbol in symbols {
        let key = normalize_symbol(symbol);
        if printed.contains(&key) {
            continue;
        }

        match logos.state(&key) {
            ResolutionState::Resolved(url) => println!("{key}\t{url}"),
            _ => println!("{key}\t-"),
        }
        printed.push(key);
    }
}

/// Requests `url` `repeat` times through the response cache
async fn run_fetch(
    settings: &Settings,
    url: &str,
    repeat: u32,
) -> Result<(), Box<dyn std::error::Error>> {
    let fetcher = CachedFetcher::new(settings.proxy_ttl);

    let mut body = serde_json::Value::Null;
    for _ in 0..repeat {
        body = fetcher.get_json(url).await?;
    }

    println!("{}", serde_json::to_string_pretty(&body)?);
    println!("{}", serde_json::to_string(&fetcher.stats())?);
    Ok(())
}

/// Computes the kimchi premium through the indicator cache
///
/// An unusable price or rate fails the computation, naming the offending flag.
async fn run_premium(
    settings: &Settings,
    symbol: &str,
    quote: PremiumQuote,
) -> Result<(), Box<dyn std::error::Error>> {
    let indicators = IndicatorService::new(settings.indicator_ttl);
    let name = premium_indicator_name(symbol);

    let indicator = indicators
        .get_or_compute(&name, || async { quote.premium() })
        .await?;

    println!(
        "{} kimchi premium: {:.2}% (domestic {:.0} KRW, foreign {:.0} KRW)",
        normalize_symbol(symbol),
        indicator.value,
        quote.domestic_krw,
        quote.foreign_in_krw()
    );
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    init_logging();

    let settings = cli.settings()?;
    info!(?settings, "starting coinboard");

    match cli.command {
        Command::Logos { symbols } => run_logos(&settings, &symbols).await,
        Command::Fetch { url, repeat } => run_fetch(&settings, &url, repeat).await?,
        Command::Premium {
            symbol,
            krw,
            usd,
            rate,
        } => {
            let quote = PremiumQuote {
                domestic_krw: krw,
                foreign_usd: usd,
                usd_krw: rate,
            };
            run_premium(&settings, &symbol, quote).await?
        }
    }

    Ok(())
}
