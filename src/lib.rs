//! coinboard library
//!
//! Time-boxed response caching and ordered fallback-chain resolution behind a
//! crypto price dashboard, plus the consumers that use them: a cached upstream
//! fetcher, the market indicator service, and the coin logo resolver.

pub mod cache;
pub mod cli;
pub mod config;
pub mod indicators;
pub mod logos;
pub mod resolver;
pub mod upstream;

#[cfg(test)]
mod test_server;
