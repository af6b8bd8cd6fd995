//! Kimchi premium arithmetic
//!
//! The premium is the percentage by which the price on a Korean exchange (in KRW)
//! exceeds the foreign exchange price (in USD) once converted at the USD/KRW rate.

use serde::Serialize;
use thiserror::Error;

/// A premium input that is not a finite, strictly positive number
///
/// `name` is `"krw"`, `"usd"` or `"rate"`, matching the CLI flags.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("Invalid {name}: '{value}'. Prices and rates must be positive numbers")]
pub struct InvalidPrice {
    pub name: &'static str,
    pub value: f64,
}

/// Returns `(domestic_krw / (foreign_usd * usd_krw) - 1) * 100`
///
/// Returns `None` if any input is not a finite, strictly positive number.
pub fn kimchi_premium(domestic_krw: f64, foreign_usd: f64, usd_krw: f64) -> Option<f64> {
    PremiumQuote {
        domestic_krw,
        foreign_usd,
        usd_krw,
    }
    .premium()
    .ok()
}

/// Prices of one asset on a domestic and a foreign exchange
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PremiumQuote {
    /// Price on the Korean exchange in KRW
    pub domestic_krw: f64,
    /// Price on the foreign exchange in USD
    pub foreign_usd: f64,
    /// KRW per USD
    pub usd_krw: f64,
}

impl PremiumQuote {
    /// Foreign price expressed in KRW
    pub fn foreign_in_krw(&self) -> f64 {
        self.foreign_usd * self.usd_krw
    }

    /// Premium in percent
    ///
    /// # Returns
    /// * `Ok(f64)` - Positive when the domestic price is higher
    /// * `Err(InvalidPrice)` - Naming the first input that is unusable
    pub fn premium(&self) -> Result<f64, InvalidPrice> {
        let inputs = [
            ("krw", self.domestic_krw),
            ("usd", self.foreign_usd),
            ("rate", self.usd_krw),
        ];
        if let Some(&(name, value)) = inputs.iter().find(|(_, v)| !(v.is_finite() && *v > 0.0)) {
            return Err(InvalidPrice { name, value });
        }

        Ok((self.domestic_krw / self.foreign_in_krw() - 1.0) * 100.0)
    }
}
