//! Core data types for equity market data.
//!
//! This module defines the canonical data model returned by every provider:
//!
//! - [`Symbol`] - Trading symbol/ticker
//! - [`Quote`] - Snapshot stock quote
//! - [`HistoricalPoint`] - A (date, closing price) pair
//! - [`MarketOverview`] - Four headline index readings
//! - [`SearchResult`] - A (symbol, name) search hit
//!
//! [`Portfolio`], [`Position`] and [`ScreeningCriteria`] are presentation-layer
//! shapes carried here for the boundary contract; the core never produces or
//! validates them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trading symbol/ticker.
///
/// Symbols are automatically uppercased on creation.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Symbol(String);

impl Symbol {
    /// Creates a new symbol from a string, converting to uppercase.
    #[must_use]
    pub fn new(s: impl Into<String>) -> Self {
        Self(s.into().to_uppercase())
    }

    /// Returns the symbol as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Symbol {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

impl From<&str> for Symbol {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

impl From<String> for Symbol {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

/// A snapshot stock quote.
///
/// Providers that cannot derive `change` from a prior close report
/// `change = 0.0, change_percent = 0.0` rather than fabricating a value.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Display name of the company.
    pub name: String,
    /// Last traded price.
    pub price: f64,
    /// Absolute change versus the prior close.
    pub change: f64,
    /// Percentage change versus the prior close.
    pub change_percent: f64,
    /// Trading volume.
    pub volume: u64,
    /// Market capitalization.
    pub market_cap: f64,
    /// Trailing price/earnings ratio, when available.
    pub pe: Option<f64>,
    /// Annual dividend yield, when available.
    pub dividend: Option<f64>,
    /// Business sector.
    pub sector: String,
    /// Industry within the sector.
    pub industry: String,
}

impl Quote {
    /// Creates a new quote with required fields; everything else defaults.
    #[must_use]
    pub fn new(symbol: Symbol, name: impl Into<String>, price: f64) -> Self {
        Self {
            symbol,
            name: name.into(),
            price,
            ..Default::default()
        }
    }
}

/// A single (calendar date, closing price) observation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Calendar date of the observation.
    pub date: NaiveDate,
    /// Closing price. Always finite and positive; invalid points are dropped
    /// during normalization rather than retained.
    pub price: f64,
}

impl HistoricalPoint {
    /// Creates a new historical point.
    #[must_use]
    pub const fn new(date: NaiveDate, price: f64) -> Self {
        Self { date, price }
    }

    /// Returns true if the price is a finite, positive number.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.price.is_finite() && self.price > 0.0
    }
}

/// Headline readings for the four tracked market indices.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketOverview {
    /// Broad-equity index level (S&P 500).
    pub sp500: f64,
    /// Tech-weighted index level (NASDAQ Composite).
    pub nasdaq: f64,
    /// Volatility index level (VIX).
    pub vix: f64,
    /// 10-year benchmark Treasury yield.
    pub treasury_10y: f64,
}

/// A single ticker search hit.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    /// Matched stock symbol.
    pub symbol: Symbol,
    /// Company name.
    pub name: String,
}

impl SearchResult {
    /// Creates a new search result.
    #[must_use]
    pub fn new(symbol: Symbol, name: impl Into<String>) -> Self {
        Self {
            symbol,
            name: name.into(),
        }
    }
}

/// A named collection of positions held by the presentation layer.
///
/// Boundary contract only; the core does not produce or validate portfolios.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Portfolio {
    /// Opaque portfolio identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Positions held.
    pub positions: Vec<Position>,
    /// Total market value of all positions.
    pub total_value: f64,
    /// Total unrealized return.
    pub total_return: f64,
    /// Total unrealized return as a percentage of cost.
    pub total_return_percent: f64,
}

/// A single holding within a [`Portfolio`].
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Stock symbol.
    pub symbol: Symbol,
    /// Number of shares held.
    pub shares: f64,
    /// Average cost per share.
    pub avg_cost: f64,
    /// Current price per share.
    pub current_price: f64,
    /// Current market value of the position.
    pub market_value: f64,
    /// Unrealized gain in currency terms.
    pub unrealized_gain: f64,
    /// Unrealized gain as a percentage of cost.
    pub unrealized_gain_percent: f64,
}

/// Filter criteria supplied by the presentation layer's stock screener.
///
/// Boundary contract only; the core passes these through unvalidated.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScreeningCriteria {
    /// Minimum market capitalization.
    pub min_market_cap: Option<f64>,
    /// Maximum market capitalization.
    pub max_market_cap: Option<f64>,
    /// Minimum price/earnings ratio.
    pub min_pe: Option<f64>,
    /// Maximum price/earnings ratio.
    pub max_pe: Option<f64>,
    /// Minimum dividend yield.
    pub min_dividend: Option<f64>,
    /// Sectors to include.
    pub sectors: Option<Vec<String>>,
    /// Minimum return on equity.
    pub min_roe: Option<f64>,
    /// Maximum debt-to-equity ratio.
    pub max_debt_to_equity: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn symbol_uppercases_on_creation() {
        assert_eq!(Symbol::new("aapl").as_str(), "AAPL");
        assert_eq!(Symbol::from("msFt").as_str(), "MSFT");
        assert_eq!("tsla".parse::<Symbol>().unwrap().as_str(), "TSLA");
    }

    #[test]
    fn symbol_display_roundtrip() {
        let symbol = Symbol::new("NVDA");
        assert_eq!(symbol.to_string(), "NVDA");
    }

    #[test]
    fn quote_new_defaults_optional_fields() {
        let quote = Quote::new(Symbol::new("AAPL"), "Apple Inc.", 175.43);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
        assert!(quote.pe.is_none());
        assert!(quote.dividend.is_none());
    }

    #[test]
    fn historical_point_validity() {
        let date = NaiveDate::from_ymd_opt(2024, 6, 3).unwrap();
        assert!(HistoricalPoint::new(date, 101.5).is_valid());
        assert!(!HistoricalPoint::new(date, 0.0).is_valid());
        assert!(!HistoricalPoint::new(date, -3.0).is_valid());
        assert!(!HistoricalPoint::new(date, f64::NAN).is_valid());
    }
}
