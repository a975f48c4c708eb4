//! Provider traits for fetching market data.
//!
//! This module defines the core provider traits:
//!
//! - [`MarketDataProvider`] - Base trait for all data providers
//! - [`QuoteProvider`] - Snapshot stock quotes
//! - [`HistoryProvider`] - Daily closing-price history
//! - [`SearchProvider`] - Free-text ticker search
//! - [`MarketSummaryProvider`] - Index-level market overview

use async_trait::async_trait;
use chrono::NaiveDate;
use std::fmt::Debug;

use crate::{
    error::Result,
    types::{HistoricalPoint, MarketOverview, Quote, SearchResult, Symbol},
};

/// Base trait for all market data providers.
///
/// All providers must implement this trait to expose basic metadata used in
/// logging and fallback diagnostics.
pub trait MarketDataProvider: Send + Sync + Debug {
    /// Returns the name of this provider (e.g., "Polygon").
    fn name(&self) -> &str;

    /// Returns a description of this provider.
    fn description(&self) -> &str;
}

/// Provider of snapshot stock quotes.
#[async_trait]
pub trait QuoteProvider: MarketDataProvider {
    /// Fetches a normalized quote for a single symbol.
    ///
    /// Returns [`MarketError::SymbolNotFound`](crate::MarketError::SymbolNotFound)
    /// when the provider answers validly but knows no such symbol; transport
    /// and shape failures surface as their own variants.
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote>;
}

/// Provider of daily closing-price history.
#[async_trait]
pub trait HistoryProvider: MarketDataProvider {
    /// Fetches daily closing prices for `symbol` between `from` and `to`.
    ///
    /// The returned series is ascending by date with invalid (zero or
    /// non-finite) closes dropped.
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalPoint>>;
}

/// Provider of free-text ticker search.
#[async_trait]
pub trait SearchProvider: MarketDataProvider {
    /// Searches for tickers matching `query`.
    ///
    /// When the provider differentiates instrument types, only equities are
    /// returned.
    async fn fetch_search(&self, query: &str) -> Result<Vec<SearchResult>>;
}

/// Provider of the four-index market overview.
#[async_trait]
pub trait MarketSummaryProvider: MarketDataProvider {
    /// Fetches current levels for the four tracked indices.
    async fn fetch_market_summary(&self) -> Result<MarketOverview>;
}
