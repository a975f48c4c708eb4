#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/equityresearch/market/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Core traits and types for equity market data.
//!
//! This crate provides the foundational abstractions the provider crates
//! build on:
//!
//! - [`MarketDataProvider`](provider::MarketDataProvider) - Base trait for all providers
//! - [`QuoteProvider`](provider::QuoteProvider) - Snapshot stock quotes
//! - [`HistoryProvider`](provider::HistoryProvider) - Daily closing-price history
//! - [`SearchProvider`](provider::SearchProvider) - Free-text ticker search
//! - [`MarketSummaryProvider`](provider::MarketSummaryProvider) - Index-level market overview
//! - [`FixedWindowLimiter`](limiter::FixedWindowLimiter) - Per-provider request throttling

/// Error types for market data operations.
pub mod error;
/// Fixed-window request rate limiting.
pub mod limiter;
/// Provider traits for fetching market data.
pub mod provider;
/// Core data types (Symbol, Quote, HistoricalPoint, etc.).
pub mod types;

// Re-export commonly used items at crate root
pub use error::{MarketError, Result};
pub use limiter::FixedWindowLimiter;
pub use provider::{
    HistoryProvider, MarketDataProvider, MarketSummaryProvider, QuoteProvider, SearchProvider,
};
pub use types::{
    HistoricalPoint, MarketOverview, Portfolio, Position, Quote, ScreeningCriteria, SearchResult,
    Symbol,
};
