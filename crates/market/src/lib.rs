#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/equityresearch/market/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Unified equity market data interface.
//!
//! This crate ties the provider crates together behind [`StockService`],
//! which fans requests out over live providers in order and falls back to
//! the synthetic generator when none is usable.
//!
//! # Features
//!
//! - `polygon` - Polygon.io provider (quotes, history, search)
//! - `yahoo` - Yahoo Finance provider (quotes, history, search, market summary)
//!
//! The simulator is always compiled in; it is the terminal fallback.
//!
//! # Example
//!
//! ```rust,ignore
//! use market::{DataMode, StockService, Symbol};
//!
//! #[tokio::main]
//! async fn main() {
//!     let service = StockService::new(DataMode::Simulated);
//!
//!     if let Some(quote) = service.get_stock(&Symbol::new("AAPL")).await {
//!         println!("{} @ {}", quote.symbol, quote.price);
//!     }
//!
//!     let overview = service.get_market_overview().await;
//!     println!("S&P 500 at {}", overview.sp500);
//! }
//! ```

// Core types and traits
pub use market_core::*;

// Synthetic generator (terminal fallback)
pub use market_sim::Simulator;

// Providers
#[cfg(feature = "polygon")]
pub use market_polygon::PolygonProvider;
#[cfg(feature = "yahoo")]
pub use market_yahoo::YahooProvider;

mod config;
mod service;

pub use config::{DataMode, ServiceConfig};
pub use service::StockService;
