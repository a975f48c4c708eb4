#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/equityresearch/market/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Synthetic market data generator.
//!
//! The [`Simulator`] perturbs a fixed seed catalog with bounded uniform
//! randomness to emulate intraday movement, and injects a small artificial
//! latency to emulate realistic response times. It implements the provider
//! traits from `market-core` so it can terminate any fallback chain.
//!
//! # Example
//!
//! ```no_run
//! use market_sim::Simulator;
//! use market_core::Symbol;
//!
//! # async fn example() {
//! let sim = Simulator::new();
//! if let Some(quote) = sim.quote(&Symbol::new("AAPL")).await {
//!     println!("{} @ {}", quote.symbol, quote.price);
//! }
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use market_core::{
    HistoricalPoint, HistoryProvider, MarketDataProvider, MarketError, MarketOverview,
    MarketSummaryProvider, Quote, QuoteProvider, Result, SearchProvider, SearchResult, Symbol,
};
use rand::Rng;
use tokio::time::sleep;
use tracing::debug;

/// Maximum intraday drift applied to a seed price (±1%).
const QUOTE_DRIFT: f64 = 0.01;

/// Maximum independent daily return in a simulated history walk (±2.5%).
const DAILY_DRIFT: f64 = 0.025;

/// Maximum drift for the broad-equity and tech indices (±0.5%).
const EQUITY_INDEX_DRIFT: f64 = 0.005;

/// Maximum drift for the volatility index (±2.5%).
const VIX_DRIFT: f64 = 0.025;

/// Maximum drift for the 10-year benchmark yield (±1%).
const TREASURY_DRIFT: f64 = 0.01;

/// Baseline level for the broad-equity index.
const SP500_BASE: f64 = 4450.50;

/// Baseline level for the tech-weighted index.
const NASDAQ_BASE: f64 = 13850.30;

/// Baseline level for the volatility index.
const VIX_BASE: f64 = 16.8;

/// Baseline 10-year benchmark yield.
const TREASURY_10Y_BASE: f64 = 4.2;

/// Maximum number of search results returned.
const MAX_SEARCH_RESULTS: usize = 10;

/// Base artificial latency injected before responding.
const DEFAULT_LATENCY: Duration = Duration::from_millis(200);

/// A seed stock the simulator knows how to perturb.
#[derive(Debug)]
struct SeedStock {
    symbol: &'static str,
    name: &'static str,
    price: f64,
    volume: u64,
    market_cap: f64,
    pe: Option<f64>,
    dividend: Option<f64>,
    sector: &'static str,
    industry: &'static str,
}

/// The fixed seed catalog. The simulator never invents symbols outside it.
const SEED_CATALOG: &[SeedStock] = &[
    SeedStock {
        symbol: "AAPL",
        name: "Apple Inc.",
        price: 175.43,
        volume: 45_234_567,
        market_cap: 2_750_000_000_000.0,
        pe: Some(28.5),
        dividend: Some(0.96),
        sector: "Technology",
        industry: "Consumer Electronics",
    },
    SeedStock {
        symbol: "TSLA",
        name: "Tesla, Inc.",
        price: 248.87,
        volume: 123_456_789,
        market_cap: 790_000_000_000.0,
        pe: Some(65.2),
        dividend: None,
        sector: "Consumer Discretionary",
        industry: "Auto Manufacturers",
    },
    SeedStock {
        symbol: "MSFT",
        name: "Microsoft Corporation",
        price: 378.85,
        volume: 23_456_789,
        market_cap: 2_810_000_000_000.0,
        pe: Some(32.1),
        dividend: Some(3.00),
        sector: "Technology",
        industry: "Software - Infrastructure",
    },
    SeedStock {
        symbol: "GOOGL",
        name: "Alphabet Inc.",
        price: 138.21,
        volume: 34_567_890,
        market_cap: 1_750_000_000_000.0,
        pe: Some(26.8),
        dividend: None,
        sector: "Communication Services",
        industry: "Internet Content & Information",
    },
    SeedStock {
        symbol: "AMZN",
        name: "Amazon.com, Inc.",
        price: 145.32,
        volume: 45_678_901,
        market_cap: 1_520_000_000_000.0,
        pe: Some(42.5),
        dividend: None,
        sector: "Consumer Discretionary",
        industry: "Internet Retail",
    },
    SeedStock {
        symbol: "NVDA",
        name: "NVIDIA Corporation",
        price: 875.29,
        volume: 56_789_012,
        market_cap: 2_150_000_000_000.0,
        pe: Some(68.4),
        dividend: Some(0.16),
        sector: "Technology",
        industry: "Semiconductors",
    },
];

fn find_seed(symbol: &Symbol) -> Option<&'static SeedStock> {
    SEED_CATALOG.iter().find(|s| s.symbol == symbol.as_str())
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Synthetic market data generator.
///
/// Values are perturbed by uniform randomness on fixed symmetric intervals
/// and rounded to 2 decimal places (1 for the volatility index).
#[derive(Debug)]
pub struct Simulator {
    latency: Duration,
}

impl Simulator {
    /// Creates a simulator with the default artificial latency.
    #[must_use]
    pub fn new() -> Self {
        Self {
            latency: DEFAULT_LATENCY,
        }
    }

    /// Creates a simulator with a custom base latency.
    ///
    /// `Duration::ZERO` disables latency injection entirely, which is useful
    /// in tests.
    #[must_use]
    pub const fn with_latency(latency: Duration) -> Self {
        Self { latency }
    }

    /// Sleeps for the base latency plus a random jitter of up to the same
    /// amount, emulating a real provider's response time.
    async fn inject_latency(&self) {
        if self.latency.is_zero() {
            return;
        }
        let jitter = {
            let mut rng = rand::thread_rng();
            self.latency.mul_f64(rng.gen_range(0.0..1.0))
        };
        sleep(self.latency + jitter).await;
    }

    /// Returns a quote for `symbol`, or `None` if the symbol is not in the
    /// seed catalog.
    ///
    /// The seed price is perturbed by a uniform ±1% and `change` /
    /// `change_percent` are recomputed from the perturbed price relative to
    /// the seed price.
    pub async fn quote(&self, symbol: &Symbol) -> Option<Quote> {
        self.inject_latency().await;

        let seed = find_seed(symbol)?;

        let variation = {
            let mut rng = rand::thread_rng();
            rng.gen_range(-QUOTE_DRIFT..=QUOTE_DRIFT)
        };
        let price = round2(seed.price * (1.0 + variation));
        let change = round2(price - seed.price);
        let change_percent = round2(change / seed.price * 100.0);

        debug!(symbol = %symbol, price, "simulated quote");

        Some(Quote {
            symbol: symbol.clone(),
            name: seed.name.to_string(),
            price,
            change,
            change_percent,
            volume: seed.volume,
            market_cap: seed.market_cap,
            pe: seed.pe,
            dividend: seed.dividend,
            sector: seed.sector.to_string(),
            industry: seed.industry.to_string(),
        })
    }

    /// Returns exactly `days` daily closing prices ending today, ascending by
    /// date, or an empty series for a symbol outside the catalog.
    ///
    /// Each day's close compounds an independent uniform ±2.5% return onto a
    /// running price starting from the seed.
    pub async fn history(&self, symbol: &Symbol, days: u32) -> Vec<HistoricalPoint> {
        self.inject_latency().await;

        let Some(seed) = find_seed(symbol) else {
            return Vec::new();
        };

        let today = Utc::now().date_naive();
        let mut price = seed.price;
        let mut points = Vec::with_capacity(days as usize);

        for offset in (0..i64::from(days)).rev() {
            let date = today - chrono::Duration::days(offset);
            let daily_return = {
                let mut rng = rand::thread_rng();
                rng.gen_range(-DAILY_DRIFT..=DAILY_DRIFT)
            };
            price *= 1.0 + daily_return;
            points.push(HistoricalPoint::new(date, round2(price)));
        }

        points
    }

    /// Searches the seed catalog by case-insensitive substring match against
    /// symbol and name, returning at most 10 results.
    pub async fn search(&self, query: &str) -> Vec<SearchResult> {
        self.inject_latency().await;

        let needle = query.to_lowercase();
        SEED_CATALOG
            .iter()
            .filter(|s| {
                s.symbol.to_lowercase().contains(&needle)
                    || s.name.to_lowercase().contains(&needle)
            })
            .map(|s| SearchResult::new(Symbol::new(s.symbol), s.name))
            .take(MAX_SEARCH_RESULTS)
            .collect()
    }

    /// Returns the four index readings, each perturbed from its fixed
    /// baseline by a small uniform factor.
    pub async fn market_overview(&self) -> MarketOverview {
        self.inject_latency().await;

        let mut rng = rand::thread_rng();
        MarketOverview {
            sp500: round2(SP500_BASE * (1.0 + rng.gen_range(-EQUITY_INDEX_DRIFT..=EQUITY_INDEX_DRIFT))),
            nasdaq: round2(
                NASDAQ_BASE * (1.0 + rng.gen_range(-EQUITY_INDEX_DRIFT..=EQUITY_INDEX_DRIFT)),
            ),
            vix: round1(VIX_BASE * (1.0 + rng.gen_range(-VIX_DRIFT..=VIX_DRIFT))),
            treasury_10y: round2(
                TREASURY_10Y_BASE * (1.0 + rng.gen_range(-TREASURY_DRIFT..=TREASURY_DRIFT)),
            ),
        }
    }
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl MarketDataProvider for Simulator {
    fn name(&self) -> &str {
        "Simulator"
    }

    fn description(&self) -> &str {
        "Synthetic data generator backed by a fixed seed catalog"
    }
}

#[async_trait]
impl QuoteProvider for Simulator {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        self.quote(symbol)
            .await
            .ok_or_else(|| MarketError::SymbolNotFound(symbol.to_string()))
    }
}

#[async_trait]
impl HistoryProvider for Simulator {
    async fn fetch_history(
        &self,
        symbol: &Symbol,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<HistoricalPoint>> {
        if from > to {
            return Err(MarketError::InvalidParameter(format!(
                "start date {from} is after end date {to}"
            )));
        }
        let days = (to - from).num_days() + 1;
        Ok(self.history(symbol, days as u32).await)
    }
}

#[async_trait]
impl SearchProvider for Simulator {
    async fn fetch_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        Ok(self.search(query).await)
    }
}

#[async_trait]
impl MarketSummaryProvider for Simulator {
    async fn fetch_market_summary(&self) -> Result<MarketOverview> {
        Ok(self.market_overview().await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sim() -> Simulator {
        Simulator::with_latency(Duration::ZERO)
    }

    #[tokio::test]
    async fn quote_stays_within_drift_of_seed() {
        let sim = sim();
        for seed in SEED_CATALOG {
            let quote = sim.quote(&Symbol::new(seed.symbol)).await.unwrap();
            let bound = seed.price * QUOTE_DRIFT + 0.01;
            assert!(
                (quote.price - seed.price).abs() <= bound,
                "{}: {} vs seed {}",
                seed.symbol,
                quote.price,
                seed.price
            );
        }
    }

    #[tokio::test]
    async fn quote_for_unknown_symbol_is_none() {
        assert!(sim().quote(&Symbol::new("ZZZZ")).await.is_none());
    }

    #[tokio::test]
    async fn quote_aapl_scenario() {
        let quote = sim().quote(&Symbol::new("AAPL")).await.unwrap();
        assert_eq!(quote.symbol.as_str(), "AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert!((quote.price - 175.43).abs() <= 175.43 * 0.01 + 0.01);
    }

    #[tokio::test]
    async fn quote_accepts_lowercase_symbols() {
        let quote = sim().quote(&Symbol::new("nvda")).await.unwrap();
        assert_eq!(quote.symbol.as_str(), "NVDA");
    }

    #[tokio::test]
    async fn change_percent_is_consistent_with_change() {
        let sim = sim();
        for _ in 0..20 {
            let quote = sim.quote(&Symbol::new("TSLA")).await.unwrap();
            let prior = quote.price - quote.change;
            let derived = quote.change / prior * 100.0;
            assert!(
                (quote.change_percent - derived).abs() < 0.05,
                "stored {} vs derived {}",
                quote.change_percent,
                derived
            );
        }
    }

    #[tokio::test]
    async fn history_has_exact_length_and_ascending_unique_dates() {
        let points = sim().history(&Symbol::new("MSFT"), 30).await;
        assert_eq!(points.len(), 30);
        for pair in points.windows(2) {
            assert!(pair[0].date < pair[1].date);
        }
        assert_eq!(points.last().unwrap().date, Utc::now().date_naive());
    }

    #[tokio::test]
    async fn history_prices_are_positive_and_rounded() {
        let points = sim().history(&Symbol::new("AMZN"), 90).await;
        for point in &points {
            assert!(point.is_valid());
            assert_eq!(point.price, round2(point.price));
        }
    }

    #[tokio::test]
    async fn history_for_unknown_symbol_is_empty() {
        assert!(sim().history(&Symbol::new("ZZZZ"), 30).await.is_empty());
    }

    #[tokio::test]
    async fn search_matches_symbol_and_name_case_insensitively() {
        let sim = sim();

        let by_name = sim.search("apple").await;
        assert_eq!(by_name.len(), 1);
        assert_eq!(by_name[0].symbol.as_str(), "AAPL");

        let by_symbol = sim.search("tsl").await;
        assert_eq!(by_symbol.len(), 1);
        assert_eq!(by_symbol[0].name, "Tesla, Inc.");
    }

    #[tokio::test]
    async fn search_caps_results() {
        // "a" matches every catalog entry's symbol or name.
        let results = sim().search("a").await;
        assert!(!results.is_empty());
        assert!(results.len() <= MAX_SEARCH_RESULTS);
    }

    #[tokio::test]
    async fn search_with_no_match_is_empty() {
        assert!(sim().search("zzzz").await.is_empty());
    }

    #[tokio::test]
    async fn overview_stays_within_documented_bounds() {
        let overview = sim().market_overview().await;

        let in_bounds = |value: f64, base: f64, drift: f64| {
            (value - base).abs() <= base * drift + 0.06
        };
        assert!(in_bounds(overview.sp500, SP500_BASE, EQUITY_INDEX_DRIFT));
        assert!(in_bounds(overview.nasdaq, NASDAQ_BASE, EQUITY_INDEX_DRIFT));
        assert!(in_bounds(overview.vix, VIX_BASE, VIX_DRIFT));
        assert!(in_bounds(overview.treasury_10y, TREASURY_10Y_BASE, TREASURY_DRIFT));
        assert_eq!(overview.vix, round1(overview.vix));
    }

    #[tokio::test]
    async fn provider_trait_maps_unknown_symbol_to_not_found() {
        let sim = sim();
        let err = sim.fetch_quote(&Symbol::new("ZZZZ")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test(start_paused = true)]
    async fn latency_injection_suspends_the_caller() {
        let sim = Simulator::with_latency(Duration::from_millis(200));
        let start = tokio::time::Instant::now();
        let _ = sim.quote(&Symbol::new("AAPL")).await;
        assert!(start.elapsed() >= Duration::from_millis(200));
    }
}
