#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/equityresearch/market/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Yahoo Finance market data provider.
//!
//! This crate implements the `market-core` traits against Yahoo Finance's
//! public quote, chart, and search endpoints. No credential is required; a
//! browser-like User-Agent and a 10-requests-per-minute limiter keep the
//! client within what the upstream tolerates.
//!
//! # Example
//!
//! ```no_run
//! use market_yahoo::YahooProvider;
//! use market_core::{MarketSummaryProvider, QuoteProvider, Symbol};
//!
//! # async fn example() -> market_core::Result<()> {
//! let provider = YahooProvider::new();
//! let quote = provider.fetch_quote(&Symbol::new("MSFT")).await?;
//! let overview = provider.fetch_market_summary().await?;
//! println!("{} @ {} (S&P {})", quote.symbol, quote.price, overview.sp500);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::{NaiveDate, TimeZone, Utc};
use market_core::{
    FixedWindowLimiter, HistoricalPoint, HistoryProvider, MarketDataProvider, MarketError,
    MarketOverview, MarketSummaryProvider, Quote, QuoteProvider, Result, SearchProvider,
    SearchResult, Symbol,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Base URL for Yahoo Finance endpoints.
const YAHOO_BASE_URL: &str = "https://query1.finance.yahoo.com";

/// Request ceiling per rolling 60-second window.
const REQUESTS_PER_MINUTE: u32 = 10;

/// Browser-like User-Agent; Yahoo rejects anonymous clients.
const USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36";

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Maximum number of search results requested.
const MAX_SEARCH_RESULTS: usize = 10;

/// Index symbols backing the four-reading market summary, in overview order.
const SUMMARY_SYMBOLS: &str = "^GSPC,^IXIC,^VIX,^TNX";

/// Yahoo Finance market data provider.
///
/// Implements [`QuoteProvider`], [`HistoryProvider`], [`SearchProvider`],
/// and [`MarketSummaryProvider`].
#[derive(Debug)]
pub struct YahooProvider {
    client: Client,
    base_url: String,
    limiter: FixedWindowLimiter,
}

impl YahooProvider {
    /// Creates a new Yahoo Finance provider with default settings.
    #[must_use]
    pub fn new() -> Self {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: YAHOO_BASE_URL.to_string(),
            limiter: FixedWindowLimiter::per_minute(REQUESTS_PER_MINUTE),
        }
    }

    /// Overrides the base URL. Intended for tests against a local server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Makes a rate-limited GET request and parses the JSON response.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        symbol: Option<&Symbol>,
    ) -> Result<T> {
        let url = format!("{}{endpoint}", self.base_url);
        self.limiter.acquire().await;
        debug!(endpoint, "Yahoo Finance request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(MarketError::RateLimited {
                provider: "Yahoo Finance".to_string(),
                retry_after: Some(Duration::from_secs(60)),
            }),
            StatusCode::NOT_FOUND => Err(MarketError::SymbolNotFound(
                symbol.map_or_else(|| endpoint.to_string(), ToString::to_string),
            )),
            status if !status.is_success() => {
                Err(MarketError::Network(format!("HTTP {status} for {endpoint}")))
            }
            _ => response
                .json::<T>()
                .await
                .map_err(|e| MarketError::Parse(e.to_string())),
        }
    }

    /// Fetches raw quote entries for a comma-separated symbol list.
    async fn fetch_raw_quotes(&self, symbols: &str) -> Result<Vec<YahooQuote>> {
        let endpoint = format!(
            "/v8/finance/quote?symbols={}",
            urlencoding::encode(symbols)
        );
        let envelope: QuoteEnvelope = self.get_json(&endpoint, None).await?;
        Ok(envelope.quote_response.result)
    }

    /// Fetches quotes for several symbols in a single upstream request,
    /// skipping entries the upstream returned without a price.
    pub async fn fetch_quotes(&self, symbols: &[Symbol]) -> Result<Vec<Quote>> {
        if symbols.is_empty() {
            return Ok(Vec::new());
        }
        let joined = symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");

        let raw = self.fetch_raw_quotes(&joined).await?;
        Ok(raw
            .into_iter()
            .filter_map(|entry| normalize_quote(entry).ok())
            .collect())
    }
}

impl Default for YahooProvider {
    fn default() -> Self {
        Self::new()
    }
}

/// Normalizes a raw Yahoo quote entry into the canonical model.
///
/// A missing regular-market price is a shape failure; all other absent
/// fields degrade to `None`, zero, or `"Unknown"`.
fn normalize_quote(entry: YahooQuote) -> Result<Quote> {
    let price = entry.regular_market_price.ok_or_else(|| {
        MarketError::Parse(format!("quote for {} missing market price", entry.symbol))
    })?;

    let name = entry
        .short_name
        .or(entry.long_name)
        .unwrap_or_else(|| entry.symbol.clone());

    Ok(Quote {
        symbol: Symbol::new(&entry.symbol),
        name,
        price,
        change: entry.regular_market_change.unwrap_or(0.0),
        change_percent: entry.regular_market_change_percent.unwrap_or(0.0),
        volume: entry.regular_market_volume.unwrap_or(0),
        market_cap: entry.market_cap.unwrap_or(0.0),
        pe: entry.trailing_pe,
        dividend: entry.dividend_yield,
        sector: entry.sector.unwrap_or_else(|| "Unknown".to_string()),
        industry: entry.industry.unwrap_or_else(|| "Unknown".to_string()),
    })
}

impl MarketDataProvider for YahooProvider {
    fn name(&self) -> &str {
        "Yahoo Finance"
    }

    fn description(&self) -> &str {
        "Yahoo Finance - batch quotes, chart history, search, and index summary"
    }
}

#[async_trait]
impl QuoteProvider for YahooProvider {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        let raw = self.fetch_raw_quotes(symbol.as_str()).await?;
        let entry = raw
            .into_iter()
            .next()
            .ok_or_else(|| MarketError::SymbolNotFound(symbol.to_string()))?;
        normalize_quote(entry)
    }
}

#[async_trait]
impl HistoryProvider for YahooProvider {
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

        let period1 = from
            .and_hms_opt(0, 0, 0)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);
        let period2 = to
            .and_hms_opt(23, 59, 59)
            .map(|dt| Utc.from_utc_datetime(&dt).timestamp())
            .unwrap_or(0);

        let endpoint = format!(
            "/v8/finance/chart/{}?period1={period1}&period2={period2}&interval=1d",
            symbol.as_str()
        );
        let envelope: ChartEnvelope = self.get_json(&endpoint, Some(symbol)).await?;

        if let Some(error) = envelope.chart.error {
            if error.code == "Not Found" {
                return Err(MarketError::SymbolNotFound(symbol.to_string()));
            }
            return Err(MarketError::Network(format!(
                "{}: {}",
                error.code, error.description
            )));
        }

        let data = envelope
            .chart
            .result
            .into_iter()
            .flatten()
            .next()
            .ok_or_else(|| MarketError::SymbolNotFound(symbol.to_string()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| MarketError::Parse("chart missing timestamp array".to_string()))?;
        let closes = data
            .indicators
            .quote
            .into_iter()
            .next()
            .and_then(|q| q.close)
            .ok_or_else(|| MarketError::Parse("chart missing close array".to_string()))?;

        if timestamps.len() != closes.len() {
            return Err(MarketError::Parse(format!(
                "chart arrays disagree: {} timestamps vs {} closes",
                timestamps.len(),
                closes.len()
            )));
        }

        let mut points: Vec<HistoricalPoint> = timestamps
            .into_iter()
            .zip(closes)
            .filter_map(|(ts, close)| {
                let date = Utc.timestamp_opt(ts, 0).single()?.date_naive();
                Some(HistoricalPoint::new(date, close?))
            })
            .filter(HistoricalPoint::is_valid)
            .collect();
        points.sort_by_key(|p| p.date);

        Ok(points)
    }
}

#[async_trait]
impl SearchProvider for YahooProvider {
    async fn fetch_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let endpoint = format!(
            "/v1/finance/search?q={}&quotesCount={MAX_SEARCH_RESULTS}&newsCount=0",
            urlencoding::encode(query)
        );
        let envelope: SearchEnvelope = self.get_json(&endpoint, None).await?;

        // Yahoo returns funds, futures, and currencies too; equities only.
        Ok(envelope
            .quotes
            .unwrap_or_default()
            .into_iter()
            .filter(|hit| hit.quote_type.as_deref() == Some("EQUITY"))
            .map(|hit| {
                let name = hit
                    .shortname
                    .or(hit.longname)
                    .unwrap_or_else(|| hit.symbol.clone());
                SearchResult::new(Symbol::new(hit.symbol), name)
            })
            .collect())
    }
}

#[async_trait]
impl MarketSummaryProvider for YahooProvider {
    async fn fetch_market_summary(&self) -> Result<MarketOverview> {
        let raw = self.fetch_raw_quotes(SUMMARY_SYMBOLS).await?;

        let index_level = |symbol: &str| -> Result<f64> {
            raw.iter()
                .find(|entry| entry.symbol == symbol)
                .and_then(|entry| entry.regular_market_price)
                .ok_or_else(|| {
                    MarketError::Parse(format!("market summary missing index {symbol}"))
                })
        };

        Ok(MarketOverview {
            sp500: index_level("^GSPC")?,
            nasdaq: index_level("^IXIC")?,
            vix: index_level("^VIX")?,
            treasury_10y: index_level("^TNX")?,
        })
    }
}

// ============================================================================
// Yahoo Finance API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct QuoteEnvelope {
    quote_response: QuoteResponse,
}

#[derive(Debug, Deserialize)]
struct QuoteResponse {
    #[serde(default)]
    result: Vec<YahooQuote>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YahooQuote {
    symbol: String,
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
    regular_market_change: Option<f64>,
    regular_market_change_percent: Option<f64>,
    regular_market_volume: Option<u64>,
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    dividend_yield: Option<f64>,
    sector: Option<String>,
    industry: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ApiError>,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteArrays>,
}

#[derive(Debug, Deserialize)]
struct QuoteArrays {
    close: Option<Vec<Option<f64>>>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    quotes: Option<Vec<SearchHit>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    symbol: String,
    shortname: Option<String>,
    longname: Option<String>,
    quote_type: Option<String>,
}
