#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/equityresearch/market/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

//! Polygon.io market data provider.
//!
//! This crate implements the `market-core` traits for the
//! [Polygon](https://polygon.io/) REST API:
//!
//! - Snapshot quotes joined with ticker reference detail
//! - Daily aggregate bars for price history
//! - Ticker search restricted to common stock
//! - Market open/closed status
//!
//! # Example
//!
//! ```no_run
//! use market_polygon::PolygonProvider;
//! use market_core::{QuoteProvider, Symbol};
//!
//! # async fn example() -> market_core::Result<()> {
//! let provider = PolygonProvider::new(Some("your_api_key".to_string()));
//! let quote = provider.fetch_quote(&Symbol::new("AAPL")).await?;
//! println!("{} @ {}", quote.symbol, quote.price);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate};
use market_core::{
    FixedWindowLimiter, HistoricalPoint, HistoryProvider, MarketDataProvider, MarketError, Quote,
    QuoteProvider, Result, SearchProvider, SearchResult, Symbol,
};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use tracing::debug;

/// Base URL for the Polygon REST API.
const POLYGON_BASE_URL: &str = "https://api.polygon.io";

/// Free-tier request ceiling per rolling 60-second window.
const REQUESTS_PER_MINUTE: u32 = 5;

/// Maximum number of search results requested.
const MAX_SEARCH_RESULTS: usize = 10;

/// HTTP request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Polygon.io market data provider.
///
/// Keyed by an API credential; a provider constructed without one fails
/// every request deterministically with
/// [`MarketError::ProviderNotConfigured`] before touching the network.
pub struct PolygonProvider {
    client: Client,
    api_key: Option<String>,
    base_url: String,
    limiter: FixedWindowLimiter,
}

impl fmt::Debug for PolygonProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolygonProvider")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl PolygonProvider {
    /// Creates a new Polygon provider.
    ///
    /// Pass `None` when no credential is configured; the provider then fails
    /// every request with a configuration error instead of issuing a doomed
    /// network call.
    #[must_use]
    pub fn new(api_key: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: POLYGON_BASE_URL.to_string(),
            limiter: FixedWindowLimiter::per_minute(REQUESTS_PER_MINUTE),
        }
    }

    /// Overrides the base URL. Intended for tests against a local server.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Builds a request URL with the API key appended, or fails when no
    /// credential is configured.
    fn url(&self, endpoint: &str) -> Result<String> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            MarketError::ProviderNotConfigured("Polygon API key not set".to_string())
        })?;
        let separator = if endpoint.contains('?') { '&' } else { '?' };
        Ok(format!(
            "{}{endpoint}{separator}apikey={api_key}",
            self.base_url
        ))
    }

    /// Makes a rate-limited GET request and parses the JSON response.
    ///
    /// A 404 maps to `SymbolNotFound` for `symbol` when one is given.
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        endpoint: &str,
        symbol: Option<&Symbol>,
    ) -> Result<T> {
        let url = self.url(endpoint)?;
        self.limiter.acquire().await;
        debug!(endpoint, "Polygon request");

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| MarketError::Network(e.to_string()))?;

        match response.status() {
            StatusCode::TOO_MANY_REQUESTS => Err(MarketError::RateLimited {
                provider: "Polygon".to_string(),
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

    /// Fetches the snapshot quote for a symbol.
    async fn fetch_snapshot(&self, symbol: &Symbol) -> Result<SnapshotResponse> {
        let endpoint = format!(
            "/v2/snapshot/locale/us/markets/stocks/tickers/{}",
            symbol.as_str()
        );
        self.get_json(&endpoint, Some(symbol)).await
    }

    /// Fetches ticker reference detail for a symbol.
    async fn fetch_ticker_details(&self, symbol: &Symbol) -> Result<TickerDetailsResponse> {
        let endpoint = format!("/v3/reference/tickers/{}", symbol.as_str());
        self.get_json(&endpoint, Some(symbol)).await
    }

    /// Fetches current market open/closed status.
    pub async fn market_status(&self) -> Result<MarketStatus> {
        let status: MarketStatusResponse = self.get_json("/v1/marketstatus/now", None).await?;
        Ok(MarketStatus {
            market: status.market.unwrap_or_else(|| "unknown".to_string()),
            server_time: status.server_time,
        })
    }
}

impl MarketDataProvider for PolygonProvider {
    fn name(&self) -> &str {
        "Polygon"
    }

    fn description(&self) -> &str {
        "Polygon.io - snapshot quotes, daily aggregates, and ticker reference data"
    }
}

#[async_trait]
impl QuoteProvider for PolygonProvider {
    async fn fetch_quote(&self, symbol: &Symbol) -> Result<Quote> {
        let (snapshot, details) = tokio::join!(
            self.fetch_snapshot(symbol),
            self.fetch_ticker_details(symbol),
        );
        let snapshot = snapshot?;
        let details = details?;

        let price = snapshot
            .results
            .into_iter()
            .flatten()
            .next()
            .and_then(|t| t.last)
            .and_then(|l| l.price)
            .ok_or_else(|| {
                MarketError::Parse(format!("snapshot for {symbol} missing last trade price"))
            })?;

        let info = details.results.ok_or_else(|| {
            MarketError::Parse(format!("ticker detail for {symbol} missing results"))
        })?;

        // The snapshot carries no prior close, so change is reported as zero
        // rather than fabricated. Volume, P/E and dividend are likewise not
        // part of this payload.
        Ok(Quote {
            symbol: symbol.clone(),
            name: info.name.unwrap_or_else(|| symbol.to_string()),
            price,
            change: 0.0,
            change_percent: 0.0,
            volume: 0,
            market_cap: info.market_cap.unwrap_or(0.0),
            pe: None,
            dividend: None,
            sector: info.sic_description.unwrap_or_else(|| "Unknown".to_string()),
            industry: info.ticker_type.unwrap_or_else(|| "Unknown".to_string()),
        })
    }
}

#[async_trait]
impl HistoryProvider for PolygonProvider {
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

        let endpoint = format!(
            "/v2/aggs/ticker/{}/range/1/day/{from}/{to}",
            symbol.as_str()
        );
        let response: AggregatesResponse = self.get_json(&endpoint, Some(symbol)).await?;

        let bars = response.results.ok_or_else(|| {
            MarketError::Parse(format!("aggregates for {symbol} missing results"))
        })?;

        let mut points: Vec<HistoricalPoint> = bars
            .into_iter()
            .filter_map(|bar| {
                let date = DateTime::from_timestamp_millis(bar.timestamp)?.date_naive();
                Some(HistoricalPoint::new(date, bar.close))
            })
            .filter(HistoricalPoint::is_valid)
            .collect();
        points.sort_by_key(|p| p.date);

        Ok(points)
    }
}

#[async_trait]
impl SearchProvider for PolygonProvider {
    async fn fetch_search(&self, query: &str) -> Result<Vec<SearchResult>> {
        let endpoint = format!(
            "/v3/reference/tickers?search={}&limit={MAX_SEARCH_RESULTS}",
            urlencoding::encode(query)
        );
        let response: TickerSearchResponse = self.get_json(&endpoint, None).await?;

        // Polygon differentiates instrument types; only common stock passes.
        Ok(response
            .results
            .unwrap_or_default()
            .into_iter()
            .filter(|entry| entry.ticker_type.as_deref().is_none_or(|t| t == "CS"))
            .map(|entry| {
                let name = entry.name.unwrap_or_else(|| entry.ticker.clone());
                SearchResult::new(Symbol::new(entry.ticker), name)
            })
            .collect())
    }
}

/// Current market open/closed status.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MarketStatus {
    /// Overall market state, e.g. "open" or "closed".
    pub market: String,
    /// Server timestamp accompanying the status, when present.
    pub server_time: Option<String>,
}

// ============================================================================
// Polygon API Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
struct SnapshotResponse {
    results: Option<Vec<SnapshotTicker>>,
}

#[derive(Debug, Deserialize)]
struct SnapshotTicker {
    last: Option<LastTrade>,
}

#[derive(Debug, Deserialize)]
struct LastTrade {
    price: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct TickerDetailsResponse {
    results: Option<TickerDetails>,
}

#[derive(Debug, Deserialize)]
struct TickerDetails {
    name: Option<String>,
    market_cap: Option<f64>,
    sic_description: Option<String>,
    #[serde(rename = "type")]
    ticker_type: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AggregatesResponse {
    results: Option<Vec<AggregateBar>>,
}

#[derive(Debug, Deserialize)]
struct AggregateBar {
    /// Closing price.
    #[serde(rename = "c")]
    close: f64,
    /// Millisecond epoch timestamp of the bar.
    #[serde(rename = "t")]
    timestamp: i64,
}

#[derive(Debug, Deserialize)]
struct TickerSearchResponse {
    results: Option<Vec<TickerSearchEntry>>,
}

#[derive(Debug, Deserialize)]
struct TickerSearchEntry {
    ticker: String,
    name: Option<String>,
    #[serde(rename = "type")]
    ticker_type: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MarketStatusResponse {
    market: Option<String>,
    server_time: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider_for(server: &MockServer) -> PolygonProvider {
        PolygonProvider::new(Some("test_key".to_string())).with_base_url(server.uri())
    }

    #[test]
    fn url_appends_api_key() {
        let provider = PolygonProvider::new(Some("test_key".to_string()));
        assert_eq!(
            provider.url("/v1/marketstatus/now").unwrap(),
            "https://api.polygon.io/v1/marketstatus/now?apikey=test_key"
        );
        assert_eq!(
            provider.url("/v3/reference/tickers?search=apple").unwrap(),
            "https://api.polygon.io/v3/reference/tickers?search=apple&apikey=test_key"
        );
    }

    #[test]
    fn missing_credential_is_a_configuration_error() {
        let provider = PolygonProvider::new(None);
        let err = provider.url("/v1/marketstatus/now").unwrap_err();
        assert!(matches!(err, MarketError::ProviderNotConfigured(_)));
    }

    #[tokio::test]
    async fn unconfigured_provider_fails_without_network() {
        // No server is running; a network attempt would surface as a
        // Network error, not a configuration error.
        let provider = PolygonProvider::new(None).with_base_url("http://127.0.0.1:1");
        let err = provider.fetch_quote(&Symbol::new("AAPL")).await.unwrap_err();
        assert!(matches!(err, MarketError::ProviderNotConfigured(_)));
    }

    #[test]
    fn debug_redacts_api_key() {
        let provider = PolygonProvider::new(Some("secret_key_12345".to_string()));
        let debug_str = format!("{provider:?}");
        assert!(!debug_str.contains("secret_key_12345"));
        assert!(debug_str.contains("[REDACTED]"));
    }

    #[test]
    fn provider_metadata() {
        let provider = PolygonProvider::new(None);
        assert_eq!(provider.name(), "Polygon");
        assert!(!provider.description().is_empty());
    }

    #[tokio::test]
    async fn fetch_quote_joins_snapshot_and_details() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/snapshot/locale/us/markets/stocks/tickers/AAPL"))
            .and(query_param("apikey", "test_key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{"last": {"price": 178.10}}]
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/reference/tickers/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": {
                    "ticker": "AAPL",
                    "name": "Apple Inc.",
                    "market_cap": 2750000000000.0,
                    "sic_description": "Electronic Computers",
                    "type": "CS"
                }
            })))
            .mount(&server)
            .await;

        let quote = provider_for(&server)
            .fetch_quote(&Symbol::new("aapl"))
            .await
            .unwrap();

        assert_eq!(quote.symbol.as_str(), "AAPL");
        assert_eq!(quote.name, "Apple Inc.");
        assert_eq!(quote.price, 178.10);
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.change_percent, 0.0);
        assert_eq!(quote.sector, "Electronic Computers");
        assert_eq!(quote.industry, "CS");
        assert!(quote.pe.is_none());
    }

    #[tokio::test]
    async fn fetch_quote_without_last_trade_is_a_shape_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v2/snapshot/locale/us/markets/stocks/tickers/AAPL"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"results": [{}]})))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/v3/reference/tickers/AAPL"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"results": {"ticker": "AAPL", "name": "Apple Inc."}})),
            )
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .fetch_quote(&Symbol::new("AAPL"))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Parse(_)));
    }

    #[tokio::test]
    async fn server_error_maps_to_network_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .fetch_quote(&Symbol::new("AAPL"))
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Network(_)));
    }

    #[tokio::test]
    async fn missing_ticker_maps_to_symbol_not_found() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .fetch_quote(&Symbol::new("ZZZZ"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn history_drops_invalid_closes_and_sorts_ascending() {
        let server = MockServer::start().await;

        // Bars out of order, with one zero close that must be dropped.
        Mock::given(method("GET"))
            .and(path("/v2/aggs/ticker/TSLA/range/1/day/2024-06-01/2024-06-05"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"c": 250.5, "t": 1717545600000i64},
                    {"c": 0.0, "t": 1717459200000i64},
                    {"c": 248.1, "t": 1717372800000i64}
                ]
            })))
            .mount(&server)
            .await;

        let points = provider_for(&server)
            .fetch_history(
                &Symbol::new("TSLA"),
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(points.len(), 2);
        assert!(points[0].date < points[1].date);
        assert_eq!(points[0].price, 248.1);
        assert_eq!(points[1].price, 250.5);
    }

    #[tokio::test]
    async fn history_missing_results_is_a_shape_error() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ticker": "TSLA"})))
            .mount(&server)
            .await;

        let err = provider_for(&server)
            .fetch_history(
                &Symbol::new("TSLA"),
                NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
                NaiveDate::from_ymd_opt(2024, 6, 5).unwrap(),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, MarketError::Parse(_)));
    }

    #[tokio::test]
    async fn search_keeps_only_common_stock() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v3/reference/tickers"))
            .and(query_param("search", "apple"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {"ticker": "AAPL", "name": "Apple Inc.", "type": "CS"},
                    {"ticker": "AAPL241220C00150000", "name": "AAPL Call", "type": "OPT"},
                    {"ticker": "APLE", "name": "Apple Hospitality REIT"}
                ]
            })))
            .mount(&server)
            .await;

        let results = provider_for(&server).fetch_search("apple").await.unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].symbol.as_str(), "AAPL");
        assert_eq!(results[1].symbol.as_str(), "APLE");
    }

    #[tokio::test]
    async fn market_status_maps_fields() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/v1/marketstatus/now"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "market": "open",
                "serverTime": "2024-06-03T14:30:00-04:00"
            })))
            .mount(&server)
            .await;

        let status = provider_for(&server).market_status().await.unwrap();
        assert_eq!(status.market, "open");
        assert!(status.server_time.is_some());
    }
}
