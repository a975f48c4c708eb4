//! The fallback orchestrator for market data requests.

use std::sync::Arc;

use chrono::Utc;
use futures::future::join_all;
use tracing::{debug, warn};

use market_core::{
    HistoricalPoint, HistoryProvider, MarketOverview, MarketSummaryProvider, Quote, QuoteProvider,
    SearchProvider, SearchResult, Symbol,
};
use market_sim::Simulator;

use crate::config::{DataMode, ServiceConfig};

/// The single entry point the presentation layer calls for market data.
///
/// Providers are explicitly constructed and registered per capability; for
/// each request the service tries them in registration order and, on any
/// failure, falls back to the next and finally to the synthetic generator.
/// Failures never cross this boundary: every operation degrades to either
/// synthetic data or an empty/`None` result.
///
/// # Example
///
/// ```rust,ignore
/// use market::{DataMode, ServiceConfig, StockService, Symbol};
///
/// let service = StockService::from_config(&ServiceConfig::from_env());
/// let quote = service.get_stock(&Symbol::new("AAPL")).await;
/// ```
pub struct StockService {
    mode: DataMode,
    quote_providers: Vec<Arc<dyn QuoteProvider>>,
    history_providers: Vec<Arc<dyn HistoryProvider>>,
    search_providers: Vec<Arc<dyn SearchProvider>>,
    summary_providers: Vec<Arc<dyn MarketSummaryProvider>>,
    simulator: Arc<Simulator>,
}

impl std::fmt::Debug for StockService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StockService")
            .field("mode", &self.mode)
            .field(
                "quote_providers",
                &self
                    .quote_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "history_providers",
                &self
                    .history_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "search_providers",
                &self
                    .search_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .field(
                "summary_providers",
                &self
                    .summary_providers
                    .iter()
                    .map(|p| p.name())
                    .collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl StockService {
    /// Creates a service with no live providers registered.
    ///
    /// The mode is decided here, once; it is never re-evaluated per request.
    #[must_use]
    pub fn new(mode: DataMode) -> Self {
        Self {
            mode,
            quote_providers: Vec::new(),
            history_providers: Vec::new(),
            search_providers: Vec::new(),
            summary_providers: Vec::new(),
            simulator: Arc::new(Simulator::new()),
        }
    }

    /// Builds a service from a [`ServiceConfig`], registering the default
    /// provider chain (Polygon first, then Yahoo Finance).
    #[must_use]
    pub fn from_config(config: &ServiceConfig) -> Self {
        #[cfg_attr(not(any(feature = "polygon", feature = "yahoo")), allow(unused_mut))]
        let mut service = Self::new(config.mode);
        #[cfg(feature = "polygon")]
        {
            service = service.with_polygon(config.polygon_api_key.clone());
        }
        #[cfg(feature = "yahoo")]
        {
            service = service.with_yahoo();
        }
        service
    }

    /// Replaces the simulator instance, e.g. to disable artificial latency.
    #[must_use]
    pub fn with_simulator(mut self, simulator: Arc<Simulator>) -> Self {
        self.simulator = simulator;
        self
    }

    /// Registers a quote provider at the end of the fallback chain.
    pub fn register_quote(&mut self, provider: Arc<dyn QuoteProvider>) {
        debug!(provider = provider.name(), "Registering quote provider");
        self.quote_providers.push(provider);
    }

    /// Registers a history provider at the end of the fallback chain.
    pub fn register_history(&mut self, provider: Arc<dyn HistoryProvider>) {
        debug!(provider = provider.name(), "Registering history provider");
        self.history_providers.push(provider);
    }

    /// Registers a search provider at the end of the fallback chain.
    pub fn register_search(&mut self, provider: Arc<dyn SearchProvider>) {
        debug!(provider = provider.name(), "Registering search provider");
        self.search_providers.push(provider);
    }

    /// Registers a market summary provider at the end of the fallback chain.
    pub fn register_summary(&mut self, provider: Arc<dyn MarketSummaryProvider>) {
        debug!(provider = provider.name(), "Registering summary provider");
        self.summary_providers.push(provider);
    }

    /// Adds the Polygon provider for quotes, history, and search.
    ///
    /// Passing `None` for the credential keeps the provider registered but
    /// failing each request with a configuration error, which simply moves
    /// the chain along to the next source.
    #[cfg(feature = "polygon")]
    #[must_use]
    pub fn with_polygon(mut self, api_key: Option<String>) -> Self {
        let provider = Arc::new(market_polygon::PolygonProvider::new(api_key));
        self.register_quote(provider.clone());
        self.register_history(provider.clone());
        self.register_search(provider);
        self
    }

    /// Adds the Yahoo Finance provider for all four capabilities.
    #[cfg(feature = "yahoo")]
    #[must_use]
    pub fn with_yahoo(mut self) -> Self {
        let provider = Arc::new(market_yahoo::YahooProvider::new());
        self.register_quote(provider.clone());
        self.register_history(provider.clone());
        self.register_search(provider.clone());
        self.register_summary(provider);
        self
    }

    /// Fetches a quote for one symbol.
    ///
    /// In simulated mode this delegates straight to the generator. In live
    /// mode providers are tried in order; any failure falls through to the
    /// next and finally to the generator. An explicit "symbol not found"
    /// from a live provider returns `None` without consulting the generator,
    /// so stale synthetic data cannot mask a nonexistent symbol.
    pub async fn get_stock(&self, symbol: &Symbol) -> Option<Quote> {
        if self.mode == DataMode::Simulated {
            return self.simulator.quote(symbol).await;
        }

        for provider in &self.quote_providers {
            debug!(provider = provider.name(), symbol = %symbol, "Fetching quote");
            match provider.fetch_quote(symbol).await {
                Ok(quote) => return Some(quote),
                Err(e) if e.is_not_found() => {
                    debug!(provider = provider.name(), symbol = %symbol, "Symbol not found upstream");
                    return None;
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Quote provider failed, trying next"
                    );
                }
            }
        }

        self.simulator.quote(symbol).await
    }

    /// Fetches quotes for several symbols as independent concurrent
    /// operations.
    ///
    /// The result contains successes only; a symbol that fails or is not
    /// found is simply omitted. Ordering is not guaranteed to match the
    /// input.
    pub async fn get_multiple_stocks(&self, symbols: &[Symbol]) -> Vec<Quote> {
        let fetches = symbols.iter().map(|symbol| self.get_stock(symbol));
        join_all(fetches).await.into_iter().flatten().collect()
    }

    /// Fetches daily closing prices for the last `days` days.
    ///
    /// Returns an empty series on total failure.
    pub async fn get_historical_prices(
        &self,
        symbol: &Symbol,
        days: u32,
    ) -> Vec<HistoricalPoint> {
        if days == 0 {
            return Vec::new();
        }

        if self.mode == DataMode::Simulated {
            return self.simulator.history(symbol, days).await;
        }

        let to = Utc::now().date_naive();
        let from = to - chrono::Duration::days(i64::from(days) - 1);

        for provider in &self.history_providers {
            debug!(provider = provider.name(), symbol = %symbol, days, "Fetching history");
            match provider.fetch_history(symbol, from, to).await {
                Ok(points) if !points.is_empty() => return points,
                Ok(_) => {
                    warn!(
                        provider = provider.name(),
                        symbol = %symbol,
                        "Empty history from provider, trying next"
                    );
                }
                Err(e) if e.is_not_found() => {
                    debug!(provider = provider.name(), symbol = %symbol, "Symbol not found upstream");
                    return Vec::new();
                }
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "History provider failed, trying next"
                    );
                }
            }
        }

        self.simulator.history(symbol, days).await
    }

    /// Searches for tickers matching a free-text query.
    ///
    /// Live results are already filtered to equities by the clients. An
    /// empty live result set is a valid answer and does not trigger
    /// fallback; provider failure does.
    pub async fn search_stocks(&self, query: &str) -> Vec<SearchResult> {
        if self.mode == DataMode::Simulated {
            return self.simulator.search(query).await;
        }

        for provider in &self.search_providers {
            debug!(provider = provider.name(), query, "Searching tickers");
            match provider.fetch_search(query).await {
                Ok(results) => return results,
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Search provider failed, trying next"
                    );
                }
            }
        }

        self.simulator.search(query).await
    }

    /// Fetches the four-index market overview.
    ///
    /// The simulation path is the unconditional terminal fallback, so this
    /// operation always yields a reading.
    pub async fn get_market_overview(&self) -> MarketOverview {
        if self.mode == DataMode::Simulated {
            return self.simulator.market_overview().await;
        }

        for provider in &self.summary_providers {
            debug!(provider = provider.name(), "Fetching market summary");
            match provider.fetch_market_summary().await {
                Ok(overview) => return overview,
                Err(e) => {
                    warn!(
                        provider = provider.name(),
                        error = %e,
                        "Summary provider failed, trying next"
                    );
                }
            }
        }

        self.simulator.market_overview().await
    }
}
