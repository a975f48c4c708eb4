//! Error types for market data operations.
//!
//! This module defines [`MarketError`] which covers all failure cases that can
//! occur when fetching or normalizing market data. The orchestrator matches
//! on these variants to decide whether to fall back to another source.

use thiserror::Error;

/// Errors that can occur during market data operations.
#[derive(Error, Debug)]
pub enum MarketError {
    /// Network-related errors (connection failures, timeouts, non-2xx status).
    #[error("Network error: {0}")]
    Network(String),

    /// Rate limit exceeded by a provider.
    #[error("Rate limited by {provider}: retry after {retry_after:?}")]
    RateLimited {
        /// The provider that rate limited the request.
        provider: String,
        /// Suggested time to wait before retrying.
        retry_after: Option<std::time::Duration>,
    },

    /// The provider answered validly but has no data for the symbol.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// A response was received but its shape did not match expectations.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The provider is missing a required credential.
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    /// An invalid parameter was provided by the caller.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other error.
    #[error("{0}")]
    Other(String),
}

impl MarketError {
    /// Returns true if the provider explicitly reported the symbol as
    /// nonexistent, as opposed to failing to answer.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::SymbolNotFound(_))
    }
}

/// Result type alias using [`MarketError`].
pub type Result<T> = std::result::Result<T, MarketError>;
