//! Error types and retry classification for the market data crate.
//!
//! This module provides:
//! - [`ProviderError`]: The main error enum for all quote provider operations
//! - [`RetryClass`]: Classification for determining retry behavior

mod retry;

pub use retry::RetryClass;

use thiserror::Error;

/// Errors that can occur while fetching quotes or historical series.
///
/// Each variant is classified into a [`RetryClass`] via the [`retry_class`](Self::retry_class)
/// method, which determines whether the retry layer should attempt the request again.
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The requested symbol was not recognized by the provider.
    /// This is a terminal error - retrying won't help.
    #[error("Symbol not found: {0}")]
    SymbolNotFound(String),

    /// The provider answered but returned no usable data points.
    /// The symbol exists but has nothing in the requested period.
    #[error("No data returned")]
    NoData,

    /// The provider rate limited the request (HTTP 429).
    /// Worth retrying after the inter-call delay.
    #[error("Rate limited: {provider}")]
    RateLimited {
        /// The provider that rate limited the request
        provider: String,
    },

    /// The request to the provider timed out.
    /// Worth retrying after the inter-call delay.
    #[error("Timeout: {provider}")]
    Timeout {
        /// The provider that timed out
        provider: String,
    },

    /// A provider-specific failure, including expired auth tokens.
    /// Worth retrying; a fresh attempt re-establishes session state.
    #[error("Provider error: {provider} - {message}")]
    ProviderFailure {
        /// The provider that returned the error
        provider: String,
        /// The error message from the provider
        message: String,
    },

    /// The provider responded with data that could not be interpreted
    /// as a quote (missing price fields, non-numeric payload).
    #[error("Invalid quote data: {message}")]
    InvalidQuote {
        /// Description of what was wrong with the payload
        message: String,
    },

    /// A network error occurred while communicating with the provider.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl ProviderError {
    /// Returns the retry classification for this error.
    ///
    /// - [`RetryClass::Never`]: terminal, the retry layer gives up immediately
    /// - [`RetryClass::Retry`]: transient, the retry layer may try again
    ///
    /// # Examples
    ///
    /// ```
    /// use bandwatch_market_data::errors::{ProviderError, RetryClass};
    ///
    /// let error = ProviderError::RateLimited { provider: "YAHOO".to_string() };
    /// assert_eq!(error.retry_class(), RetryClass::Retry);
    ///
    /// let error = ProviderError::SymbolNotFound("INVALID".to_string());
    /// assert_eq!(error.retry_class(), RetryClass::Never);
    /// ```
    pub fn retry_class(&self) -> RetryClass {
        match self {
            // Terminal errors - never retry
            Self::SymbolNotFound(_) | Self::NoData | Self::InvalidQuote { .. } => RetryClass::Never,

            // Transient errors - retry within the attempt budget
            Self::RateLimited { .. }
            | Self::Timeout { .. }
            | Self::ProviderFailure { .. }
            | Self::Network(_) => RetryClass::Retry,
        }
    }
}
