//! Quote provider trait definition.
//!
//! This module defines the core `QuoteProvider` trait that all
//! quote sources must implement.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::ProviderError;
use crate::models::{HistoricalPoint, QuoteSnapshot, SeriesFrequency};

/// Trait for quote providers.
///
/// Implement this trait to add support for a new quote source. Callers hold
/// a `dyn QuoteProvider` and stay unaware of the transport behind it, which
/// also lets decorators (throttling, retry) wrap any implementation.
#[async_trait]
pub trait QuoteProvider: Send + Sync {
    /// Unique identifier for this provider.
    ///
    /// Should be a constant string like "YAHOO".
    /// Used for logging and error attribution.
    fn id(&self) -> &'static str;

    /// Fetch the current quote snapshot for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The tracked symbol in its canonical (uppercased) form
    ///
    /// # Returns
    ///
    /// The current snapshot on success, or a `ProviderError` on failure.
    /// Fields the provider cannot supply are zero in the snapshot.
    async fn fetch_current_quote(&self, symbol: &str) -> Result<QuoteSnapshot, ProviderError>;

    /// Fetch a historical closing-price series for a symbol.
    ///
    /// # Arguments
    ///
    /// * `symbol` - The tracked symbol in its canonical (uppercased) form
    /// * `start` - Start of the date range (inclusive)
    /// * `end` - End of the date range (inclusive)
    /// * `frequency` - Daily or weekly sampling
    ///
    /// # Returns
    ///
    /// Points ordered by date ascending. Unusable bars (missing or
    /// non-positive closes) are dropped rather than surfaced as errors;
    /// a response with no usable bars at all is `ProviderError::NoData`.
    async fn fetch_historical_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        frequency: SeriesFrequency,
    ) -> Result<Vec<HistoricalPoint>, ProviderError>;
}
