//! Request pacing and bounded retry for quote providers.
//!
//! [`ThrottledProvider`] wraps any [`QuoteProvider`] and enforces a fixed
//! pause before every outbound call plus a bounded retry budget per
//! request. Retries stop early when the underlying error is classified
//! [`RetryClass::Never`].

use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use tokio::time::sleep;
use tracing::warn;

use crate::errors::{ProviderError, RetryClass};
use crate::models::{HistoricalPoint, QuoteSnapshot, SeriesFrequency};
use crate::provider::QuoteProvider;

/// Attempt budget for a current-quote fetch.
pub const QUOTE_ATTEMPTS: u32 = 3;

/// Attempt budget for a historical-series fetch.
pub const HISTORY_ATTEMPTS: u32 = 2;

/// Default pause before every provider call.
pub const DEFAULT_CALL_DELAY: Duration = Duration::from_secs(1);

/// Pacing and retry decorator around a quote provider.
///
/// The delay runs before every attempt, including the first, so repeated
/// instrument updates space their requests evenly regardless of outcome.
pub struct ThrottledProvider<P> {
    inner: P,
    delay: Duration,
}

impl<P: QuoteProvider> ThrottledProvider<P> {
    /// Wrap a provider with the default inter-call delay.
    pub fn new(inner: P) -> Self {
        Self::with_delay(inner, DEFAULT_CALL_DELAY)
    }

    /// Wrap a provider with a custom inter-call delay.
    pub fn with_delay(inner: P, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl<P: QuoteProvider> QuoteProvider for ThrottledProvider<P> {
    fn id(&self) -> &'static str {
        self.inner.id()
    }

    async fn fetch_current_quote(&self, symbol: &str) -> Result<QuoteSnapshot, ProviderError> {
        let mut last_error = ProviderError::ProviderFailure {
            provider: self.inner.id().to_string(),
            message: "no attempts made".to_string(),
        };

        for attempt in 1..=QUOTE_ATTEMPTS {
            sleep(self.delay).await;

            match self.inner.fetch_current_quote(symbol).await {
                Ok(snapshot) => return Ok(snapshot),
                Err(e) if e.retry_class() == RetryClass::Never => {
                    warn!("Giving up on quote for {}: {}", symbol, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "Quote attempt {}/{} for {} failed: {}",
                        attempt, QUOTE_ATTEMPTS, symbol, e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }

    async fn fetch_historical_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        frequency: SeriesFrequency,
    ) -> Result<Vec<HistoricalPoint>, ProviderError> {
        let mut last_error = ProviderError::ProviderFailure {
            provider: self.inner.id().to_string(),
            message: "no attempts made".to_string(),
        };

        for attempt in 1..=HISTORY_ATTEMPTS {
            sleep(self.delay).await;

            match self
                .inner
                .fetch_historical_series(symbol, start, end, frequency)
                .await
            {
                Ok(points) => return Ok(points),
                Err(e) if e.retry_class() == RetryClass::Never => {
                    warn!("Giving up on {} history for {}: {}", frequency.interval(), symbol, e);
                    return Err(e);
                }
                Err(e) => {
                    warn!(
                        "History attempt {}/{} for {} failed: {}",
                        attempt, HISTORY_ATTEMPTS, symbol, e
                    );
                    last_error = e;
                }
            }
        }

        Err(last_error)
    }
}
