//! Yahoo Finance quote provider.
//!
//! Current snapshots come from the quoteSummary API, which carries the
//! previous-close and 52-week fields the chart endpoints omit. Historical
//! series come from the chart API through the yahoo_finance_api crate.

mod models;

use std::sync::RwLock;

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime, TimeZone, Utc};
use lazy_static::lazy_static;
use reqwest::header;
use rust_decimal::Decimal;
use time::OffsetDateTime;
use tracing::{debug, warn};
use urlencoding::encode;
use yahoo_finance_api as yahoo;

use crate::errors::ProviderError;
use crate::models::{HistoricalPoint, QuoteSnapshot, SeriesFrequency};
use crate::provider::QuoteProvider;

use models::{YahooPriceDetail, YahooQuoteSummaryResponse, YahooQuoteSummaryResult};

const PROVIDER_ID: &str = "YAHOO";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

// ============================================================================
// Crumb/Cookie Authentication
// ============================================================================

/// Cached Yahoo authentication data
#[derive(Debug, Clone)]
struct CrumbData {
    cookie: String,
    crumb: String,
}

lazy_static! {
    /// Global cache for Yahoo authentication crumb
    static ref YAHOO_CRUMB: RwLock<Option<CrumbData>> = RwLock::default();
}

// ============================================================================
// Yahoo Provider
// ============================================================================

/// Yahoo Finance quote provider.
///
/// Supplies current snapshots and daily/weekly closing-price history for
/// tracked symbols. Symbols in Toronto exchange notation ("TSX:SYM",
/// "SYM.TRT") are rewritten to Yahoo's ".TO" suffix before any request.
pub struct YahooProvider {
    connector: yahoo::YahooConnector,
}

impl YahooProvider {
    /// Create a new Yahoo Finance provider.
    pub async fn new() -> Result<Self, ProviderError> {
        let connector = yahoo::YahooConnector::new().map_err(|e| ProviderError::ProviderFailure {
            provider: PROVIDER_ID.to_string(),
            message: format!("Failed to initialize Yahoo connector: {}", e),
        })?;
        Ok(Self { connector })
    }

    // ========================================================================
    // Crumb/Cookie Authentication
    // ========================================================================

    /// Ensure we have a valid Yahoo authentication crumb.
    async fn ensure_crumb(&self) -> Result<CrumbData, ProviderError> {
        // Check if we have a cached crumb
        {
            let guard = YAHOO_CRUMB.read().unwrap();
            if let Some(crumb) = guard.as_ref() {
                return Ok(crumb.clone());
            }
        }

        // Fetch new crumb
        self.fetch_crumb().await
    }

    /// Fetch a new Yahoo authentication crumb.
    async fn fetch_crumb(&self) -> Result<CrumbData, ProviderError> {
        let client = reqwest::Client::new();

        // Step 1: Get cookie from fc.yahoo.com
        let response = client.get("https://fc.yahoo.com").send().await.map_err(|e| {
            ProviderError::ProviderFailure {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to get cookie: {}", e),
            }
        })?;

        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|h| h.to_str().ok())
            .and_then(|s| s.split_once(';').map(|(v, _)| v.to_string()))
            .ok_or_else(|| ProviderError::ProviderFailure {
                provider: PROVIDER_ID.to_string(),
                message: "Failed to parse Yahoo cookie".to_string(),
            })?;

        // Step 2: Get crumb using cookie
        let crumb = client
            .get("https://query1.finance.yahoo.com/v1/test/getcrumb")
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &cookie)
            .send()
            .await
            .map_err(|e| ProviderError::ProviderFailure {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to get crumb: {}", e),
            })?
            .text()
            .await
            .map_err(|e| ProviderError::ProviderFailure {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to read crumb: {}", e),
            })?;

        let crumb_data = CrumbData { cookie, crumb };

        // Cache it
        let mut guard = YAHOO_CRUMB.write().unwrap();
        *guard = Some(crumb_data.clone());

        Ok(crumb_data)
    }

    /// Clear the cached crumb (used when authentication fails)
    fn clear_crumb(&self) {
        let mut guard = YAHOO_CRUMB.write().unwrap();
        *guard = None;
    }
}

// ============================================================================
// QuoteProvider Implementation
// ============================================================================

#[async_trait]
impl QuoteProvider for YahooProvider {
    fn id(&self) -> &'static str {
        PROVIDER_ID
    }

    async fn fetch_current_quote(&self, symbol: &str) -> Result<QuoteSnapshot, ProviderError> {
        let ticker = yahoo_symbol(symbol);

        debug!("Fetching quote snapshot for {} from Yahoo", ticker);

        let crumb = self.ensure_crumb().await?;

        let url = format!(
            "https://query1.finance.yahoo.com/v10/finance/quoteSummary/{}?modules=price,summaryDetail&crumb={}",
            encode(&ticker),
            encode(&crumb.crumb)
        );

        let client = reqwest::Client::new();
        let response = client
            .get(&url)
            .header(header::USER_AGENT, USER_AGENT)
            .header(header::COOKIE, &crumb.cookie)
            .send()
            .await
            .map_err(|e| ProviderError::ProviderFailure {
                provider: PROVIDER_ID.to_string(),
                message: format!("Quote summary request failed: {}", e),
            })?;

        match response.status() {
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                // A fresh crumb is fetched on the next attempt
                self.clear_crumb();
                return Err(ProviderError::ProviderFailure {
                    provider: PROVIDER_ID.to_string(),
                    message: "Yahoo authentication expired".to_string(),
                });
            }
            reqwest::StatusCode::TOO_MANY_REQUESTS => {
                return Err(ProviderError::RateLimited {
                    provider: PROVIDER_ID.to_string(),
                });
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(ProviderError::SymbolNotFound(symbol.to_string()));
            }
            _ => {}
        }

        let data: YahooQuoteSummaryResponse = response.json().await.map_err(|e| {
            ProviderError::ProviderFailure {
                provider: PROVIDER_ID.to_string(),
                message: format!("Failed to parse quote summary response: {}", e),
            }
        })?;

        let result = data
            .quote_summary
            .result
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::SymbolNotFound(symbol.to_string()))?;

        snapshot_from_summary(symbol, &result)
    }

    async fn fetch_historical_series(
        &self,
        symbol: &str,
        start: NaiveDate,
        end: NaiveDate,
        frequency: SeriesFrequency,
    ) -> Result<Vec<HistoricalPoint>, ProviderError> {
        let ticker = yahoo_symbol(symbol);

        debug!(
            "Fetching {} history for {} from {} to {} from Yahoo",
            frequency.interval(),
            ticker,
            start,
            end
        );

        let start_time = date_to_offset(start, false);
        let end_time = date_to_offset(end, true);

        let response = self
            .connector
            .get_quote_history_interval(&ticker, start_time, end_time, frequency.interval())
            .await
            .map_err(|e| {
                if matches!(e, yahoo::YahooError::NoQuotes | yahoo::YahooError::NoResult) {
                    ProviderError::SymbolNotFound(symbol.to_string())
                } else {
                    ProviderError::ProviderFailure {
                        provider: PROVIDER_ID.to_string(),
                        message: e.to_string(),
                    }
                }
            })?;

        match response.quotes() {
            Ok(bars) => {
                let mut points: Vec<HistoricalPoint> = bars.iter().filter_map(bar_to_point).collect();

                if points.is_empty() {
                    warn!(
                        "No usable {} bars for '{}' between {} and {}",
                        frequency.interval(),
                        ticker,
                        start,
                        end
                    );
                    return Err(ProviderError::NoData);
                }

                points.sort_by_key(|p| p.date);
                Ok(points)
            }
            Err(yahoo::YahooError::NoQuotes) => {
                warn!(
                    "No historical quotes returned for '{}' between {} and {}",
                    ticker, start, end
                );
                Err(ProviderError::NoData)
            }
            Err(e) => Err(ProviderError::ProviderFailure {
                provider: PROVIDER_ID.to_string(),
                message: e.to_string(),
            }),
        }
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Rewrite a tracked symbol into Yahoo's notation.
///
/// Toronto listings arrive as "TSX:SYM" or "SYM.TRT" and become "SYM.TO".
/// Everything else passes through unchanged.
fn yahoo_symbol(symbol: &str) -> String {
    if let Some(base) = symbol.strip_prefix("TSX:") {
        return format!("{}.TO", base);
    }
    if let Some(base) = symbol.strip_suffix(".TRT") {
        return format!("{}.TO", base);
    }
    symbol.to_string()
}

/// Convert a NaiveDate to the time::OffsetDateTime the Yahoo API expects.
///
/// Start dates map to midnight UTC, end dates to the last second of the day
/// so the range stays inclusive.
fn date_to_offset(date: NaiveDate, end_of_day: bool) -> OffsetDateTime {
    let mut ts = date.and_time(NaiveTime::MIN).and_utc().timestamp();
    if end_of_day {
        ts += 86_399;
    }
    OffsetDateTime::from_unix_timestamp(ts).unwrap_or_else(|_| OffsetDateTime::now_utc())
}

/// Convert a Yahoo chart bar to a dated closing price.
///
/// Bars with missing (NaN) or non-positive closes are dropped; Yahoo pads
/// thinly traded symbols with them.
fn bar_to_point(bar: &yahoo::Quote) -> Option<HistoricalPoint> {
    if !bar.close.is_finite() || bar.close <= 0.0 {
        return None;
    }
    let date = Utc
        .timestamp_opt(bar.timestamp as i64, 0)
        .single()?
        .date_naive();
    let price = Decimal::from_f64_retain(bar.close)?;
    Some(HistoricalPoint::new(date, price))
}

/// Extract a decimal from an optional raw field, defaulting to zero.
fn decimal_or_zero(detail: Option<&YahooPriceDetail>) -> Decimal {
    detail
        .and_then(|d| d.raw)
        .filter(|v| v.is_finite())
        .and_then(Decimal::from_f64_retain)
        .unwrap_or_default()
}

/// Map a quoteSummary result onto the tracked quote fields.
///
/// The current price is required; previous close and the 52-week bounds
/// default to zero when Yahoo omits them.
fn snapshot_from_summary(
    symbol: &str,
    result: &YahooQuoteSummaryResult,
) -> Result<QuoteSnapshot, ProviderError> {
    let price = result.price.as_ref().ok_or_else(|| ProviderError::InvalidQuote {
        message: format!("no price data for {}", symbol),
    })?;

    let current_price = price
        .regular_market_price
        .as_ref()
        .and_then(|p| p.raw)
        .filter(|v| v.is_finite())
        .and_then(Decimal::from_f64_retain)
        .ok_or_else(|| ProviderError::InvalidQuote {
            message: format!("no regularMarketPrice for {}", symbol),
        })?;

    let detail = result.summary_detail.as_ref();

    Ok(QuoteSnapshot {
        current_price,
        previous_close: decimal_or_zero(price.regular_market_previous_close.as_ref()),
        low_52_week: decimal_or_zero(detail.and_then(|d| d.fifty_two_week_low.as_ref())),
        high_52_week: decimal_or_zero(detail.and_then(|d| d.fifty_two_week_high.as_ref())),
    })
}

// ============================================================================
// Tests
// ============================================================================
