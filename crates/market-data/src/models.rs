use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Sampling frequency of a historical price series.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum SeriesFrequency {
    /// One point per trading day.
    Daily,
    /// One point per calendar week.
    Weekly,
}

impl SeriesFrequency {
    /// Provider interval code for this frequency ("1d" or "1wk").
    pub fn interval(&self) -> &'static str {
        match self {
            SeriesFrequency::Daily => "1d",
            SeriesFrequency::Weekly => "1wk",
        }
    }
}

/// Snapshot of the quote fields tracked for an instrument.
///
/// Fields the provider cannot supply come back as zero; downstream
/// percentage math guards against zero denominators.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct QuoteSnapshot {
    /// Most recent traded price (required)
    pub current_price: Decimal,

    /// Previous session's closing price
    pub previous_close: Decimal,

    /// Lowest price over the trailing 52 weeks
    pub low_52_week: Decimal,

    /// Highest price over the trailing 52 weeks
    pub high_52_week: Decimal,
}

/// One dated closing price from a historical series.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HistoricalPoint {
    /// Trading date of the bar
    pub date: NaiveDate,

    /// Closing price for that date
    pub price: Decimal,
}

impl HistoricalPoint {
    pub fn new(date: NaiveDate, price: Decimal) -> Self {
        Self { date, price }
    }
}
