//! Per-instrument price panels for display.
//!
//! A panel is the serializable view an external page renders for one
//! instrument: the band, the trade posture, and a period-bounded slice
//! of its persisted history with the period's start, low, and high.

use chrono::{Duration, NaiveDate};
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::history::{HistoryStore, PricePoint, SeriesKind};
use crate::instruments::{Instrument, InstrumentStatus};

/// Selectable display periods.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TimePeriod {
    Day,
    Days30,
    Months3,
    Year1,
    Years3,
    Years5,
}

impl TimePeriod {
    /// Number of days of history the period covers.
    pub fn days(&self) -> i64 {
        match self {
            TimePeriod::Day => 1,
            TimePeriod::Days30 => 30,
            TimePeriod::Months3 => 93,
            TimePeriod::Year1 => 365,
            TimePeriod::Years3 => 1095,
            TimePeriod::Years5 => 1825,
        }
    }

    /// Which stored series backs the period: daily up to three months,
    /// weekly beyond that.
    pub fn series(&self) -> SeriesKind {
        match self {
            TimePeriod::Day | TimePeriod::Days30 | TimePeriod::Months3 => SeriesKind::Daily,
            TimePeriod::Year1 | TimePeriod::Years3 | TimePeriod::Years5 => SeriesKind::Weekly,
        }
    }

    /// Parses a period label such as `30days` or `1year`.
    ///
    /// Unknown labels fall back to thirty days with a warning.
    pub fn parse(label: &str) -> TimePeriod {
        match label {
            "1day" => TimePeriod::Day,
            "30days" => TimePeriod::Days30,
            "3months" => TimePeriod::Months3,
            "1year" => TimePeriod::Year1,
            "3years" => TimePeriod::Years3,
            "5years" => TimePeriod::Years5,
            other => {
                warn!("Unknown display period {:?}, defaulting to 30 days", other);
                TimePeriod::Days30
            }
        }
    }
}

/// One dated price inside a panel.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PanelPoint {
    pub date: NaiveDate,
    pub price: Decimal,
}

/// The serializable per-instrument view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePanel {
    pub name: String,
    pub symbol: String,
    pub current_price: Decimal,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    /// First price inside the period, zero when no history is available
    pub period_start_price: Decimal,
    pub period_low_price: Decimal,
    pub period_high_price: Decimal,
    pub status: InstrumentStatus,
    pub period_prices: Vec<PanelPoint>,
}

/// Builds one panel per instrument over the period ending `today`.
pub fn build_panels<H: HistoryStore + ?Sized>(
    history: &H,
    instruments: &[Instrument],
    period: TimePeriod,
    today: NaiveDate,
) -> Result<Vec<PricePanel>> {
    let since = today - Duration::days(period.days());
    let series = period.series();

    let mut panels = Vec::with_capacity(instruments.len());
    for instrument in instruments {
        let points = history.points(instrument.id, series, since)?;
        panels.push(build_panel(instrument, &points));
    }
    Ok(panels)
}

fn build_panel(instrument: &Instrument, points: &[PricePoint]) -> PricePanel {
    let period_start_price = points.first().map(|p| p.price).unwrap_or_default();
    let period_low_price = points.iter().map(|p| p.price).min().unwrap_or_default();
    let period_high_price = points.iter().map(|p| p.price).max().unwrap_or_default();

    PricePanel {
        name: instrument.name.clone(),
        symbol: instrument.symbol.clone(),
        current_price: instrument.current_price,
        buy_price: instrument.buy_price,
        sell_price: instrument.sell_price,
        period_start_price,
        period_low_price,
        period_high_price,
        status: instrument.status(),
        period_prices: points
            .iter()
            .map(|p| PanelPoint {
                date: p.date,
                price: p.price,
            })
            .collect(),
    }
}
