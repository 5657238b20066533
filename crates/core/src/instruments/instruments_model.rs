//! Tracked instrument domain models.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{errors::ValidationError, Error, Result};
use bandwatch_market_data::QuoteSnapshot;

/// Trade posture of an instrument relative to its band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstrumentStatus {
    /// Current price is below the buy price
    Buy,
    /// Current price is above the sell price
    Sell,
    /// Current price sits inside the band
    #[default]
    Hold,
}

/// Domain model representing one tracked instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Instrument {
    pub id: i64,
    pub name: String,
    /// Ticker symbol, stored uppercase and unique across instruments
    pub symbol: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
    pub current_price: Decimal,
    /// Date the current price was last refreshed; None until the first refresh
    pub current_price_date: Option<NaiveDate>,
    pub previous_close: Decimal,
    pub low_52_week: Decimal,
    pub high_52_week: Decimal,
    /// Whether the initial daily and weekly history backfill has completed
    pub full_history_downloaded: bool,
}

impl Instrument {
    /// Trade posture derived from the current price and the band.
    pub fn status(&self) -> InstrumentStatus {
        if self.current_price < self.buy_price {
            InstrumentStatus::Buy
        } else if self.current_price > self.sell_price {
            InstrumentStatus::Sell
        } else {
            InstrumentStatus::Hold
        }
    }

    /// Whether the band supports zone classification: a positive buy price
    /// with the sell price above it.
    pub fn has_valid_band(&self) -> bool {
        self.buy_price > Decimal::ZERO && self.sell_price > self.buy_price
    }

    /// Diffs the tracked quote fields against a fresh snapshot.
    ///
    /// Only changed fields are set on the returned update. A changed
    /// current price also stamps the refresh cursor with `today`; changes
    /// to the other fields leave the cursor alone.
    pub fn quote_changes(&self, snapshot: &QuoteSnapshot, today: NaiveDate) -> InstrumentUpdate {
        let mut update = InstrumentUpdate::default();
        if snapshot.current_price != self.current_price {
            update.current_price = Some(snapshot.current_price);
            update.current_price_date = Some(today);
        }
        if snapshot.previous_close != self.previous_close {
            update.previous_close = Some(snapshot.previous_close);
        }
        if snapshot.low_52_week != self.low_52_week {
            update.low_52_week = Some(snapshot.low_52_week);
        }
        if snapshot.high_52_week != self.high_52_week {
            update.high_52_week = Some(snapshot.high_52_week);
        }
        update
    }

    /// Diffs the watch settings (name and band) against a watchlist entry.
    pub fn watch_changes(&self, entry: &WatchEntry) -> InstrumentUpdate {
        let mut update = InstrumentUpdate::default();
        if entry.name != self.name {
            update.name = Some(entry.name.clone());
        }
        if entry.buy_price != self.buy_price {
            update.buy_price = Some(entry.buy_price);
        }
        if entry.sell_price != self.sell_price {
            update.sell_price = Some(entry.sell_price);
        }
        update
    }

    /// Applies an update's set fields in place, mirroring what the store does.
    pub fn apply(&mut self, update: &InstrumentUpdate) {
        if let Some(price) = update.current_price {
            self.current_price = price;
        }
        if let Some(date) = update.current_price_date {
            self.current_price_date = Some(date);
        }
        if let Some(close) = update.previous_close {
            self.previous_close = close;
        }
        if let Some(low) = update.low_52_week {
            self.low_52_week = low;
        }
        if let Some(high) = update.high_52_week {
            self.high_52_week = high;
        }
        if let Some(ref name) = update.name {
            self.name = name.clone();
        }
        if let Some(buy) = update.buy_price {
            self.buy_price = buy;
        }
        if let Some(sell) = update.sell_price {
            self.sell_price = sell;
        }
    }
}

/// Field-level update for an instrument; unset fields are left untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct InstrumentUpdate {
    pub current_price: Option<Decimal>,
    pub current_price_date: Option<NaiveDate>,
    pub previous_close: Option<Decimal>,
    pub low_52_week: Option<Decimal>,
    pub high_52_week: Option<Decimal>,
    pub name: Option<String>,
    pub buy_price: Option<Decimal>,
    pub sell_price: Option<Decimal>,
}

impl InstrumentUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// One row of the authoritative watchlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WatchEntry {
    pub name: String,
    pub symbol: String,
    pub buy_price: Decimal,
    pub sell_price: Decimal,
}

impl WatchEntry {
    /// Creates an entry, normalizing the symbol to uppercase.
    pub fn new(
        name: impl Into<String>,
        symbol: &str,
        buy_price: Decimal,
        sell_price: Decimal,
    ) -> Self {
        Self {
            name: name.into(),
            symbol: symbol.trim().to_uppercase(),
            buy_price,
            sell_price,
        }
    }

    /// Validates the watchlist entry.
    pub fn validate(&self) -> Result<()> {
        if self.symbol.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(
                "Symbol cannot be empty".to_string(),
            )));
        }
        if self.name.trim().is_empty() {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Name cannot be empty for {}",
                self.symbol
            ))));
        }
        if self.buy_price <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Buy price must be positive for {}",
                self.symbol
            ))));
        }
        if self.sell_price <= Decimal::ZERO {
            return Err(Error::Validation(ValidationError::InvalidInput(format!(
                "Sell price must be positive for {}",
                self.symbol
            ))));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn snapshot(current: Decimal) -> QuoteSnapshot {
        QuoteSnapshot {
            current_price: current,
            previous_close: dec!(99),
            low_52_week: dec!(80),
            high_52_week: dec!(120),
        }
    }

    fn instrument() -> Instrument {
        Instrument {
            id: 7,
            name: "Acme".to_string(),
            symbol: "ACME".to_string(),
            buy_price: dec!(90),
            sell_price: dec!(110),
            current_price: dec!(100),
            current_price_date: None,
            previous_close: dec!(99),
            low_52_week: dec!(80),
            high_52_week: dec!(120),
            full_history_downloaded: true,
        }
    }

    #[test]
    fn test_quote_changes_empty_when_snapshot_matches() {
        let inst = instrument();
        let today = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        assert!(inst.quote_changes(&snapshot(dec!(100)), today).is_empty());
    }

    #[test]
    fn test_price_change_stamps_the_cursor() {
        let inst = instrument();
        let today = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let update = inst.quote_changes(&snapshot(dec!(101)), today);
        assert_eq!(update.current_price, Some(dec!(101)));
        assert_eq!(update.current_price_date, Some(today));
        assert_eq!(update.previous_close, None);
    }

    #[test]
    fn test_secondary_change_leaves_cursor_alone() {
        let inst = instrument();
        let today = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let mut fresh = snapshot(dec!(100));
        fresh.high_52_week = dec!(125);
        let update = inst.quote_changes(&fresh, today);
        assert_eq!(update.high_52_week, Some(dec!(125)));
        assert_eq!(update.current_price, None);
        assert_eq!(update.current_price_date, None);
    }

    #[test]
    fn test_apply_mirrors_store_update() {
        let mut inst = instrument();
        let today = NaiveDate::from_ymd_opt(2023, 6, 15).unwrap();
        let update = inst.quote_changes(&snapshot(dec!(101)), today);
        inst.apply(&update);
        assert_eq!(inst.current_price, dec!(101));
        assert_eq!(inst.current_price_date, Some(today));
    }

    #[test]
    fn test_watch_entry_normalizes_symbol() {
        let entry = WatchEntry::new("Acme", " acme ", dec!(90), dec!(110));
        assert_eq!(entry.symbol, "ACME");
    }

    #[test]
    fn test_watch_entry_rejects_non_positive_band() {
        let entry = WatchEntry::new("Acme", "ACME", dec!(0), dec!(110));
        assert!(entry.validate().is_err());
        let entry = WatchEntry::new("Acme", "ACME", dec!(90), dec!(0));
        assert!(entry.validate().is_err());
        let entry = WatchEntry::new("Acme", "ACME", dec!(90), dec!(110));
        assert!(entry.validate().is_ok());
    }

    #[test]
    fn test_status_follows_band_position() {
        let mut inst = instrument();
        inst.current_price = dec!(85);
        assert_eq!(inst.status(), InstrumentStatus::Buy);
        inst.current_price = dec!(115);
        assert_eq!(inst.status(), InstrumentStatus::Sell);
        inst.current_price = dec!(100);
        assert_eq!(inst.status(), InstrumentStatus::Hold);
    }
}
