//! Database models for tracked instruments.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use bandwatch_core::instruments::{Instrument, InstrumentUpdate, WatchEntry};

/// Database model for a tracked instrument row.
///
/// Prices are stored as TEXT decimals and dates as TEXT `%Y-%m-%d`.
#[derive(
    Queryable,
    Identifiable,
    Selectable,
    Insertable,
    AsChangeset,
    Debug,
    Clone,
    Serialize,
    Deserialize,
    PartialEq,
)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct InstrumentDB {
    pub id: i64,
    pub name: String,
    pub symbol: String,
    pub buy_price: String,
    pub sell_price: String,
    pub current_price: String,
    pub current_price_date: Option<String>,
    pub previous_close: String,
    pub low_52_week: String,
    pub high_52_week: String,
    pub full_history_downloaded: bool,
}

/// Insert payload for a new instrument; the id comes from SQLite.
#[derive(Insertable, Debug, Clone)]
#[diesel(table_name = crate::schema::instruments)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct NewInstrumentDB {
    pub name: String,
    pub symbol: String,
    pub buy_price: String,
    pub sell_price: String,
    pub current_price: String,
    pub current_price_date: Option<String>,
    pub previous_close: String,
    pub low_52_week: String,
    pub high_52_week: String,
    pub full_history_downloaded: bool,
}

/// Update payload for partial updates to an instrument row.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = crate::schema::instruments)]
pub struct InstrumentUpdateDB {
    pub current_price: Option<String>,
    pub current_price_date: Option<String>,
    pub previous_close: Option<String>,
    pub low_52_week: Option<String>,
    pub high_52_week: Option<String>,
    pub name: Option<String>,
    pub buy_price: Option<String>,
    pub sell_price: Option<String>,
}

// Conversion implementations

impl From<InstrumentDB> for Instrument {
    fn from(db: InstrumentDB) -> Self {
        let parse_price = |s: &str| Decimal::from_str(s).unwrap_or_default();

        Instrument {
            id: db.id,
            name: db.name,
            symbol: db.symbol,
            buy_price: parse_price(&db.buy_price),
            sell_price: parse_price(&db.sell_price),
            current_price: parse_price(&db.current_price),
            current_price_date: db
                .current_price_date
                .as_deref()
                .and_then(|s| NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()),
            previous_close: parse_price(&db.previous_close),
            low_52_week: parse_price(&db.low_52_week),
            high_52_week: parse_price(&db.high_52_week),
            full_history_downloaded: db.full_history_downloaded,
        }
    }
}

impl From<&Instrument> for InstrumentDB {
    fn from(instrument: &Instrument) -> Self {
        InstrumentDB {
            id: instrument.id,
            name: instrument.name.clone(),
            symbol: instrument.symbol.clone(),
            buy_price: instrument.buy_price.to_string(),
            sell_price: instrument.sell_price.to_string(),
            current_price: instrument.current_price.to_string(),
            current_price_date: instrument
                .current_price_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            previous_close: instrument.previous_close.to_string(),
            low_52_week: instrument.low_52_week.to_string(),
            high_52_week: instrument.high_52_week.to_string(),
            full_history_downloaded: instrument.full_history_downloaded,
        }
    }
}

impl From<&WatchEntry> for NewInstrumentDB {
    fn from(entry: &WatchEntry) -> Self {
        NewInstrumentDB {
            name: entry.name.clone(),
            symbol: entry.symbol.clone(),
            buy_price: entry.buy_price.to_string(),
            sell_price: entry.sell_price.to_string(),
            current_price: Decimal::ZERO.to_string(),
            current_price_date: None,
            previous_close: Decimal::ZERO.to_string(),
            low_52_week: Decimal::ZERO.to_string(),
            high_52_week: Decimal::ZERO.to_string(),
            full_history_downloaded: false,
        }
    }
}

impl From<&InstrumentUpdate> for InstrumentUpdateDB {
    fn from(update: &InstrumentUpdate) -> Self {
        InstrumentUpdateDB {
            current_price: update.current_price.map(|d| d.to_string()),
            current_price_date: update
                .current_price_date
                .map(|d| d.format("%Y-%m-%d").to_string()),
            previous_close: update.previous_close.map(|d| d.to_string()),
            low_52_week: update.low_52_week.map(|d| d.to_string()),
            high_52_week: update.high_52_week.map(|d| d.to_string()),
            name: update.name.clone(),
            buy_price: update.buy_price.map(|d| d.to_string()),
            sell_price: update.sell_price.map(|d| d.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_unparseable_stored_values_fall_back() {
        let db = InstrumentDB {
            id: 1,
            name: "Acme".to_string(),
            symbol: "ACME".to_string(),
            buy_price: "not-a-number".to_string(),
            sell_price: "12".to_string(),
            current_price: "11.5".to_string(),
            current_price_date: Some("garbage".to_string()),
            previous_close: "11".to_string(),
            low_52_week: "8".to_string(),
            high_52_week: "14".to_string(),
            full_history_downloaded: true,
        };

        let instrument = Instrument::from(db);
        assert_eq!(instrument.buy_price, Decimal::ZERO);
        assert_eq!(instrument.sell_price, dec!(12));
        assert_eq!(instrument.current_price_date, None);
    }

    #[test]
    fn test_new_row_starts_blank() {
        let entry = WatchEntry::new("Acme Corp", "acme", dec!(10), dec!(12));
        let row = NewInstrumentDB::from(&entry);
        assert_eq!(row.symbol, "ACME");
        assert_eq!(row.current_price, "0");
        assert_eq!(row.current_price_date, None);
        assert!(!row.full_history_downloaded);
    }

    #[test]
    fn test_update_payload_keeps_unset_fields_out() {
        let update = InstrumentUpdate {
            current_price: Some(dec!(11.5)),
            current_price_date: Some(NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()),
            ..Default::default()
        };
        let changes = InstrumentUpdateDB::from(&update);
        assert_eq!(changes.current_price.as_deref(), Some("11.5"));
        assert_eq!(changes.current_price_date.as_deref(), Some("2023-06-15"));
        assert_eq!(changes.name, None);
        assert_eq!(changes.buy_price, None);
    }
}
