//! Database model for price history points.

use chrono::NaiveDate;
use diesel::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use bandwatch_core::history::{PricePoint, SeriesKind};

/// Database model for one price observation.
///
/// Both logical series share this table; `series` holds the discriminator
/// (`"daily"` or `"weekly"`). The composite primary key keeps each series
/// to one point per instrument per date.
#[derive(
    Queryable, Identifiable, Selectable, Insertable, Debug, Clone, Serialize, Deserialize, PartialEq,
)]
#[diesel(table_name = crate::schema::price_history)]
#[diesel(primary_key(instrument_id, series, price_date))]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
#[serde(rename_all = "camelCase")]
pub struct PriceHistoryDB {
    pub instrument_id: i64,
    pub series: String,
    pub price_date: String,
    pub price: String,
}

impl PriceHistoryDB {
    pub fn new(instrument_id: i64, series: SeriesKind, date: NaiveDate, price: Decimal) -> Self {
        PriceHistoryDB {
            instrument_id,
            series: series.as_str().to_string(),
            price_date: date.format("%Y-%m-%d").to_string(),
            price: price.to_string(),
        }
    }
}

impl From<PriceHistoryDB> for PricePoint {
    fn from(db: PriceHistoryDB) -> Self {
        PricePoint {
            instrument_id: db.instrument_id,
            date: NaiveDate::parse_from_str(&db.price_date, "%Y-%m-%d").unwrap_or_default(),
            price: Decimal::from_str(&db.price).unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_row_carries_series_discriminator() {
        let date = NaiveDate::from_ymd_opt(2023, 6, 16).unwrap();
        let daily = PriceHistoryDB::new(7, SeriesKind::Daily, date, dec!(11.5));
        assert_eq!(daily.series, "daily");
        assert_eq!(daily.price_date, "2023-06-16");

        let weekly = PriceHistoryDB::new(7, SeriesKind::Weekly, date, dec!(11.5));
        assert_eq!(weekly.series, "weekly");
    }

    #[test]
    fn test_point_conversion_parses_stored_text() {
        let db = PriceHistoryDB {
            instrument_id: 7,
            series: "daily".to_string(),
            price_date: "2023-06-16".to_string(),
            price: "11.5".to_string(),
        };
        let point = PricePoint::from(db);
        assert_eq!(point.instrument_id, 7);
        assert_eq!(point.date, NaiveDate::from_ymd_opt(2023, 6, 16).unwrap());
        assert_eq!(point.price, dec!(11.5));
    }
}
