//! Watchlist CSV parsing.
//!
//! The watchlist is the authoritative statement of what should be
//! tracked. Expected columns: `name`, `symbol`, `buy_price`,
//! `sell_price`, and an optional `ignore` flag whose `Y` rows are
//! excluded from tracking.

use std::io;

use csv::ReaderBuilder;
use log::{debug, warn};
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::errors::Result;
use crate::instruments::WatchEntry;

/// One raw CSV row before normalization.
#[derive(Debug, Deserialize)]
struct WatchlistRow {
    name: String,
    symbol: String,
    buy_price: Option<Decimal>,
    sell_price: Option<Decimal>,
    #[serde(default)]
    ignore: Option<String>,
}

/// Reads watchlist entries from CSV.
///
/// Rows flagged with `ignore = Y` are dropped, as are rows missing a buy
/// or sell price (logged). Structurally bad rows fail the whole parse
/// rather than silently shrinking the watchlist.
pub fn parse_watchlist<R: io::Read>(reader: R) -> Result<Vec<WatchEntry>> {
    let mut csv_reader = ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(reader);

    let mut entries = Vec::new();
    for (index, record) in csv_reader.deserialize().enumerate() {
        let row_number = index + 1;
        let row: WatchlistRow = record?;

        if row
            .ignore
            .as_deref()
            .is_some_and(|flag| flag.eq_ignore_ascii_case("y"))
        {
            debug!("Watchlist row {} ({}) is flagged ignore", row_number, row.symbol);
            continue;
        }

        let (Some(buy_price), Some(sell_price)) = (row.buy_price, row.sell_price) else {
            warn!(
                "Watchlist row {} ({}) is missing a buy or sell price, skipping",
                row_number, row.symbol
            );
            continue;
        };

        entries.push(WatchEntry::new(row.name, &row.symbol, buy_price, sell_price));
    }

    Ok(entries)
}
