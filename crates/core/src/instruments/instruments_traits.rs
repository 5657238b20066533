//! Storage trait for tracked instruments.
//!
//! # Design Notes
//!
//! Reads are synchronous (the backing store serves them from a local
//! database) while writes are async, mirroring how the update cycle
//! interleaves them. Implementations live in the storage crate; the
//! domain layer only sees this trait.

use async_trait::async_trait;
use chrono::NaiveDate;

use super::instruments_model::{Instrument, InstrumentUpdate, WatchEntry};
use crate::errors::Result;

/// Storage interface for the tracked instrument set.
#[async_trait]
pub trait InstrumentStore: Send + Sync {
    // ====== Reads ======

    /// Returns every tracked instrument.
    fn all(&self) -> Result<Vec<Instrument>>;

    // ====== Writes ======

    /// Inserts a new instrument seeded from a watchlist entry.
    ///
    /// Looks for an existing instrument with the same symbol first and
    /// returns `false` without writing when one exists. Price fields start
    /// at zero and the history flag starts false.
    ///
    /// # Returns
    /// `true` when a row was inserted.
    async fn insert(&self, entry: &WatchEntry) -> Result<bool>;

    /// Applies the set fields of `update` to one instrument.
    ///
    /// Unset fields are left untouched.
    async fn apply_update(&self, instrument_id: i64, update: &InstrumentUpdate) -> Result<()>;

    /// Deletes the instrument row.
    ///
    /// History rows are not touched; callers remove those first.
    async fn delete(&self, instrument_id: i64) -> Result<()>;

    /// Marks the initial history backfill as complete.
    async fn mark_history_downloaded(&self, instrument_id: i64) -> Result<()>;

    /// Rewinds refresh cursors stamped `today` back by one day.
    ///
    /// # Returns
    /// The number of instruments whose cursor moved.
    async fn rewind_price_dates(&self, today: NaiveDate) -> Result<usize>;
}
