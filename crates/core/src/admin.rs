//! Run-state bookkeeping for the update cycle.

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

/// Singleton run-state record: when the weekly snapshot and the history
/// grooming pass last happened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct AdminState {
    pub last_weekly_update: Option<NaiveDate>,
    pub last_groom_run: Option<NaiveDate>,
}

/// Storage interface for the run-state singleton.
///
/// Implementations guarantee exactly one record exists: a missing or
/// duplicated row is collapsed back to a single blank one before any
/// read or write proceeds.
#[async_trait]
pub trait AdminStore: Send + Sync {
    /// Returns the current run state.
    fn state(&self) -> Result<AdminState>;

    /// Records the date of the latest weekly snapshot.
    async fn set_last_weekly_update(&self, date: NaiveDate) -> Result<()>;

    /// Records the date of the latest grooming run.
    async fn set_last_groom_run(&self, date: NaiveDate) -> Result<()>;

    /// Rewinds a weekly marker stamped `today` back by one week.
    ///
    /// Markers stamped on any other date are left alone.
    async fn rewind_weekly_update(&self, today: NaiveDate) -> Result<()>;
}
