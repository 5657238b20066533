//! Price history series: point model, retention policy, and storage trait.
//!
//! Two series exist per instrument. The daily series collects one closing
//! price per refresh day; the weekly series collects one price per trading
//! week, anchored to Fridays. Both are bounded by a [`RetentionPolicy`]
//! that the grooming pass enforces.

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::constants::{DAILY_DAYS_TO_KEEP, WEEKLY_WEEKS_TO_KEEP};
use crate::errors::Result;

/// Which of the two history series a point belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeriesKind {
    Daily,
    Weekly,
}

impl SeriesKind {
    /// Series discriminator as stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            SeriesKind::Daily => "daily",
            SeriesKind::Weekly => "weekly",
        }
    }
}

/// One persisted price observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PricePoint {
    pub instrument_id: i64,
    pub date: NaiveDate,
    pub price: Decimal,
}

/// Retention horizons for the two series.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub daily_days_to_keep: i64,
    pub weekly_weeks_to_keep: i64,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            daily_days_to_keep: DAILY_DAYS_TO_KEEP,
            weekly_weeks_to_keep: WEEKLY_WEEKS_TO_KEEP,
        }
    }
}

impl RetentionPolicy {
    /// Horizon for a series, expressed in days back from today.
    ///
    /// Backfill requests this much history and grooming deletes anything
    /// dated on or before today minus this many days.
    pub fn horizon_days(&self, series: SeriesKind) -> i64 {
        match series {
            SeriesKind::Daily => self.daily_days_to_keep,
            SeriesKind::Weekly => self.weekly_weeks_to_keep * 7,
        }
    }
}

/// Storage interface for the price history series.
#[async_trait]
pub trait HistoryStore: Send + Sync {
    /// Returns one instrument's points in a series dated after `since`,
    /// oldest first.
    fn points(
        &self,
        instrument_id: i64,
        series: SeriesKind,
        since: NaiveDate,
    ) -> Result<Vec<PricePoint>>;

    /// Writes dated prices into a series for one instrument.
    ///
    /// A point already present for the same date is replaced, so re-running
    /// an update never duplicates rows.
    ///
    /// # Returns
    /// The number of rows written.
    async fn append(
        &self,
        instrument_id: i64,
        series: SeriesKind,
        points: &[(NaiveDate, Decimal)],
    ) -> Result<usize>;

    /// Copies an instrument's own daily point on `date` into its weekly
    /// series.
    ///
    /// Writes nothing when the instrument has no daily point on that date.
    ///
    /// # Returns
    /// The number of rows written (0 or 1).
    async fn copy_daily_to_weekly(&self, instrument_id: i64, date: NaiveDate) -> Result<usize>;

    /// Deletes points dated on or before `threshold` across all
    /// instruments in one series.
    ///
    /// # Returns
    /// The number of rows removed.
    async fn delete_older_than(&self, series: SeriesKind, threshold: NaiveDate) -> Result<usize>;

    /// Deletes both series for one instrument.
    ///
    /// # Returns
    /// The number of rows removed.
    async fn delete_for_instrument(&self, instrument_id: i64) -> Result<usize>;

    /// Deletes points dated exactly `date` in both series, across all
    /// instruments.
    ///
    /// # Returns
    /// The number of rows removed.
    async fn delete_on_date(&self, date: NaiveDate) -> Result<usize>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_series_discriminators() {
        assert_eq!(SeriesKind::Daily.as_str(), "daily");
        assert_eq!(SeriesKind::Weekly.as_str(), "weekly");
    }

    #[test]
    fn test_default_retention_horizons() {
        let policy = RetentionPolicy::default();
        assert_eq!(policy.horizon_days(SeriesKind::Daily), 100);
        assert_eq!(policy.horizon_days(SeriesKind::Weekly), 490);
    }
}
