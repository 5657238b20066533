//! Result summaries for update-cycle operations.

use serde::{Deserialize, Serialize};

/// Outcome of one daily update cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateSummary {
    /// Instruments whose quote fields changed and were persisted.
    pub refreshed: usize,
    /// Instruments fetched successfully with nothing new to record.
    pub unchanged: usize,
    /// Instruments skipped on fetch failure or an unusable price.
    pub skipped: usize,
    /// Instruments whose initial history backfill completed this cycle.
    pub backfilled: usize,
    /// Whether the history grooming pass ran this cycle.
    pub groomed: bool,
    /// Per-instrument persistence failures (symbol, message).
    pub errors: Vec<(String, String)>,
}

impl UpdateSummary {
    /// Check if the cycle completed with no persistence failures.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        if self.is_success() {
            format!(
                "Refreshed {} instruments ({} unchanged, {} skipped)",
                self.refreshed, self.unchanged, self.skipped
            )
        } else {
            format!(
                "Refreshed {} instruments with {} failures",
                self.refreshed,
                self.errors.len()
            )
        }
    }
}

/// Outcome of reconciling the tracked set against the watchlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileSummary {
    /// Instruments deleted because the watchlist no longer names them.
    pub removed: usize,
    /// Instruments whose name or band changed.
    pub updated: usize,
    /// Instruments newly tracked.
    pub added: usize,
    /// Watchlist entries dropped by validation.
    pub invalid: usize,
    /// Instruments whose initial history backfill completed during
    /// reconciliation.
    pub backfilled: usize,
    /// Whether every tracked instrument now has its full history.
    pub backfill_complete: bool,
    /// Per-instrument persistence failures (symbol, message).
    pub errors: Vec<(String, String)>,
}

impl ReconcileSummary {
    /// Check if reconciliation completed with no persistence failures.
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        format!(
            "Watchlist reconciled: {} added, {} updated, {} removed, {} invalid",
            self.added, self.updated, self.removed, self.invalid
        )
    }
}

/// Outcome of rolling back today's update state.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    /// Instruments whose refresh cursor was rewound.
    pub instruments_rewound: usize,
    /// History points deleted for today.
    pub points_deleted: usize,
}

impl ResetSummary {
    /// Get a summary string.
    pub fn summary(&self) -> String {
        format!(
            "Reset daily state: {} cursors rewound, {} history points removed",
            self.instruments_rewound, self.points_deleted
        )
    }
}
