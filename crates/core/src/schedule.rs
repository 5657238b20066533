//! Calendar rules for the update cycle.
//!
//! Every decision about *when* something happens lives here as a pure
//! function over dates: whether a price is stale, which Friday anchors a
//! week, and whether weekly snapshots or history grooming are due. The
//! update service supplies the dates and acts on the answers.

use chrono::{Datelike, Duration, NaiveDate};

use crate::constants::{GROOM_DAY_OF_MONTH, GROOM_OVERDUE_DAYS, WEEKLY_OVERDUE_DAYS};

/// Returns true when a price last refreshed on `price_date` is stale.
///
/// A price stamped today is fresh; anything older, or never stamped at
/// all, needs a refresh.
pub fn needs_refresh(price_date: Option<NaiveDate>, today: NaiveDate) -> bool {
    match price_date {
        None => true,
        Some(date) => date < today,
    }
}

/// Returns the Friday that anchors `date`'s trading week.
///
/// Friday maps to itself, Saturday and Sunday map back to the Friday just
/// passed, and Monday through Thursday map back to the previous week's
/// Friday. The result is always a Friday on or before `date`.
pub fn weekly_anchor(date: NaiveDate) -> NaiveDate {
    // Monday = 0 .. Sunday = 6
    let dow = i64::from(date.weekday().num_days_from_monday());
    match dow {
        4 => date,
        5 | 6 => date - Duration::days(dow - 4),
        _ => date - Duration::days(dow + 3),
    }
}

/// Returns true when a weekly history snapshot is due on `today`.
///
/// Snapshots land on Fridays: with none on record the first one waits for
/// a Friday, and afterwards one is due each Friday not yet recorded, or
/// whenever more than a week has slipped by since the last one.
pub fn weekly_due(today: NaiveDate, last_update: Option<NaiveDate>) -> bool {
    let is_friday = today.weekday().num_days_from_monday() == 4;
    match last_update {
        None => is_friday,
        Some(last) => {
            (is_friday && last < today) || today - last > Duration::days(WEEKLY_OVERDUE_DAYS)
        }
    }
}

/// Returns true when history grooming is due on `today`.
///
/// Grooming runs on the 5th of each month, at most once that day, or
/// whenever more than a month has slipped by since the last run.
pub fn grooming_due(today: NaiveDate, last_run: Option<NaiveDate>) -> bool {
    match last_run {
        None => true,
        Some(last) => {
            (today.day() == GROOM_DAY_OF_MONTH && last != today)
                || today - last > Duration::days(GROOM_OVERDUE_DAYS)
        }
    }
}
