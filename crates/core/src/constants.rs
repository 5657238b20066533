/// Days of daily price history to keep
pub const DAILY_DAYS_TO_KEEP: i64 = 100;

/// Weeks of weekly price history to keep
pub const WEEKLY_WEEKS_TO_KEEP: i64 = 70;

/// Day of the month on which history grooming runs
pub const GROOM_DAY_OF_MONTH: u32 = 5;

/// Grooming is forced once this many days pass without a run
pub const GROOM_OVERDUE_DAYS: i64 = 31;

/// A weekly snapshot is forced once this many days pass without one
pub const WEEKLY_OVERDUE_DAYS: i64 = 7;
