//! Bandwatch Core - Domain entities, services, and traits.
//!
//! This crate contains the tracking engine's business logic: band
//! classification, update scheduling, history retention, and the daily
//! update service. It is database-agnostic and defines traits that are
//! implemented by the `storage-sqlite` crate.

pub mod admin;
pub mod constants;
pub mod errors;
pub mod history;
pub mod instruments;
pub mod overview;
pub mod reports;
pub mod schedule;
pub mod sync;
pub mod watchlist;
pub mod zones;

// Re-export common types from the domain modules
pub use admin::{AdminState, AdminStore};
pub use history::{HistoryStore, PricePoint, RetentionPolicy, SeriesKind};
pub use instruments::{Instrument, InstrumentStatus, InstrumentStore, InstrumentUpdate, WatchEntry};
pub use overview::{PricePanel, TimePeriod};
pub use reports::Report;
pub use sync::{PriceUpdateService, ReconcileSummary, ResetSummary, UpdateSummary};
pub use zones::{Zone, ZoneAssignment};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
