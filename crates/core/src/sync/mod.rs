//! Update orchestration module.
//!
//! - [`service`] - The price update service driving the daily cycle
//! - [`results`] - Summary types returned by each operation
//!
//! # Architecture
//!
//! ```text
//! PriceUpdateService → QuoteProvider (market data)
//!       ↓
//! InstrumentStore / HistoryStore / AdminStore (DB)
//! ```
//!
//! The service owns an in-memory cache of the tracked instruments and
//! keeps it in step with every store write, so one cycle never re-reads
//! what it just wrote.

pub mod results;
pub mod service;


// Re-export commonly used types for convenience
pub use results::{ReconcileSummary, ResetSummary, UpdateSummary};
pub use service::PriceUpdateService;
