//! Bandwatch Market Data Crate
//!
//! This crate supplies quote data for tracked instruments: the current
//! snapshot (price, previous close, 52-week bounds) and daily/weekly
//! closing-price history.
//!
//! # Overview
//!
//! The market data crate provides:
//! - A provider-agnostic [`QuoteProvider`] trait
//! - A Yahoo Finance implementation
//! - Request pacing and bounded retry via [`ThrottledProvider`]
//!
//! # Architecture
//!
//! ```text
//! +------------------+
//! |   Domain Layer   |  (instrument tracking)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! | ThrottledProvider|  (fixed delay, bounded retry)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  YahooProvider   |  (quoteSummary + chart API)
//! +------------------+
//!          |
//!          v
//! +------------------+
//! |  QuoteSnapshot   |  (tracked quote fields)
//! |  HistoricalPoint |  (dated closing prices)
//! +------------------+
//! ```
//!
//! # Core Types
//!
//! - [`QuoteSnapshot`] - The four quote fields tracked per instrument
//! - [`HistoricalPoint`] - One dated closing price
//! - [`SeriesFrequency`] - Daily or weekly sampling
//! - [`ProviderError`] / [`RetryClass`] - Error taxonomy with retry semantics

pub mod errors;
pub mod models;
pub mod provider;
pub mod throttle;

// Re-export all public types from models
pub use models::{HistoricalPoint, QuoteSnapshot, SeriesFrequency};

// Re-export error types
pub use errors::{ProviderError, RetryClass};

// Re-export provider types
pub use provider::yahoo::YahooProvider;
pub use provider::QuoteProvider;

// Re-export throttling layer
pub use throttle::{ThrottledProvider, DEFAULT_CALL_DELAY, HISTORY_ATTEMPTS, QUOTE_ATTEMPTS};
