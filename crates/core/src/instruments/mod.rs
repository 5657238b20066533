//! Instruments module - domain models and storage traits.

mod instruments_model;
mod instruments_traits;

// Re-export the public interface
pub use instruments_model::{Instrument, InstrumentStatus, InstrumentUpdate, WatchEntry};
pub use instruments_traits::InstrumentStore;
