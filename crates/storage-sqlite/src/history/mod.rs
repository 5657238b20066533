//! SQLite storage implementation for price history series.

mod model;
mod repository;

pub use model::PriceHistoryDB;
pub use repository::HistoryRepository;

// Re-export trait from core for convenience
pub use bandwatch_core::history::HistoryStore;
