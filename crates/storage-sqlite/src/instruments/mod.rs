//! SQLite storage implementation for tracked instruments.

mod model;
mod repository;

pub use model::{InstrumentDB, InstrumentUpdateDB, NewInstrumentDB};
pub use repository::InstrumentRepository;

// Re-export trait from core for convenience
pub use bandwatch_core::instruments::InstrumentStore;
