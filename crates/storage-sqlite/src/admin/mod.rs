//! SQLite storage implementation for the run-state singleton.

mod model;
mod repository;

pub use model::{AdminStateDB, NewAdminStateDB};
pub use repository::AdminRepository;

// Re-export trait from core for convenience
pub use bandwatch_core::admin::AdminStore;
