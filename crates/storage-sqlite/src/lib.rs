//! SQLite storage implementation for Bandwatch.
//!
//! This crate provides all database-related functionality using Diesel ORM with SQLite.
//! It implements the storage traits defined in `bandwatch-core` and contains:
//! - Database connection pooling and management
//! - Diesel migrations
//! - Repository implementations for the domain entities
//! - Database-specific model types (with Diesel derives)
//!
//! # Architecture
//!
//! This crate is the only place in the application where Diesel dependencies exist.
//! The other crates are database-agnostic and work with traits.
//!
//! ```text
//! core (domain)      market-data (providers)
//!       │                      │
//!       └──────────┬───────────┘
//!                  │
//!                  ▼
//!          storage-sqlite (this crate)
//!                  │
//!                  ▼
//!              SQLite DB
//! ```

pub mod db;
pub mod errors;
pub mod schema;

// Repository implementations
pub mod admin;
pub mod history;
pub mod instruments;

// Re-export database utilities
pub use db::{
    create_pool, get_connection, get_db_path, init, run_migrations, spawn_writer, DbConnection,
    DbPool, WriteHandle,
};

// Re-export storage errors and conversion helpers
pub use errors::{IntoCore, StorageError};

// Re-export from bandwatch-core for convenience
pub use bandwatch_core::errors::{DatabaseError, Error, Result};
