//! Database layer
//!
//! Connection pool management, embedded migrations, and per-entity
//! repositories over SQLite.

pub mod migrations;
pub mod pool;
pub mod repositories;

pub use migrations::run_migrations;
pub use pool::{create_pool, create_test_pool};
