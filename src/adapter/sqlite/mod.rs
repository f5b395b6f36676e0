//! SQLite persistence adapter.
//!
//! Provides connection pooling, embedded migrations, and a Diesel-backed
//! implementation of the opportunity and snapshot store ports.

pub mod connection;
pub mod model;
pub mod schema;
pub mod store;

pub use connection::{create_pool, run_migrations, DbPool};
pub use store::SqliteStore;
