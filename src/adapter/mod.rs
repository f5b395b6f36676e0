//! Implementations of ports (hexagonal adapters).

pub mod cli;
pub mod memory;
pub mod source;
pub mod sqlite;

pub use memory::InMemoryStore;
pub use source::JsonFileSource;
pub use sqlite::SqliteStore;
