//! Application layer - configuration and wiring.

pub mod config;
mod context;

pub use config::{Config, DatabaseConfig, DetectionConfig, LoggingConfig};
pub use context::AppContext;
