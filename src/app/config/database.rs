//! Database configuration.

use serde::{Deserialize, Serialize};

/// Environment variable that overrides `database.url`.
pub const DATABASE_URL_ENV: &str = "DATABASE_URL";

/// SQLite location and snapshot retention.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// File path or `:memory:`.
    pub url: String,
    /// Hours of raw odds snapshots to keep.
    pub snapshot_retention_hours: i64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "vantedge.db".into(),
            snapshot_retention_hours: 1,
        }
    }
}

impl DatabaseConfig {
    pub fn snapshot_retention(&self) -> chrono::Duration {
        chrono::Duration::hours(self.snapshot_retention_hours)
    }
}
