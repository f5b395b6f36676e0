//! Wiring of configuration, storage and services for one process.

use std::sync::Arc;

use tracing::debug;

use super::config::Config;
use crate::adapter::sqlite::{create_pool, run_migrations};
use crate::adapter::SqliteStore;
use crate::application::{DetectionPipeline, LifecycleManager};
use crate::error::Result;

/// Opened store plus the configuration it was opened with.
pub struct AppContext {
    config: Config,
    store: Arc<SqliteStore>,
}

impl AppContext {
    /// Open the configured database and apply pending migrations.
    ///
    /// # Errors
    ///
    /// Returns an error if the pool cannot be created or migrations fail.
    pub fn open(config: Config) -> Result<Self> {
        let pool = create_pool(&config.database.url)?;
        run_migrations(&pool)?;
        debug!(url = %config.database.url, "Database ready");
        Ok(Self {
            config,
            store: Arc::new(SqliteStore::new(pool)),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &Arc<SqliteStore> {
        &self.store
    }

    pub fn pipeline(&self) -> DetectionPipeline<SqliteStore> {
        let detection = &self.config.detection;
        DetectionPipeline::new(Arc::clone(&self.store), detection.lifecycle(), detection.stake())
            .with_snapshot_retention(self.config.database.snapshot_retention())
    }

    pub fn lifecycle(&self) -> LifecycleManager<SqliteStore> {
        LifecycleManager::new(Arc::clone(&self.store), self.config.detection.lifecycle())
    }
}
