use std::sync::Arc;

use tempfile::TempDir;
use vantedge::adapter::sqlite::{create_pool, run_migrations};
use vantedge::adapter::SqliteStore;

/// Migrated SQLite database in a temporary directory.
pub struct TempDb {
    dir: TempDir,
}

impl TempDb {
    pub fn create() -> Self {
        let db = Self {
            dir: tempfile::tempdir().expect("create temp dir"),
        };
        run_migrations(&create_pool(&db.url()).expect("create pool")).expect("run migrations");
        db
    }

    pub fn url(&self) -> String {
        self.dir.path().join("vantedge.db").display().to_string()
    }

    /// A fresh store over its own pool, as a separate process would see it.
    pub fn store(&self) -> Arc<SqliteStore> {
        Arc::new(SqliteStore::new(create_pool(&self.url()).expect("create pool")))
    }
}
