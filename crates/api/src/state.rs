use std::sync::Arc;

use parking_lot::Mutex;
use shopfloor_engine::Workbench;
use shopfloor_storage::{BlobStore, SqliteStorage, StorageError};

use crate::config::AppConfig;

/// Shared handler state. The lock is held only for the synchronous
/// workbench call, never across an `.await`.
#[derive(Clone)]
pub struct AppState {
    pub workbench: Arc<Mutex<Workbench>>,
}

impl AppState {
    pub fn new(workbench: Workbench) -> Self {
        Self {
            workbench: Arc::new(Mutex::new(workbench)),
        }
    }

    /// Opens the database and image directory named by `config`.
    pub fn open(config: &AppConfig) -> Result<Self, StorageError> {
        let storage = SqliteStorage::open(&config.db_path)?;
        let blobs = BlobStore::open(&config.image_dir)?;
        Ok(Self::new(Workbench::new(storage, blobs)))
    }
}
