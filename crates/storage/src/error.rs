use thiserror::Error;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("sheet collision: {sheet_id}")]
    SheetCollision { sheet_id: String },

    #[error("core error: {0}")]
    Core(#[from] shopfloor_core::CoreError),
}
