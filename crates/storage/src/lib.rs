pub mod blob;
pub mod error;
pub mod schema;
pub mod sqlite;
pub mod traits;

pub use blob::BlobStore;
pub use error::StorageError;
pub use sqlite::SqliteStorage;
pub use traits::*;
