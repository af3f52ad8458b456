use std::fs;
use std::io::{ErrorKind, Write};
use std::path::PathBuf;

use shopfloor_core::image::{self, EmbeddedImage};

use crate::error::StorageError;

/// Image bytes read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredBlob {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// Content-addressed image files in one directory.
#[derive(Debug, Clone)]
pub struct BlobStore {
    root: PathBuf,
}

impl BlobStore {
    pub fn open(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    /// Writes the bytes and returns the path clients use to fetch them.
    pub fn put(&self, bytes: &[u8], extension: &str) -> Result<String, StorageError> {
        let file_name = image::blob_file_name(bytes, extension);
        let target = self.root.join(&file_name);
        if !target.exists() {
            let mut tmp = tempfile::NamedTempFile::new_in(&self.root)?;
            tmp.write_all(bytes)?;
            tmp.as_file().sync_all()?;
            tmp.persist(&target).map_err(|e| StorageError::Io(e.error))?;
            tracing::debug!(file = %file_name, len = bytes.len(), "stored image blob");
        }
        Ok(image::reference_path(&file_name))
    }

    pub fn put_embedded(&self, image: &EmbeddedImage) -> Result<String, StorageError> {
        self.put(&image.bytes, &image.extension)
    }

    pub fn get(&self, file_name: &str) -> Result<StoredBlob, StorageError> {
        if !image::is_safe_file_name(file_name) {
            return Err(StorageError::NotFound(format!("image {file_name}")));
        }
        match fs::read(self.root.join(file_name)) {
            Ok(bytes) => Ok(StoredBlob {
                bytes,
                content_type: image::content_type_for(file_name),
            }),
            Err(e) if e.kind() == ErrorKind::NotFound => {
                Err(StorageError::NotFound(format!("image {file_name}")))
            }
            Err(e) => Err(StorageError::Io(e)),
        }
    }
}
