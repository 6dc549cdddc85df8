//! In-process [`BlobStore`] for tests and storage-less deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StorageError;
use crate::traits::BlobStore;

/// Blob store backed by a `HashMap`. Contents are lost on drop.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<String, String>>,
}

impl MemoryBlobStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        let blobs = self.blobs.read().map_err(|e| StorageError::Internal {
            message: format!("Blob map lock poisoned: {e}"),
        })?;
        Ok(blobs.get(key).cloned())
    }

    async fn set_blob(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let mut blobs = self.blobs.write().map_err(|e| StorageError::Internal {
            message: format!("Blob map lock poisoned: {e}"),
        })?;
        blobs.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
