//! Blob storage operations and the [`BlobStore`] implementation for `SqliteStorage`.

#![allow(clippy::missing_errors_doc)]

use async_trait::async_trait;
use chrono::Utc;
use sqlx::Row;

use crate::error::StorageError;
use crate::traits::BlobStore;

use super::core::SqliteStorage;

impl SqliteStorage {
    /// Read a blob by key.
    pub async fn read_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        let row = sqlx::query("SELECT value FROM blobs WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| Self::query_error("SELECT blobs", format!("{e}")))?;

        Ok(row.map(|row| row.get::<String, _>("value")))
    }

    /// Insert or replace a blob.
    pub async fn write_blob(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            "INSERT INTO blobs (key, value, updated_at) VALUES (?, ?, ?) \
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
        )
        .bind(key)
        .bind(value)
        .bind(&now)
        .execute(&self.pool)
        .await
        .map_err(|e| Self::query_error("UPSERT blobs", format!("{e}")))?;

        Ok(())
    }
}

#[async_trait]
impl BlobStore for SqliteStorage {
    async fn get_blob(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.read_blob(key).await
    }

    async fn set_blob(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.write_blob(key, value).await
    }
}
