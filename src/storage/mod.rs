//! Storage backend.
//!
//! This module provides:
//! - `SQLite` blob storage
//! - An in-memory blob store
//!
//! Both implement [`BlobStore`](crate::traits::BlobStore), the only
//! persistence contract the guard needs.
//!
//! The implementation is split across submodules:
//! - `core`: Pool management and migrations
//! - `blob`: Blob read/write and the `BlobStore` implementation
//! - `memory`: `HashMap`-backed store
//!
//! # Example
//!
//! ```ignore
//! use content_guard::storage::SqliteStorage;
//!
//! let storage = SqliteStorage::new("./data/content-guard.db").await?;
//! storage.write_blob("guard_audit_log", "[]").await?;
//! ```

mod blob;
mod core;
mod memory;

pub use self::core::SqliteStorage;
pub use memory::MemoryBlobStore;
