//! Audit trail of guard decisions.
//!
//! Every command and response decision appends one [`AuditLogEntry`]. The
//! log is a capped ring buffer stored newest-first as a single JSON blob in a
//! [`BlobStore`]. Entries carry a rolling hash of the input, never the input.
//!
//! Auditing is advisory: storage and parse failures are logged and
//! swallowed, and never change a validation outcome.
//!
//! # Example
//!
//! ```
//! use std::sync::Arc;
//! use content_guard::audit::{command_hash, AuditAction, AuditLogEntry, AuditTrail};
//! use content_guard::storage::MemoryBlobStore;
//!
//! # tokio_test_block_on(async {
//! let trail = AuditTrail::new(Arc::new(MemoryBlobStore::new()), 100);
//! trail
//!     .append(AuditLogEntry::new(0, AuditAction::CommandValidated, "update news"))
//!     .await;
//! let entries = trail.read().await;
//! assert_eq!(entries[0].command_hash, command_hash("update news"));
//! # });
//! # fn tokio_test_block_on<F: std::future::Future>(f: F) -> F::Output {
//! #     tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(f)
//! # }
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::traits::BlobStore;

/// Blob key under which the audit log is stored.
pub const AUDIT_LOG_KEY: &str = "guard_audit_log";

/// What a guard decision was.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    /// A command passed validation.
    CommandValidated,
    /// A command was rejected.
    CommandBlocked,
    /// A model response passed validation.
    ResponseValidated,
    /// A model response was rejected.
    ResponseBlocked,
}

impl AuditAction {
    /// True for the two rejection actions.
    #[must_use]
    pub const fn is_blocked(self) -> bool {
        matches!(self, Self::CommandBlocked | Self::ResponseBlocked)
    }

    /// Wire name of the action.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::CommandValidated => "command_validated",
            Self::CommandBlocked => "command_blocked",
            Self::ResponseValidated => "response_validated",
            Self::ResponseBlocked => "response_blocked",
        }
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, schemars::JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
    /// Decision taken.
    pub action: AuditAction,
    /// Requesting identity, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    /// Rolling hash of the command or response text.
    pub command_hash: String,
    /// Why the decision was taken.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl AuditLogEntry {
    /// Create an entry, hashing `text` so the raw input is never stored.
    #[must_use]
    pub fn new(timestamp: i64, action: AuditAction, text: &str) -> Self {
        Self {
            timestamp,
            action,
            user_id: None,
            command_hash: command_hash(text),
            reason: None,
        }
    }

    /// Attach the requesting identity.
    #[must_use]
    pub fn with_user(mut self, user_id: Option<&str>) -> Self {
        self.user_id = user_id.map(str::to_string);
        self
    }

    /// Attach a reason.
    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }
}

/// Non-cryptographic rolling hash (`h = h * 31 + unit` over UTF-16 units,
/// wrapping at 32 bits), rendered as eight hex digits.
#[must_use]
pub fn command_hash(text: &str) -> String {
    let hash = text.encode_utf16().fold(0_i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit))
    });
    #[allow(clippy::cast_sign_loss)]
    let unsigned = hash as u32;
    format!("{unsigned:08x}")
}

/// Capped, newest-first audit log over a [`BlobStore`].
#[derive(Clone)]
pub struct AuditTrail {
    store: Arc<dyn BlobStore>,
    capacity: usize,
}

impl AuditTrail {
    /// Create a trail keeping at most `capacity` entries.
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>, capacity: usize) -> Self {
        Self { store, capacity }
    }

    /// Maximum number of retained entries.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Prepend `entry` and drop anything beyond capacity.
    ///
    /// Never fails; persistence problems are logged and ignored.
    pub async fn append(&self, entry: AuditLogEntry) {
        let mut entries = self.read().await;
        entries.insert(0, entry);
        entries.truncate(self.capacity);

        let json = match serde_json::to_string(&entries) {
            Ok(json) => json,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to serialize audit log");
                return;
            }
        };

        if let Err(e) = self.store.set_blob(AUDIT_LOG_KEY, &json).await {
            tracing::debug!(error = %e, "Failed to write audit log");
        }
    }

    /// Current entries, newest first. Empty when the log is missing or unreadable.
    pub async fn read(&self) -> Vec<AuditLogEntry> {
        let blob = match self.store.get_blob(AUDIT_LOG_KEY).await {
            Ok(Some(blob)) => blob,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::debug!(error = %e, "Failed to read audit log");
                return Vec::new();
            }
        };

        serde_json::from_str(&blob).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Audit log blob is corrupt, starting over");
            Vec::new()
        })
    }

    /// Remove all entries.
    pub async fn clear(&self) {
        if let Err(e) = self.store.set_blob(AUDIT_LOG_KEY, "[]").await {
            tracing::debug!(error = %e, "Failed to clear audit log");
        }
    }
}

impl std::fmt::Debug for AuditTrail {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditTrail")
            .field("capacity", &self.capacity)
            .finish_non_exhaustive()
    }
}
