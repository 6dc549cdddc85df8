//! Error types for the content guard.
//!
//! This module defines a hierarchical error system:
//! - [`AppError`]: Top-level application errors
//! - [`CommandError`]: Rejections on the prompt (command) side
//! - [`ResponseError`]: Rejections on the model reply (response) side
//! - [`ChangeBoundViolation`]: Change-magnitude policy breaches
//! - [`StorageError`]: Persistence failures (never shown to end users)
//! - [`McpError`]: MCP protocol errors
//! - [`ConfigError`]: Configuration errors
//!
//! The `Display` output of [`CommandError`] and [`ResponseError`] is the
//! user-facing rejection reason. All errors implement `Send + Sync`.

use thiserror::Error;

/// Top-level application error.
///
/// Returned by the binary-level entry points (server startup, storage
/// initialization). Validation itself never fails with an `AppError`; it
/// always produces a structured verdict.
#[derive(Debug, Error)]
pub enum AppError {
    /// Storage error.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// MCP protocol error.
    #[error("MCP protocol error: {0}")]
    Mcp(#[from] McpError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Coarse classification of a validation rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input had the wrong shape (empty, oversized, malformed, missing keys).
    InputShape,
    /// The input was well-formed but broke a policy (pattern, rate limit, bounds).
    PolicyViolation,
}

/// Command (prompt) rejections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Prompt was empty after trimming.
    #[error("Command must be a non-empty string")]
    Empty,

    /// Prompt is shorter than the minimum length.
    #[error("Command is too short (minimum {min} characters)")]
    TooShort {
        /// Minimum accepted length in characters.
        min: usize,
    },

    /// Prompt is longer than the maximum length.
    #[error("Command is too long (maximum {max} characters)")]
    TooLong {
        /// Maximum accepted length in characters.
        max: usize,
    },

    /// The identity has used up its request window.
    #[error("Rate limit exceeded. Please try again in {retry_after_seconds} seconds")]
    RateLimited {
        /// Whole seconds until the window resets.
        retry_after_seconds: u64,
    },

    /// A threat pattern matched. Deliberately does not name the pattern.
    #[error("Request contains a disallowed pattern")]
    DisallowedPattern,

    /// Angle brackets survived neutralization.
    #[error("Command contains disallowed markup characters")]
    UnsafeMarkup,
}

impl CommandError {
    /// Returns the coarse kind of this rejection.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Empty | Self::TooShort { .. } | Self::TooLong { .. } => ErrorKind::InputShape,
            Self::RateLimited { .. } | Self::DisallowedPattern | Self::UnsafeMarkup => {
                ErrorKind::PolicyViolation
            }
        }
    }
}

/// Change-bound policy breaches.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ChangeBoundViolation {
    /// The reply supplied no records at all.
    #[error("Response produced no content records; keeping current content")]
    NoRecordsProduced,

    /// Too many records added in one response.
    #[error("Too many {field} added in one response: {proposed} proposed, at most {limit} allowed")]
    TooManyAdditions {
        /// Content category (`featuredPrograms` or `latestNews`).
        field: String,
        /// Number of proposed records.
        proposed: usize,
        /// Highest accepted count for this response.
        limit: usize,
    },

    /// A non-empty category would be emptied.
    #[error("Response would remove all {field}; clearing a category in one step is not allowed")]
    CategoryWiped {
        /// Content category (`featuredPrograms` or `latestNews`).
        field: String,
    },
}

/// Response (model reply) rejections.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResponseError {
    /// Reply exceeds the size limit.
    #[error("Response too large: {size} bytes (max: {max})")]
    TooLarge {
        /// Size of the reply in bytes.
        size: usize,
        /// Maximum accepted size in bytes.
        max: usize,
    },

    /// No `{ ... }` span was found.
    #[error("No JSON object found in response")]
    NoJson,

    /// The located span did not parse as a JSON object.
    #[error("Invalid JSON in response: {message}")]
    JsonParseFailed {
        /// Parser message.
        message: String,
    },

    /// Neither content key is present.
    #[error("Response must contain featuredPrograms or latestNews")]
    MissingContentKeys,

    /// A content key holds something other than an array.
    #[error("{field} must be an array")]
    NotAnArray {
        /// The offending key.
        field: String,
    },

    /// A category exceeds its hard cap.
    #[error("Too many {field}: {count} (max: {max})")]
    TooManyRecords {
        /// Content category.
        field: String,
        /// Number of records supplied.
        count: usize,
        /// Hard cap.
        max: usize,
    },

    /// A sanitized record failed the structural re-check.
    #[error("Invalid record in {field} at index {index}: {reason}")]
    InvalidRecord {
        /// Content category.
        field: String,
        /// Index within the sanitized list.
        index: usize,
        /// Which constraint failed.
        reason: String,
    },

    /// The change-bound policy rejected the proposal.
    #[error("{0}")]
    ChangeBound(#[from] ChangeBoundViolation),
}

impl ResponseError {
    /// Returns the coarse kind of this rejection.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::ChangeBound(_) => ErrorKind::PolicyViolation,
            _ => ErrorKind::InputShape,
        }
    }
}

/// Storage errors.
///
/// These errors represent failures of the persistence collaborator. The
/// audit trail logs and swallows them.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// Failed to connect to the database.
    #[error("Database connection failed: {message}")]
    ConnectionFailed {
        /// Description of the connection failure.
        message: String,
    },

    /// A database query failed.
    #[error("Query failed: {query} - {message}")]
    QueryFailed {
        /// The query that failed (may be truncated).
        query: String,
        /// Description of the failure.
        message: String,
    },

    /// Database migration failed.
    #[error("Migration failed: {version} - {message}")]
    MigrationFailed {
        /// The migration version that failed.
        version: String,
        /// Description of the failure.
        message: String,
    },

    /// Internal storage error.
    #[error("Internal storage error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

/// MCP protocol errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum McpError {
    /// Invalid parameters for a tool.
    #[error("Invalid parameters for {tool}: {message}")]
    InvalidParameters {
        /// The tool name.
        tool: String,
        /// Description of what's invalid.
        message: String,
    },

    /// Internal server error.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl From<McpError> for rmcp::ErrorData {
    fn from(err: McpError) -> Self {
        match err {
            McpError::InvalidParameters { .. } => Self::invalid_params(err.to_string(), None),
            McpError::Internal { .. } => Self::internal_error(err.to_string(), None),
        }
    }
}

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Configuration value is invalid.
    #[error("Invalid value for {var}: {reason}")]
    InvalidValue {
        /// The variable name.
        var: String,
        /// Why the value is invalid.
        reason: String,
    },
}
