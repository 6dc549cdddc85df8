//! MCP server implementation.
//!
//! This module provides:
//! - Tool definitions with rmcp macros
//! - Stdio transport
//! - Shared application state
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use content_guard::config::Config;
//! use content_guard::server::{AppState, GuardServer};
//! use content_guard::storage::SqliteStorage;
//! use content_guard::traits::RealTimeProvider;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = Config::default();
//! let storage = SqliteStorage::new(&config.database_path).await?;
//! let state = AppState::new(config, Arc::new(storage), Arc::new(RealTimeProvider));
//! let server = GuardServer::new(Arc::new(state));
//! # Ok(())
//! # }
//! ```

mod mcp;
mod tools;
mod transport;
mod types;

pub use mcp::McpServer;
pub use tools::{
    AuditLogRequest, AuditLogResponse, GuardServer, ValidateCommandRequest,
    ValidateResponseRequest, MAX_AUDIT_LOG_LIMIT,
};
pub use transport::StdioTransport;
pub use types::AppState;
