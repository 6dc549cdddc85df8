//! Main MCP server orchestration.

use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::storage::SqliteStorage;
use crate::traits::RealTimeProvider;

use super::tools::GuardServer;
use super::transport::StdioTransport;
use super::types::AppState;

/// Main MCP server that orchestrates all components.
///
/// Opens the `SQLite` audit store, builds the guard and serves it over stdio.
#[derive(Debug)]
pub struct McpServer {
    config: Config,
}

impl McpServer {
    /// Creates a new MCP server with the given configuration.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Runs the server using stdio transport.
    ///
    /// Blocks until the client disconnects or an error occurs.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Storage initialization fails
    /// - Server encounters a runtime error
    #[cfg_attr(coverage_nightly, coverage(off))]
    pub async fn run_stdio(&self) -> Result<(), AppError> {
        let storage = SqliteStorage::new(&self.config.database_path).await?;

        let state = AppState::new(
            self.config.clone(),
            Arc::new(storage),
            Arc::new(RealTimeProvider),
        );
        let server = GuardServer::new(Arc::new(state));

        let running = StdioTransport::new().serve(server).await?;
        if let Err(e) = running.waiting().await {
            tracing::warn!(error = %e, "Server task ended abnormally");
        }

        Ok(())
    }

    /// Returns the server configuration.
    #[must_use]
    pub const fn config(&self) -> &Config {
        &self.config
    }
}
