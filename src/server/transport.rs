//! Transport layer for MCP server.
//!
//! Stdio only: stdout carries JSON-RPC, so logs must go to stderr.

use rmcp::service::{serve_server, RoleServer, RunningService};
use rmcp::transport::io::stdio;

use super::tools::GuardServer;
use crate::error::{AppError, McpError};

/// Stdio transport handler.
#[derive(Debug, Default)]
pub struct StdioTransport;

impl StdioTransport {
    /// Creates a new stdio transport.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Starts serving `server` over stdin/stdout.
    ///
    /// # Errors
    ///
    /// Returns an error if the MCP handshake fails.
    pub async fn serve(
        self,
        server: GuardServer,
    ) -> Result<RunningService<RoleServer, GuardServer>, AppError> {
        serve_server(server, stdio()).await.map_err(|e| {
            AppError::Mcp(McpError::Internal {
                message: e.to_string(),
            })
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stdio_transport_debug() {
        let transport = StdioTransport::new();
        let debug = format!("{transport:?}");
        assert!(debug.contains("StdioTransport"));
    }
}
