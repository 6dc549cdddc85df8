//! Tool definitions with rmcp macros.
//!
//! Four tools are exposed:
//!
//! | Tool | Purpose |
//! |------|---------|
//! | `guard_validate_command` | Screen a user prompt before it reaches the model |
//! | `guard_validate_response` | Validate and bound a model reply against live content |
//! | `guard_audit_log` | Read recent guard decisions |
//! | `guard_metrics` | Decision statistics since startup |
//!
//! Rejections are ordinary results with `isValid: false`. Tool errors are
//! reserved for malformed calls.

use std::sync::Arc;

use rmcp::handler::server::router::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content, ServerCapabilities, ServerInfo};
use rmcp::{tool, tool_handler, tool_router, ErrorData, ServerHandler};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::types::AppState;
use crate::audit::AuditLogEntry;
use crate::content::SiteContent;
use crate::error::McpError;

/// Most audit entries a single `guard_audit_log` call returns.
pub const MAX_AUDIT_LOG_LIMIT: usize = 100;

// ============================================================================
// Request Types with JsonSchema (for tool parameters)
// ============================================================================

/// Request to validate a user prompt.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidateCommandRequest {
    /// Prompt text as typed by the user.
    pub prompt: String,
    /// Requesting identity; enables rate limiting.
    pub user_id: Option<String>,
}

/// Request to validate a model reply.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct ValidateResponseRequest {
    /// Raw model reply, possibly with prose or code fences around the JSON.
    pub raw: String,
    /// Live snapshot the reply would replace. Empty when omitted.
    #[serde(default)]
    pub current: SiteContent,
    /// Requesting identity, recorded in the audit log.
    pub user_id: Option<String>,
}

/// Request to read the audit log.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct AuditLogRequest {
    /// Maximum entries to return, newest first (1-100, default 20).
    pub limit: Option<usize>,
}

// ============================================================================
// Response Types
// ============================================================================

/// Audit log page.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AuditLogResponse {
    /// Entries, newest first.
    pub entries: Vec<AuditLogEntry>,
    /// Entries currently retained.
    pub total: usize,
}

fn json_result<T: Serialize>(value: &T) -> Result<CallToolResult, ErrorData> {
    let json = serde_json::to_string(value).map_err(|e| McpError::Internal {
        message: format!("Failed to serialize result: {e}"),
    })?;
    Ok(CallToolResult::success(vec![Content::text(json)]))
}

// ============================================================================
// Guard Server
// ============================================================================

/// MCP server exposing the guard as tools.
#[derive(Clone)]
pub struct GuardServer {
    state: Arc<AppState>,
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl GuardServer {
    /// Creates a new server over shared state.
    #[must_use]
    pub fn new(state: Arc<AppState>) -> Self {
        Self {
            state,
            tool_router: Self::tool_router(),
        }
    }

    /// Screen a user prompt.
    #[tool(
        name = "guard_validate_command",
        description = "Validate a user prompt before forwarding it to the model. Returns isValid, error and sanitizedPrompt."
    )]
    pub async fn validate_command(
        &self,
        Parameters(req): Parameters<ValidateCommandRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let verdict = self
            .state
            .guard
            .validate_command(&req.prompt, req.user_id.as_deref())
            .await;
        json_result(&verdict)
    }

    /// Validate and bound a model reply.
    #[tool(
        name = "guard_validate_response",
        description = "Validate, sanitize and bound a model JSON reply against the current site content. Returns isValid, error and sanitizedContent."
    )]
    pub async fn validate_response(
        &self,
        Parameters(req): Parameters<ValidateResponseRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let verdict = self
            .state
            .guard
            .validate_response(&req.raw, &req.current, req.user_id.as_deref())
            .await;
        json_result(&verdict)
    }

    /// Read recent audit entries.
    #[tool(
        name = "guard_audit_log",
        description = "Read recent guard decisions, newest first. Entries carry a hash of the input, never the input itself."
    )]
    pub async fn audit_log(
        &self,
        Parameters(req): Parameters<AuditLogRequest>,
    ) -> Result<CallToolResult, ErrorData> {
        let limit = req.limit.unwrap_or(20);
        if limit == 0 || limit > MAX_AUDIT_LOG_LIMIT {
            return Err(McpError::InvalidParameters {
                tool: "guard_audit_log".into(),
                message: format!("limit must be between 1 and {MAX_AUDIT_LOG_LIMIT}"),
            }
            .into());
        }

        let mut entries = self.state.guard.audit_log().await;
        let total = entries.len();
        entries.truncate(limit);
        json_result(&AuditLogResponse { entries, total })
    }

    /// Decision statistics.
    #[tool(
        name = "guard_metrics",
        description = "Guard decision counts, block rate and block reasons since startup."
    )]
    pub async fn metrics(&self) -> Result<CallToolResult, ErrorData> {
        json_result(&self.state.guard.metrics())
    }
}

#[tool_handler]
impl ServerHandler for GuardServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            instructions: Some(
                "Content guard: validate prompts before they reach the model and model replies before they overwrite live site content."
                    .to_string(),
            ),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for GuardServer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GuardServer")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
