//! MCP error types.
//!
//! Defines error variants for provider connections, tool execution,
//! configuration and the approval gate.

use thiserror::Error;

pub type McpResult<T> = Result<T, McpError>;

#[derive(Debug, Error)]
pub enum McpError {
    #[error("Server not found: {0}")]
    ServerNotFound(String),

    #[error("Server disconnected: {0}")]
    ServerDisconnected(String),

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Tool execution failed: {0}")]
    ToolExecution(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Invalid arguments: {0}")]
    InvalidArguments(String),

    #[error("Provider '{provider}' is {state}, expected {expected}")]
    InvalidState {
        provider: String,
        state: String,
        expected: String,
    },

    #[error("Approval error: {0}")]
    Approval(#[from] ApprovalError),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}

/// Approval-specific errors.
#[derive(Debug, Error)]
pub enum ApprovalError {
    /// No pending approval for the session (already resolved or never created).
    #[error("Approval not found: {0}")]
    NotFound(String),

    /// The session already has an approval waiting for a decision.
    #[error("Approval already pending: {0}")]
    AlreadyPending(String),
}
