//! Application error types.

use concierge_mcp::{ApprovalError, McpError};
use thiserror::Error;

use crate::llm::LlmError;

pub type Result<T, E = AssistantError> = std::result::Result<T, E>;

#[derive(Debug, Error)]
pub enum AssistantError {
    #[error("Language model error: {0}")]
    Llm(#[from] LlmError),

    #[error(transparent)]
    Mcp(#[from] McpError),

    #[error(transparent)]
    Approval(#[from] ApprovalError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid resume snapshot: {0}")]
    Resume(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),
}
