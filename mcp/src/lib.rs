//! Multi-provider MCP client with a human approval gate.
//!
//! ## Modules
//!
//! - [`core`]: provider configuration, connections and the tool registry
//! - [`inventory`]: tool descriptors, typed argument shapes and the name index
//! - [`approval`]: sensitive tool set, pending approvals, prompters and audit
//!
//! ## Shared Types
//!
//! - [`SessionId`]: per-conversation isolation key

pub mod error;
pub mod session;

// Subsystems
pub mod approval;
pub mod core;
pub mod inventory;

pub use approval::{
    ApprovalDecision, ApprovalManager, ApprovalMode, ApprovalPrompter, ApprovalRequest,
    AuditEntry, AuditLog, DecisionResult, DecisionSource, PendingApproval, SensitiveToolSet,
    TerminalPrompter,
};
pub use core::{
    ConnectionState, McpConfig, McpProviderConnection, McpServerConfig, ProviderConnection,
    ProviderConnector, StdioConnector, ToolCallResult, ToolOutput, ToolRegistry,
};
pub use error::{ApprovalError, McpError, McpResult};
pub use inventory::{ArgSchema, ParamSpec, ParamType, ToolArgs, ToolDescriptor, ToolEntry};
pub use session::SessionId;
