//! Approval gate for sensitive tool execution.
//!
//! - [`policy`]: which tools need approval
//! - [`prompt`]: blocking (terminal) decisions
//! - [`manager`]: suspended (chat) decisions
//! - [`audit`]: decision history

pub mod audit;
pub mod manager;
pub mod policy;
pub mod prompt;

pub use audit::{AuditEntry, AuditLog, DecisionResult, DecisionSource};
pub use manager::{
    ApprovalDecision, ApprovalManager, ApprovalMode, ApprovalRequest, PendingApproval,
};
pub use policy::{SensitiveToolSet, DEFAULT_SENSITIVE_TOOLS};
pub use prompt::{prompt_decision, ApprovalPrompter, TerminalPrompter};
