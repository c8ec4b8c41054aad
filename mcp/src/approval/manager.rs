//! Pending approval store for the asynchronous approval channel.
//!
//! A turn that reaches a sensitive tool parks a [`PendingApproval`] under its
//! session and hands an [`ApprovalRequest`] back to the caller. A later
//! decision for the same session takes the record out again and the caller
//! resumes the turn from the stored snapshot. At most one approval can be
//! pending per session.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::{mapref::entry::Entry, DashMap};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info};

use super::audit::{AuditLog, DecisionResult, DecisionSource};
use crate::{error::ApprovalError, inventory::ToolArgs, session::SessionId};

/// User's decision on a proposed invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ApprovalDecision {
    /// Run with the proposed arguments.
    Approved,
    /// Run with replacement arguments.
    Modified(ToolArgs),
    /// Do not run.
    Cancelled { reason: Option<String> },
}

impl ApprovalDecision {
    pub fn approved() -> Self {
        Self::Approved
    }

    pub fn modified(args: ToolArgs) -> Self {
        Self::Modified(args)
    }

    pub fn cancelled() -> Self {
        Self::Cancelled { reason: None }
    }

    pub fn cancelled_because(reason: impl Into<String>) -> Self {
        Self::Cancelled {
            reason: Some(reason.into()),
        }
    }

    /// Whether the tool may run.
    pub fn is_approved(&self) -> bool {
        !matches!(self, ApprovalDecision::Cancelled { .. })
    }

    /// Arguments to invoke with, or `None` when cancelled.
    pub fn effective_args(&self, proposed: &ToolArgs) -> Option<ToolArgs> {
        match self {
            ApprovalDecision::Approved => Some(proposed.clone()),
            ApprovalDecision::Modified(args) => Some(args.clone()),
            ApprovalDecision::Cancelled { .. } => None,
        }
    }

    fn audit_result(&self) -> DecisionResult {
        match self {
            ApprovalDecision::Approved => DecisionResult::Approved,
            ApprovalDecision::Modified(_) => DecisionResult::Modified,
            ApprovalDecision::Cancelled { reason } => DecisionResult::Cancelled {
                reason: reason.clone().unwrap_or_else(|| "cancelled by user".to_string()),
            },
        }
    }
}

/// How sensitive calls are decided.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalMode {
    /// Block the turn on a prompter until it answers.
    #[default]
    Synchronous,
    /// Suspend the turn and wait for a later decision.
    Asynchronous,
}

/// Approval request handed to the surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApprovalRequest {
    /// Opaque correlation id.
    pub id: String,
    pub session_id: SessionId,
    pub tool_name: String,
    pub arguments: ToolArgs,
    pub created_at: DateTime<Utc>,
}

/// A suspended invocation awaiting a decision.
#[derive(Debug, Clone)]
pub struct PendingApproval {
    pub request: ApprovalRequest,
    /// Serialized turn data needed to continue after the decision.
    pub resume: Value,
}

pub struct ApprovalManager {
    pending: DashMap<SessionId, PendingApproval>,
    audit_log: Arc<AuditLog>,
}

impl ApprovalManager {
    pub fn new(audit_log: Arc<AuditLog>) -> Self {
        Self {
            pending: DashMap::new(),
            audit_log,
        }
    }

    /// Park an invocation for the session.
    ///
    /// Fails with [`ApprovalError::AlreadyPending`] when the session already
    /// waits on a decision; the existing approval is left untouched.
    pub fn request_approval(
        &self,
        session_id: &SessionId,
        tool_name: &str,
        arguments: ToolArgs,
        resume: Value,
    ) -> Result<ApprovalRequest, ApprovalError> {
        match self.pending.entry(session_id.clone()) {
            Entry::Occupied(existing) => {
                self.audit_log.record_decision(
                    session_id,
                    tool_name,
                    DecisionResult::Rejected {
                        reason: format!(
                            "'{}' is still awaiting approval",
                            existing.get().request.tool_name
                        ),
                    },
                    DecisionSource::System,
                );
                Err(ApprovalError::AlreadyPending(session_id.to_string()))
            }
            Entry::Vacant(slot) => {
                let request = ApprovalRequest {
                    id: uuid::Uuid::new_v4().to_string(),
                    session_id: session_id.clone(),
                    tool_name: tool_name.to_string(),
                    arguments,
                    created_at: Utc::now(),
                };
                slot.insert(PendingApproval {
                    request: request.clone(),
                    resume,
                });
                self.audit_log.record_decision(
                    session_id,
                    tool_name,
                    DecisionResult::Pending,
                    DecisionSource::Chat,
                );
                info!(session = %session_id, tool = %tool_name, id = %request.id, "Approval pending");
                Ok(request)
            }
        }
    }

    /// Take the pending approval out and record the decision.
    pub fn resolve(
        &self,
        session_id: &SessionId,
        decision: &ApprovalDecision,
        source: DecisionSource,
    ) -> Result<PendingApproval, ApprovalError> {
        let (_, pending) = self
            .pending
            .remove(session_id)
            .ok_or_else(|| ApprovalError::NotFound(session_id.to_string()))?;

        self.audit_log.record_decision(
            session_id,
            &pending.request.tool_name,
            decision.audit_result(),
            source,
        );
        info!(
            session = %session_id,
            tool = %pending.request.tool_name,
            approved = decision.is_approved(),
            "Approval resolved"
        );
        Ok(pending)
    }

    /// Record a decision made by a blocking prompter.
    pub fn record_decision(
        &self,
        session_id: &SessionId,
        tool_name: &str,
        decision: &ApprovalDecision,
        source: DecisionSource,
    ) {
        debug!(session = %session_id, tool = %tool_name, approved = decision.is_approved(), "Approval decided");
        self.audit_log
            .record_decision(session_id, tool_name, decision.audit_result(), source);
    }

    /// Drop the session's pending approval without running it.
    pub fn cancel(&self, session_id: &SessionId) -> Option<PendingApproval> {
        let (_, pending) = self.pending.remove(session_id)?;
        self.audit_log.record_decision(
            session_id,
            &pending.request.tool_name,
            DecisionResult::Cancelled {
                reason: "session cleared".to_string(),
            },
            DecisionSource::System,
        );
        Some(pending)
    }

    pub fn pending_request(&self, session_id: &SessionId) -> Option<ApprovalRequest> {
        self.pending.get(session_id).map(|p| p.request.clone())
    }

    pub fn has_pending(&self, session_id: &SessionId) -> bool {
        self.pending.contains_key(session_id)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn audit_log(&self) -> &Arc<AuditLog> {
        &self.audit_log
    }
}

impl Default for ApprovalManager {
    fn default() -> Self {
        Self::new(Arc::new(AuditLog::new()))
    }
}
