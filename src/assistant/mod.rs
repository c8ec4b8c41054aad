//! Conversational workflow over the tool registry.
//!
//! Each user message runs one turn of a state machine: classify the intent,
//! walk the matching branch, then synthesize the answer.
//!
//! # Architecture
//!
//! - **State machine**: A single `execute()` driver dispatches steps based on `TurnState`.
//! - **Two-level context**: `SharedComponents` (per-assistant) and `TurnContext` (per-turn).
//! - **Approval**: sensitive tool calls either block on a prompter or suspend the
//!   turn. A suspended turn is continued by [`Assistant::resolve_approval`].

mod context;
mod driver;
mod gate;
mod intent;
mod prompts;
mod state;
mod steps;

use std::sync::Arc;

use concierge_mcp::{
    ApprovalDecision, ApprovalManager, ApprovalRequest, DecisionSource, SessionId, ToolRegistry,
};
pub use context::{ApprovalGate, SharedComponents};
use context::{TurnContext, TurnScratch};
pub use intent::Intent;
use tracing::info;

use crate::{
    error::Result,
    llm::ChatMessage,
    session::{ConversationState, SessionStore},
};

/// Tool turn appended when the user declines a parked call.
pub const CANCELLATION_NOTICE: &str = "User cancelled the operation.";

/// Outcome of a turn or a resume.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnReply {
    /// The assistant's answer, already appended to the conversation.
    Reply(String),
    /// The turn is parked until the user decides on this call.
    ApprovalRequired(ApprovalRequest),
    /// The parked call was declined. Nothing was invoked.
    Cancelled,
}

pub struct Assistant {
    components: Arc<SharedComponents>,
    sessions: Arc<SessionStore>,
}

impl Assistant {
    pub fn new(components: SharedComponents, sessions: SessionStore) -> Self {
        Self {
            components: Arc::new(components),
            sessions: Arc::new(sessions),
        }
    }

    /// Run one turn for a user message.
    ///
    /// The session is locked for the whole turn, so turns of one session never
    /// interleave.
    pub async fn handle_turn(&self, session_id: &SessionId, message: &str) -> Result<TurnReply> {
        let session = self.sessions.session(session_id);
        let mut conversation = session.lock().await;
        conversation.turns.push(ChatMessage::user(message));
        info!(session = %session_id, turns = conversation.turns.len(), "Turn started");

        let mut ctx = TurnContext::new(
            self.components.clone(),
            session_id.clone(),
            &mut *conversation,
        );
        driver::execute(&mut ctx).await
    }

    /// Continue a turn parked on an approval.
    ///
    /// Approve or modify invokes the stored call (with modified arguments when
    /// given), appends the result as a tool turn and answers. Cancel appends the
    /// cancellation notice and invokes nothing. Without a pending approval this
    /// fails with `ApprovalError::NotFound`.
    pub async fn resolve_approval(
        &self,
        session_id: &SessionId,
        decision: ApprovalDecision,
        source: DecisionSource,
    ) -> Result<TurnReply> {
        let session = self.sessions.session(session_id);
        let mut conversation = session.lock().await;

        let pending = self
            .components
            .approvals
            .resolve(session_id, &decision, source)?;
        let mut scratch: TurnScratch = serde_json::from_value(pending.resume)?;
        let request = pending.request;

        let Some(args) = decision.effective_args(&request.arguments) else {
            info!(session = %session_id, tool = %request.tool_name, "Parked call cancelled");
            conversation.turns.push(ChatMessage::tool(CANCELLATION_NOTICE));
            return Ok(TurnReply::Cancelled);
        };

        let result = self
            .components
            .registry
            .invoke(&request.tool_name, &args)
            .await;
        info!(
            session = %session_id,
            tool = %request.tool_name,
            success = result.is_success(),
            "Parked call executed"
        );
        conversation.turns.push(ChatMessage::tool(result.text()));
        scratch.record_tool_result(&request.tool_name, &result);

        let mut ctx = TurnContext::resume(
            self.components.clone(),
            session_id.clone(),
            &mut *conversation,
            scratch,
        );
        driver::execute(&mut ctx).await
    }

    /// Forget the conversation and any parked call.
    pub async fn clear_session(&self, session_id: &SessionId) {
        self.components.approvals.cancel(session_id);
        self.sessions.reset(session_id).await;
        info!(session = %session_id, "Session cleared");
    }

    pub fn pending_approval(&self, session_id: &SessionId) -> Option<ApprovalRequest> {
        self.components.approvals.pending_request(session_id)
    }

    pub async fn conversation(&self, session_id: &SessionId) -> Option<ConversationState> {
        self.sessions.snapshot(session_id).await
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.components.registry
    }

    pub fn approvals(&self) -> &Arc<ApprovalManager> {
        &self.components.approvals
    }

    pub fn components(&self) -> &Arc<SharedComponents> {
        &self.components
    }
}
