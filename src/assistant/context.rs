//! Context types for the assistant workflow.
//!
//! Two-level context design:
//! - `SharedComponents`: created once per assistant, `Arc`-cloned into each turn.
//! - `TurnContext`: created fresh per turn (or resume), owned and mutated by steps.

use std::sync::Arc;

use concierge_mcp::{
    ApprovalManager, ApprovalPrompter, SensitiveToolSet, SessionId, ToolCallResult, ToolRegistry,
};
use serde::{Deserialize, Serialize};

use super::{intent::Intent, state::TurnState};
use crate::{config::ToolNames, llm::LanguageModel, parsers::Period, session::ConversationState};

// ============================================================================
// SharedComponents (per-assistant)
// ============================================================================

/// How sensitive calls get their decision.
#[derive(Clone)]
pub enum ApprovalGate {
    /// Block on the prompter (terminal).
    Synchronous(Arc<dyn ApprovalPrompter>),
    /// Park the call and return an approval request (chat).
    Asynchronous,
}

/// Immutable state shared across all turns.
pub struct SharedComponents {
    pub llm: Arc<dyn LanguageModel>,
    pub registry: Arc<ToolRegistry>,
    pub approvals: Arc<ApprovalManager>,
    pub sensitive: SensitiveToolSet,
    pub gate: ApprovalGate,
    /// Tool names each branch calls.
    pub tools: ToolNames,
}

impl SharedComponents {
    pub fn new(llm: Arc<dyn LanguageModel>, registry: Arc<ToolRegistry>, gate: ApprovalGate) -> Self {
        Self {
            llm,
            registry,
            approvals: Arc::new(ApprovalManager::default()),
            sensitive: SensitiveToolSet::default(),
            gate,
            tools: ToolNames::default(),
        }
    }

    #[must_use]
    pub fn with_sensitive(mut self, sensitive: SensitiveToolSet) -> Self {
        self.sensitive = sensitive;
        self
    }

    #[must_use]
    pub fn with_tools(mut self, tools: ToolNames) -> Self {
        self.tools = tools;
        self
    }
}

// ============================================================================
// TurnContext (per-turn)
// ============================================================================

/// Per-turn mutable state passed through the state machine.
pub(crate) struct TurnContext<'a> {
    pub components: Arc<SharedComponents>,
    pub session_id: SessionId,
    /// Persistent conversation, locked for the whole turn.
    pub conversation: &'a mut ConversationState,
    /// Current position in the state machine.
    pub state: TurnState,
    /// Branch data for `GenerateResponse`. Also the resume snapshot.
    pub scratch: TurnScratch,
}

impl<'a> TurnContext<'a> {
    /// Fresh turn in the `ClassifyIntent` state.
    pub fn new(
        components: Arc<SharedComponents>,
        session_id: SessionId,
        conversation: &'a mut ConversationState,
    ) -> Self {
        Self {
            components,
            session_id,
            conversation,
            state: TurnState::ClassifyIntent,
            scratch: TurnScratch::default(),
        }
    }

    /// Resumed turn that goes straight to response synthesis.
    ///
    /// The conversation's intent is restored from the snapshot, since turns
    /// sent while the call was parked overwrite it.
    pub fn resume(
        components: Arc<SharedComponents>,
        session_id: SessionId,
        conversation: &'a mut ConversationState,
        scratch: TurnScratch,
    ) -> Self {
        conversation.intent = scratch.intent;
        Self {
            components,
            session_id,
            conversation,
            state: TurnState::GenerateResponse,
            scratch,
        }
    }
}

/// Event fields extracted from the user's request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct EventDraft {
    pub title: String,
    /// `YYYY-MM-DDTHH:MM:SS`
    pub start: String,
    pub end: String,
    pub location: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct RouteRequest {
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub duration_minutes: Option<u32>,
}

/// Data gathered by branch steps and read by `GenerateResponse`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct TurnScratch {
    /// Branch this turn took. Survives later turns while a call is parked.
    pub intent: Intent,
    pub period: Option<Period>,
    pub event_draft: Option<EventDraft>,
    pub search_query: Option<String>,
    pub route: Option<RouteRequest>,
    /// Text of the branch's main tool call, when it succeeded.
    pub tool_output: Option<String>,
    /// The user declined the sensitive call.
    pub cancelled: bool,
    /// Failures described to the user instead of aborting the turn.
    pub errors: Vec<String>,
}

impl TurnScratch {
    pub fn record_tool_result(&mut self, tool: &str, result: &ToolCallResult) {
        match result {
            ToolCallResult::Success(text) => self.tool_output = Some(text.clone()),
            other => self.errors.push(format!("{tool} failed: {other}")),
        }
    }
}
