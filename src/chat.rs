//! Chat surface on top of the assistant.
//!
//! Message-in, message-out adapter for a bot frontend: an allowlist of user
//! ids, slash commands, quick-action buttons and two-button approval for
//! parked tool calls. The assistant behind it is expected to run with the
//! asynchronous approval gate.

use std::sync::Arc;

use concierge_mcp::{ApprovalDecision, ApprovalError, ApprovalRequest, DecisionSource, SessionId};
use serde_json::Value;
use tracing::{info, warn};

use crate::{
    assistant::{Assistant, TurnReply},
    config::ChatConfig,
    error::AssistantError,
};

const ACCESS_DENIED: &str = "⛔ Access denied.";
const HISTORY_CLEARED: &str = "🗑️ Conversation history has been cleared.";
const OPERATION_CANCELLED: &str = "❌ Operation cancelled.";
const APPROVAL_EXPIRED: &str = "⏰ Approval request has expired.";

/// Error text shown to chat users is cut to this many characters.
const MAX_ERROR_CHARS: usize = 100;

const START_TEXT: &str = "\
👋 Hello! I am AI assistant for your daily tasks.

Send a message or click the buttons below!

Example: 'Tell me about my tomorrow's schedule', 'Find the way from Seoul Station to Gangnam Station'

🔒 Operations that require approval: create/update/delete events.";

const HELP_TEXT: &str = "\
📖 Usage Guide

📅 Calendar
• Tell me about my today's/tomorrow's/this week's schedule
• Add a 'meeting' event for tomorrow at 3pm

🗺️ Maps
• Find restaurants near Gangnam Station
• Find the way from Seoul Station to Gangnam Station using public transportation

⚙️ Commands
/start - Start
/help - Help
/clear - Clear conversation";

/// Reply to an incoming chat message.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResponse {
    Text(String),
    /// Show `text` with approve and cancel buttons.
    Approval {
        text: String,
        request: ApprovalRequest,
    },
}

impl ChatResponse {
    pub fn text(&self) -> &str {
        match self {
            ChatResponse::Text(text) | ChatResponse::Approval { text, .. } => text,
        }
    }
}

/// Button pressed on an approval message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChatAction {
    Approve,
    Cancel,
}

impl ChatAction {
    /// Parse button callback data.
    pub fn from_callback(data: &str) -> Option<Self> {
        match data {
            "approve" => Some(ChatAction::Approve),
            "cancel" => Some(ChatAction::Cancel),
            _ => None,
        }
    }
}

pub struct ChatService {
    assistant: Arc<Assistant>,
    config: ChatConfig,
}

impl ChatService {
    pub fn new(assistant: Arc<Assistant>, config: ChatConfig) -> Self {
        if config.allowed_users.is_empty() {
            warn!("No allowed chat users configured, denying all access");
        }
        Self { assistant, config }
    }

    /// Allowlist check. An empty allowlist denies everyone.
    pub fn is_authorized(&self, user_id: &str) -> bool {
        self.config.allowed_users.iter().any(|id| id == user_id)
    }

    /// Quick-action button labels in display order.
    pub fn keyboard(&self) -> Vec<&str> {
        self.config
            .quick_actions
            .iter()
            .map(|action| action.label.as_str())
            .collect()
    }

    pub async fn handle_message(&self, user_id: &str, text: &str) -> ChatResponse {
        if !self.is_authorized(user_id) {
            warn!(user = %user_id, "Unauthorized chat message");
            return ChatResponse::Text(ACCESS_DENIED.to_string());
        }
        let session_id = SessionId::from(user_id);

        match text.trim() {
            "/start" => return ChatResponse::Text(START_TEXT.to_string()),
            "/help" => return ChatResponse::Text(HELP_TEXT.to_string()),
            "/clear" => {
                self.assistant.clear_session(&session_id).await;
                return ChatResponse::Text(HISTORY_CLEARED.to_string());
            }
            _ => {}
        }

        let request = self.expand_quick_action(text);
        match self.assistant.handle_turn(&session_id, request).await {
            Ok(TurnReply::Reply(answer)) => ChatResponse::Text(answer),
            Ok(TurnReply::ApprovalRequired(request)) => ChatResponse::Approval {
                text: render_approval(&request),
                request,
            },
            Ok(TurnReply::Cancelled) => ChatResponse::Text(OPERATION_CANCELLED.to_string()),
            Err(e) => {
                warn!(user = %user_id, error = %e, "Chat turn failed");
                ChatResponse::Text(format!("❌ An error occurred: {}", truncate(&e.to_string())))
            }
        }
    }

    /// Resolve the user's parked call from a button press.
    pub async fn handle_decision(&self, user_id: &str, action: ChatAction) -> String {
        if !self.is_authorized(user_id) {
            warn!(user = %user_id, "Unauthorized approval decision");
            return ACCESS_DENIED.to_string();
        }
        let session_id = SessionId::from(user_id);
        let decision = match action {
            ChatAction::Approve => ApprovalDecision::approved(),
            ChatAction::Cancel => ApprovalDecision::cancelled(),
        };
        info!(user = %user_id, action = ?action, "Approval decision received");

        match self
            .assistant
            .resolve_approval(&session_id, decision, DecisionSource::Chat)
            .await
        {
            Ok(TurnReply::Reply(answer)) => format!("✅ Completed!\n\n{answer}"),
            Ok(TurnReply::Cancelled) => OPERATION_CANCELLED.to_string(),
            Ok(TurnReply::ApprovalRequired(request)) => render_approval(&request),
            Err(AssistantError::Approval(ApprovalError::NotFound(_))) => {
                APPROVAL_EXPIRED.to_string()
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Approval resume failed");
                format!("❌ Error: {}", truncate(&e.to_string()))
            }
        }
    }

    fn expand_quick_action<'a>(&'a self, text: &'a str) -> &'a str {
        self.config
            .quick_actions
            .iter()
            .find(|action| action.label == text)
            .map_or(text, |action| action.request.as_str())
    }
}

/// Approval prompt text for a parked call.
pub fn render_approval(request: &ApprovalRequest) -> String {
    let display_name = match request.tool_name.as_str() {
        "create_event" => "📅 Create event",
        "update_event" => "✏️ Update event",
        "delete_event" => "🗑️ Delete event",
        other => other,
    };
    let args = request
        .arguments
        .iter()
        .map(|(key, value)| format!("  • {key}: {}", plain(value)))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "🔐 Approval required: {display_name}\n\n\
         Run the following operation?\n\n\
         {args}\n\n\
         Press a button below to approve or cancel."
    )
}

fn plain(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(MAX_ERROR_CHARS).collect()
}
