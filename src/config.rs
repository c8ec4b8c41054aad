//! Application configuration.
//!
//! Loaded from YAML. Every section is optional:
//!
//! ```yaml
//! mcp:
//!   servers:
//!     - name: calendar
//!       command: python
//!       args: ["servers/gcalendar.py"]
//! approval:
//!   mode: synchronous
//!   sensitive_tools: [create_event, update_event, delete_event]
//! llm:
//!   base_url: https://api.openai.com/v1
//!   model: gpt-4o-mini
//! session:
//!   default_origin: Seoul Station
//!   default_mode: transit
//!   buffer_minutes: 10
//! chat:
//!   allowed_users: ["123456"]
//! ```

use std::{fmt, path::Path};

use concierge_mcp::{approval::DEFAULT_SENSITIVE_TOOLS, ApprovalMode, McpConfig, SensitiveToolSet};
use serde::{Deserialize, Serialize};

use crate::{
    error::{AssistantError, Result},
    session::SessionConfig,
};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub mcp: McpConfig,

    #[serde(default)]
    pub approval: ApprovalConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    /// Defaults applied to every new session
    #[serde(default)]
    pub session: SessionConfig,

    /// Tool names each workflow branch calls
    #[serde(default)]
    pub tools: ToolNames,

    #[serde(default)]
    pub chat: ChatConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from a YAML file.
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for server in &self.mcp.servers {
            if server.name.trim().is_empty() {
                return Err(AssistantError::Config(format!(
                    "provider with command '{}' has no name",
                    server.command
                )));
            }
            if server.command.trim().is_empty() {
                return Err(AssistantError::Config(format!(
                    "provider '{}' has no command",
                    server.name
                )));
            }
        }
        if self.llm.model.trim().is_empty() {
            return Err(AssistantError::Config("llm.model is empty".to_string()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApprovalConfig {
    #[serde(default)]
    pub mode: ApprovalMode,

    #[serde(default = "default_sensitive_tools")]
    pub sensitive_tools: Vec<String>,
}

impl ApprovalConfig {
    pub fn sensitive_set(&self) -> SensitiveToolSet {
        SensitiveToolSet::new(self.sensitive_tools.iter().cloned())
    }
}

impl Default for ApprovalConfig {
    fn default() -> Self {
        Self {
            mode: ApprovalMode::default(),
            sensitive_tools: default_sensitive_tools(),
        }
    }
}

fn default_sensitive_tools() -> Vec<String> {
    DEFAULT_SENSITIVE_TOOLS.iter().map(|s| s.to_string()).collect()
}

#[derive(Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Falls back to `OPENAI_API_KEY` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default)]
    pub temperature: f32,
}

impl LlmConfig {
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .filter(|k| !k.is_empty())
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_key: None,
            timeout_secs: default_timeout_secs(),
            temperature: 0.0,
        }
    }
}

impl fmt::Debug for LlmConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LlmConfig")
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("api_key", &self.api_key.as_ref().map(|_| "****"))
            .field("timeout_secs", &self.timeout_secs)
            .field("temperature", &self.temperature)
            .finish()
    }
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

/// Provider tool names used by the workflow branches.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ToolNames {
    #[serde(default = "default_events_tool")]
    pub events: String,
    #[serde(default = "default_create_event_tool")]
    pub create_event: String,
    #[serde(default = "default_search_tool")]
    pub search_places: String,
    #[serde(default = "default_directions_tool")]
    pub directions: String,
}

impl Default for ToolNames {
    fn default() -> Self {
        Self {
            events: default_events_tool(),
            create_event: default_create_event_tool(),
            search_places: default_search_tool(),
            directions: default_directions_tool(),
        }
    }
}

fn default_events_tool() -> String {
    "get_events".to_string()
}

fn default_create_event_tool() -> String {
    "create_event".to_string()
}

fn default_search_tool() -> String {
    "search_places".to_string()
}

fn default_directions_tool() -> String {
    "get_directions".to_string()
}

/// Chat surface settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ChatConfig {
    /// Authorized user ids. Empty denies everyone.
    #[serde(default)]
    pub allowed_users: Vec<String>,

    /// Button label -> request text
    #[serde(default = "default_quick_actions")]
    pub quick_actions: Vec<QuickAction>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            allowed_users: Vec::new(),
            quick_actions: default_quick_actions(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct QuickAction {
    pub label: String,
    pub request: String,
}

impl QuickAction {
    pub fn new(label: impl Into<String>, request: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            request: request.into(),
        }
    }
}

fn default_quick_actions() -> Vec<QuickAction> {
    vec![
        QuickAction::new("📅 Today's schedule", "Tell me about my today's schedule"),
        QuickAction::new("📅 This week's schedule", "Tell me about my this week's schedule"),
        QuickAction::new(
            "➕ Add event",
            "I want to add an event. What information do you need?",
        ),
        QuickAction::new(
            "🗺️ Find directions",
            "I want to find directions. Please tell me the origin and destination.",
        ),
    ]
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_log_level() -> String {
    "warn".to_string()
}
