//! Shared fakes for integration tests: a scripted language model and
//! in-memory tool providers.

#![allow(dead_code)]

use std::{collections::VecDeque, sync::Arc};

use async_trait::async_trait;
use concierge::{
    assistant::{ApprovalGate, Assistant, SharedComponents},
    llm::{ChatMessage, LanguageModel, LlmError, Role},
    session::SessionStore,
};
use concierge_mcp::{
    ApprovalDecision, ApprovalPrompter, ArgSchema, ConnectionState, McpError, McpResult,
    McpServerConfig, ProviderConnection, ProviderConnector, ToolArgs, ToolDescriptor, ToolOutput,
    ToolRegistry,
};
use parking_lot::Mutex;
use serde_json::{json, Value};

/// Scripted reply that makes the model call fail.
pub const FAIL: &str = "<fail>";

/// Answers from a queue. Once the queue is empty it echoes the system
/// message, which for response synthesis carries the gathered context.
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    calls: Mutex<Vec<Vec<ChatMessage>>>,
}

impl ScriptedModel {
    pub fn new<I, S>(replies: I) -> Arc<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Arc::new(Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            calls: Mutex::new(Vec::new()),
        })
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    pub fn calls(&self) -> Vec<Vec<ChatMessage>> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.lock().push(messages.to_vec());
        match self.replies.lock().pop_front() {
            Some(reply) if reply == FAIL => Err(LlmError::EmptyResponse),
            Some(reply) => Ok(reply),
            None => Ok(messages
                .iter()
                .find(|m| m.role == Role::System)
                .map(|m| m.content.clone())
                .unwrap_or_default()),
        }
    }
}

pub type Calls = Arc<Mutex<Vec<(String, ToolArgs)>>>;

#[derive(Clone)]
struct ProviderSpec {
    name: String,
    tools: Vec<ToolDescriptor>,
    fail_connect: bool,
}

/// In-memory providers answering tool calls with canned text.
#[derive(Clone, Default)]
pub struct FakeProviders {
    specs: Vec<ProviderSpec>,
    outputs: Vec<(String, ToolOutput)>,
    calls: Calls,
}

impl FakeProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Calendar and maps providers with the standard tool set.
    pub fn standard() -> Self {
        Self::new()
            .provider("calendar", calendar_tools())
            .provider("maps", maps_tools())
    }

    pub fn provider(mut self, name: &str, tools: Vec<ToolDescriptor>) -> Self {
        self.specs.push(ProviderSpec {
            name: name.to_string(),
            tools,
            fail_connect: false,
        });
        self
    }

    pub fn failing(mut self, name: &str, tools: Vec<ToolDescriptor>) -> Self {
        self.specs.push(ProviderSpec {
            name: name.to_string(),
            tools,
            fail_connect: true,
        });
        self
    }

    pub fn respond(mut self, tool: &str, text: &str) -> Self {
        self.outputs.push((tool.to_string(), ToolOutput::text(text)));
        self
    }

    pub fn respond_error(mut self, tool: &str, text: &str) -> Self {
        self.outputs.push((tool.to_string(), ToolOutput::error(text)));
        self
    }

    pub fn calls(&self) -> Calls {
        self.calls.clone()
    }

    pub fn configs(&self) -> Vec<McpServerConfig> {
        self.specs
            .iter()
            .map(|spec| McpServerConfig::stdio(spec.name.clone(), "fake"))
            .collect()
    }

    pub async fn registry(&self) -> Arc<ToolRegistry> {
        let registry = Arc::new(ToolRegistry::with_connector(Arc::new(self.clone())));
        registry.connect_all(&self.configs()).await;
        registry
    }
}

impl ProviderConnector for FakeProviders {
    fn create(&self, config: &McpServerConfig) -> Arc<dyn ProviderConnection> {
        let spec = self
            .specs
            .iter()
            .find(|s| s.name == config.name)
            .cloned()
            .unwrap_or(ProviderSpec {
                name: config.name.clone(),
                tools: Vec::new(),
                fail_connect: true,
            });
        Arc::new(FakeConnection {
            spec,
            outputs: self.outputs.clone(),
            state: Mutex::new(ConnectionState::Disconnected),
            calls: self.calls.clone(),
        })
    }
}

struct FakeConnection {
    spec: ProviderSpec,
    outputs: Vec<(String, ToolOutput)>,
    state: Mutex<ConnectionState>,
    calls: Calls,
}

#[async_trait]
impl ProviderConnection for FakeConnection {
    fn name(&self) -> &str {
        &self.spec.name
    }

    fn state(&self) -> ConnectionState {
        *self.state.lock()
    }

    async fn connect(&self) -> McpResult<()> {
        if self.spec.fail_connect {
            *self.state.lock() = ConnectionState::Failed;
            return Err(McpError::ConnectionFailed(self.spec.name.clone()));
        }
        *self.state.lock() = ConnectionState::Ready;
        Ok(())
    }

    async fn list_capabilities(&self) -> McpResult<Vec<ToolDescriptor>> {
        Ok(self.spec.tools.clone())
    }

    async fn invoke(&self, tool: &str, args: &ToolArgs) -> McpResult<ToolOutput> {
        self.calls.lock().push((tool.to_string(), args.clone()));
        Ok(self
            .outputs
            .iter()
            .find(|(name, _)| name == tool)
            .map(|(_, output)| output.clone())
            .unwrap_or_else(|| ToolOutput::text(format!("{tool} done"))))
    }

    async fn disconnect(&self) -> McpResult<()> {
        *self.state.lock() = ConnectionState::Disconnected;
        Ok(())
    }
}

pub fn tool(name: &str, schema: Value) -> ToolDescriptor {
    let schema = schema.as_object().cloned().unwrap_or_default();
    ToolDescriptor::new(name, format!("{name} tool"), ArgSchema::from_json_schema(&schema))
}

pub fn calendar_tools() -> Vec<ToolDescriptor> {
    vec![
        tool(
            "get_events",
            json!({"properties": {
                "period": {"type": "string"},
                "start_date": {"type": "string"},
                "end_date": {"type": "string"}
            }}),
        ),
        tool(
            "create_event",
            json!({
                "properties": {
                    "title": {"type": "string"},
                    "start": {"type": "string"},
                    "end": {"type": "string"},
                    "location": {"type": "string", "default": ""}
                },
                "required": ["title", "start", "end"]
            }),
        ),
    ]
}

pub fn maps_tools() -> Vec<ToolDescriptor> {
    vec![
        tool(
            "search_places",
            json!({
                "properties": {"query": {"type": "string"}, "location": {"type": "string"}},
                "required": ["query"]
            }),
        ),
        tool(
            "get_directions",
            json!({
                "properties": {
                    "origin": {"type": "string"},
                    "destination": {"type": "string"},
                    "mode": {"type": "string", "default": "driving"}
                },
                "required": ["origin", "destination"]
            }),
        ),
    ]
}

pub async fn assistant(
    model: Arc<ScriptedModel>,
    providers: &FakeProviders,
    gate: ApprovalGate,
) -> Assistant {
    let registry = providers.registry().await;
    let components = SharedComponents::new(model, registry, gate);
    Assistant::new(components, SessionStore::default())
}

/// Prompter with a fixed answer that counts how often it was asked.
pub struct FixedPrompter {
    decision: ApprovalDecision,
    asked: Mutex<usize>,
}

impl FixedPrompter {
    pub fn new(decision: ApprovalDecision) -> Arc<Self> {
        Arc::new(Self {
            decision,
            asked: Mutex::new(0),
        })
    }

    pub fn asked(&self) -> usize {
        *self.asked.lock()
    }
}

impl ApprovalPrompter for FixedPrompter {
    fn decide(&self, _tool_name: &str, _args: &ToolArgs) -> ApprovalDecision {
        *self.asked.lock() += 1;
        self.decision.clone()
    }
}
