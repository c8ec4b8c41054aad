//! Tool registry multiplexing several providers behind one namespace.
//!
//! ```text
//! ToolRegistry
//!   ├─ connections: provider name -> ProviderConnection
//!   └─ inventory:   tool name -> (descriptor, provider name)
//! ```
//!
//! Providers that fail to start are logged and skipped. Invocations never
//! return errors: unknown tools and provider failures are typed results so
//! callers can describe them to the user.

use std::{fmt, sync::Arc};

use dashmap::DashMap;
use futures::future::join_all;
use tracing::{debug, info, warn};

use super::{
    config::McpServerConfig,
    connection::{ConnectionState, ProviderConnection, ProviderConnector, StdioConnector},
};
use crate::{
    error::McpError,
    inventory::{ToolArgs, ToolEntry, ToolInventory},
};

/// Outcome of a registry invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToolCallResult {
    /// Provider answered; text returned verbatim.
    Success(String),
    /// No provider owns a tool with this name.
    NotFound(String),
    /// Argument validation, transport or provider-side failure.
    Failed(String),
}

impl ToolCallResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ToolCallResult::Success(_))
    }

    /// Text to show the language model or the user.
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ToolCallResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ToolCallResult::Success(text) => f.write_str(text),
            ToolCallResult::NotFound(name) => write!(f, "Tool not found: {}", name),
            ToolCallResult::Failed(msg) => write!(f, "Error: {}", msg),
        }
    }
}

pub struct ToolRegistry {
    connector: Arc<dyn ProviderConnector>,
    connections: DashMap<String, Arc<dyn ProviderConnection>>,
    inventory: ToolInventory,
}

impl ToolRegistry {
    /// Registry spawning stdio MCP providers.
    pub fn new() -> Self {
        Self::with_connector(Arc::new(StdioConnector))
    }

    pub fn with_connector(connector: Arc<dyn ProviderConnector>) -> Self {
        Self {
            connector,
            connections: DashMap::new(),
            inventory: ToolInventory::new(),
        }
    }

    /// Connect every provider concurrently and merge the ready catalogs.
    ///
    /// Catalogs merge in configuration order, so later providers override
    /// same-named tools of earlier ones. Returns the number of ready providers.
    pub async fn connect_all(&self, configs: &[McpServerConfig]) -> usize {
        let connections: Vec<Arc<dyn ProviderConnection>> =
            configs.iter().map(|c| self.connector.create(c)).collect();

        let results = join_all(connections.iter().map(|conn| async move {
            conn.connect().await?;
            conn.list_capabilities().await
        }))
        .await;

        let mut ready = 0;
        for (conn, result) in connections.into_iter().zip(results) {
            let name = conn.name().to_string();
            match result {
                Ok(tools) => {
                    info!(provider = %name, tools = tools.len(), "Discovered tools");
                    for descriptor in tools {
                        self.inventory.insert(&name, descriptor);
                    }
                    if let Some(previous) = self.connections.insert(name.clone(), conn) {
                        warn!(provider = %name, "Duplicate provider name, replacing connection");
                        if let Err(e) = previous.disconnect().await {
                            warn!(provider = %name, error = %e, "Failed to close replaced provider");
                        }
                    }
                    ready += 1;
                }
                Err(e) => {
                    warn!(provider = %name, error = %e, "Failed to connect provider, skipping");
                    if conn.state() != ConnectionState::Failed {
                        if let Err(e) = conn.disconnect().await {
                            warn!(
                                provider = %name,
                                error = %e,
                                "Failed to close unusable provider"
                            );
                        }
                    }
                }
            }
        }

        info!(
            ready,
            configured = configs.len(),
            tools = self.inventory.len(),
            "Tool registry connected"
        );
        ready
    }

    /// Invoke a tool by name on whichever provider owns it.
    pub async fn invoke(&self, name: &str, args: &ToolArgs) -> ToolCallResult {
        let Some(entry) = self.inventory.get(name) else {
            warn!(tool = %name, "Tool not found");
            return ToolCallResult::NotFound(name.to_string());
        };

        let Some(conn) = self.connections.get(&entry.provider).map(|c| c.clone()) else {
            return ToolCallResult::Failed(
                McpError::ServerNotFound(entry.provider.clone()).to_string(),
            );
        };

        let args = match entry.descriptor.schema.build(args.as_map()) {
            Ok(args) => args,
            Err(e) => {
                warn!(tool = %name, error = %e, "Rejected tool arguments");
                return ToolCallResult::Failed(e.to_string());
            }
        };

        debug!(tool = %name, provider = %entry.provider, args = %args, "Invoking tool");
        match conn.invoke(name, &args).await {
            Ok(output) if output.is_error => {
                warn!(tool = %name, provider = %entry.provider, "Provider reported tool error");
                ToolCallResult::Failed(output.text)
            }
            Ok(output) => ToolCallResult::Success(output.text),
            Err(e) => {
                warn!(tool = %name, provider = %entry.provider, error = %e, "Tool call failed");
                ToolCallResult::Failed(e.to_string())
            }
        }
    }

    /// Disconnect every provider. A failure never stops the others.
    pub async fn disconnect_all(&self) {
        let connections: Vec<Arc<dyn ProviderConnection>> =
            self.connections.iter().map(|c| c.value().clone()).collect();

        let results = join_all(connections.iter().map(|conn| conn.disconnect())).await;
        for (conn, result) in connections.iter().zip(results) {
            if let Err(e) = result {
                warn!(provider = %conn.name(), error = %e, "Failed to disconnect provider");
            }
        }

        self.connections.clear();
        self.inventory.clear();
    }

    pub fn list_tools(&self) -> Vec<ToolEntry> {
        self.inventory.list()
    }

    pub fn get_tool(&self, name: &str) -> Option<ToolEntry> {
        self.inventory.get(name)
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.inventory.has_tool(name)
    }

    pub fn provider_for(&self, name: &str) -> Option<String> {
        self.inventory.provider_for(name)
    }

    pub fn provider_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.connections.iter().map(|c| c.key().clone()).collect();
        names.sort();
        names
    }

    pub fn tool_count(&self) -> usize {
        self.inventory.len()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use async_trait::async_trait;
    use parking_lot::Mutex;
    use serde_json::json;

    use super::*;
    use crate::{
        core::connection::ToolOutput,
        error::McpResult,
        inventory::{ArgSchema, ToolDescriptor},
    };

    struct FakeConnection {
        name: String,
        tools: Vec<ToolDescriptor>,
        fail_connect: bool,
        fail_list: bool,
        fail_disconnect: bool,
        state: Mutex<ConnectionState>,
        calls: Arc<Mutex<Vec<(String, String, ToolArgs)>>>,
        disconnects: Arc<Mutex<Vec<String>>>,
    }

    #[async_trait]
    impl ProviderConnection for FakeConnection {
        fn name(&self) -> &str {
            &self.name
        }

        fn state(&self) -> ConnectionState {
            *self.state.lock()
        }

        async fn connect(&self) -> McpResult<()> {
            if self.fail_connect {
                *self.state.lock() = ConnectionState::Failed;
                return Err(McpError::ConnectionFailed(self.name.clone()));
            }
            *self.state.lock() = ConnectionState::Ready;
            Ok(())
        }

        async fn list_capabilities(&self) -> McpResult<Vec<ToolDescriptor>> {
            if self.fail_list {
                return Err(McpError::Transport("tools/list timed out".to_string()));
            }
            Ok(self.tools.clone())
        }

        async fn invoke(&self, tool: &str, args: &ToolArgs) -> McpResult<ToolOutput> {
            self.calls
                .lock()
                .push((self.name.clone(), tool.to_string(), args.clone()));
            if tool == "explode" {
                return Err(McpError::ToolExecution("boom".to_string()));
            }
            Ok(ToolOutput::text(format!("{} from {}", tool, self.name)))
        }

        async fn disconnect(&self) -> McpResult<()> {
            self.disconnects.lock().push(self.name.clone());
            *self.state.lock() = ConnectionState::Disconnected;
            if self.fail_disconnect {
                return Err(McpError::Transport("stuck".to_string()));
            }
            Ok(())
        }
    }

    #[derive(Default)]
    struct FakeConnector {
        catalogs: HashMap<String, Vec<ToolDescriptor>>,
        failing: Vec<String>,
        unlisted: Vec<String>,
        stuck: Vec<String>,
        calls: Arc<Mutex<Vec<(String, String, ToolArgs)>>>,
        disconnects: Arc<Mutex<Vec<String>>>,
    }

    impl FakeConnector {
        fn provider(mut self, name: &str, tools: &[&str]) -> Self {
            let descriptors = tools
                .iter()
                .map(|t| ToolDescriptor::new(*t, format!("{t} on {name}"), ArgSchema::default()))
                .collect();
            self.catalogs.insert(name.to_string(), descriptors);
            self
        }

        fn with_tool(mut self, provider: &str, descriptor: ToolDescriptor) -> Self {
            self.catalogs
                .entry(provider.to_string())
                .or_default()
                .push(descriptor);
            self
        }
    }

    impl ProviderConnector for FakeConnector {
        fn create(&self, config: &McpServerConfig) -> Arc<dyn ProviderConnection> {
            Arc::new(FakeConnection {
                name: config.name.clone(),
                tools: self.catalogs.get(&config.name).cloned().unwrap_or_default(),
                fail_connect: self.failing.contains(&config.name),
                fail_list: self.unlisted.contains(&config.name),
                fail_disconnect: self.stuck.contains(&config.name),
                state: Mutex::new(ConnectionState::Disconnected),
                calls: self.calls.clone(),
                disconnects: self.disconnects.clone(),
            })
        }
    }

    fn configs(names: &[&str]) -> Vec<McpServerConfig> {
        names
            .iter()
            .map(|n| McpServerConfig::stdio(*n, "unused"))
            .collect()
    }

    #[tokio::test]
    async fn test_failed_providers_are_skipped() {
        let mut connector = FakeConnector::default()
            .provider("calendar", &["get_events", "create_event"])
            .provider("maps", &["search_places", "get_directions"])
            .provider("mail", &["send_email"]);
        connector.failing.push("maps".to_string());

        let registry = ToolRegistry::with_connector(Arc::new(connector));
        let ready = registry.connect_all(&configs(&["calendar", "maps", "mail"])).await;

        assert_eq!(ready, 2);
        assert_eq!(registry.tool_count(), 3);
        assert!(registry.has_tool("send_email"));
        assert!(!registry.has_tool("get_directions"));
        assert_eq!(registry.provider_names(), vec!["calendar", "mail"]);
    }

    #[tokio::test]
    async fn test_all_providers_failing_is_not_an_error() {
        let mut connector = FakeConnector::default().provider("calendar", &["get_events"]);
        connector.failing.push("calendar".to_string());

        let registry = ToolRegistry::with_connector(Arc::new(connector));
        assert_eq!(registry.connect_all(&configs(&["calendar"])).await, 0);
        assert_eq!(registry.tool_count(), 0);
    }

    #[tokio::test]
    async fn test_unlistable_provider_is_closed_even_if_teardown_fails() {
        let mut connector = FakeConnector::default()
            .provider("calendar", &["get_events"])
            .provider("maps", &["get_directions"]);
        connector.unlisted.push("maps".to_string());
        connector.stuck.push("maps".to_string());
        let disconnects = connector.disconnects.clone();

        let registry = ToolRegistry::with_connector(Arc::new(connector));
        let ready = registry.connect_all(&configs(&["calendar", "maps"])).await;

        assert_eq!(ready, 1);
        assert_eq!(*disconnects.lock(), vec!["maps".to_string()]);
        assert!(!registry.has_tool("get_directions"));
        assert_eq!(registry.provider_names(), vec!["calendar"]);
    }

    #[tokio::test]
    async fn test_later_provider_wins_collision() {
        let connector = FakeConnector::default()
            .provider("first", &["search"])
            .provider("second", &["search"]);
        let registry = ToolRegistry::with_connector(Arc::new(connector));
        registry.connect_all(&configs(&["first", "second"])).await;

        assert_eq!(registry.provider_for("search").as_deref(), Some("second"));
        assert_eq!(
            registry.invoke("search", &ToolArgs::new()).await,
            ToolCallResult::Success("search from second".to_string())
        );
    }

    #[tokio::test]
    async fn test_unknown_tool_is_typed_result() {
        let registry = ToolRegistry::with_connector(Arc::new(FakeConnector::default()));
        let result = registry.invoke("teleport", &ToolArgs::new()).await;
        assert_eq!(result, ToolCallResult::NotFound("teleport".to_string()));
        assert_eq!(result.text(), "Tool not found: teleport");
    }

    #[tokio::test]
    async fn test_provider_error_becomes_failed() {
        let connector = FakeConnector::default().provider("calendar", &["explode"]);
        let registry = ToolRegistry::with_connector(Arc::new(connector));
        registry.connect_all(&configs(&["calendar"])).await;

        let result = registry.invoke("explode", &ToolArgs::new()).await;
        assert!(matches!(result, ToolCallResult::Failed(msg) if msg.contains("boom")));
    }

    #[tokio::test]
    async fn test_arguments_are_validated_before_forwarding() {
        let schema = ArgSchema::from_json_schema(
            json!({
                "properties": {"query": {"type": "string"}, "limit": {"type": "integer"}},
                "required": ["query"]
            })
            .as_object()
            .unwrap(),
        );
        let connector = FakeConnector::default().with_tool(
            "maps",
            ToolDescriptor::new("search_places", "Search places", schema),
        );
        let calls = connector.calls.clone();
        let registry = ToolRegistry::with_connector(Arc::new(connector));
        registry.connect_all(&configs(&["maps"])).await;

        let missing = registry.invoke("search_places", &ToolArgs::new()).await;
        assert!(matches!(missing, ToolCallResult::Failed(_)));
        assert!(calls.lock().is_empty());

        let args = ToolArgs::new().with("query", "cafe").with("limit", "3");
        assert!(registry.invoke("search_places", &args).await.is_success());
        let recorded = calls.lock();
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].2.get("limit"), Some(&json!(3)));
    }

    #[tokio::test]
    async fn test_disconnect_all_continues_after_failure() {
        let mut connector = FakeConnector::default()
            .provider("calendar", &["get_events"])
            .provider("maps", &["get_directions"]);
        connector.stuck.push("calendar".to_string());
        let registry = ToolRegistry::with_connector(Arc::new(connector));
        registry.connect_all(&configs(&["calendar", "maps"])).await;

        registry.disconnect_all().await;
        assert_eq!(registry.tool_count(), 0);
        assert!(registry.provider_names().is_empty());
    }
}
