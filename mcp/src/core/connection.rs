//! Lifecycle of one RPC session to one tool-provider process.
//!
//! ```text
//! disconnected -> connecting -> ready -> disconnecting -> disconnected
//!                      |
//!                      +-> failed (terminal)
//! ```
//!
//! Capability listing and invocation are only valid in `ready`.

use std::{borrow::Cow, fmt, sync::Arc};

use async_trait::async_trait;
use parking_lot::RwLock;
use rmcp::{
    model::{CallToolRequestParam, CallToolResult, RawContent},
    service::{Peer, RunningService},
    RoleClient,
};
use tracing::{debug, info, warn};

use super::{config::McpServerConfig, handler::ConciergeClientHandler};
use crate::{
    error::{McpError, McpResult},
    inventory::{ToolArgs, ToolDescriptor},
};

type McpClient = RunningService<RoleClient, ConciergeClientHandler>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    Disconnected,
    Connecting,
    Ready,
    Disconnecting,
    Failed,
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ConnectionState::Disconnected => "disconnected",
            ConnectionState::Connecting => "connecting",
            ConnectionState::Ready => "ready",
            ConnectionState::Disconnecting => "disconnecting",
            ConnectionState::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// Raw provider answer to one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolOutput {
    pub text: String,
    /// Provider flagged the result as an error.
    pub is_error: bool,
}

impl ToolOutput {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            is_error: true,
        }
    }

    fn from_call_result(result: CallToolResult) -> Self {
        let text = result
            .content
            .iter()
            .map(|c| match &c.raw {
                RawContent::Text(t) => t.text.clone(),
                other => serde_json::to_string(other).unwrap_or_default(),
            })
            .collect::<Vec<_>>()
            .join("\n");
        Self {
            text,
            is_error: result.is_error.unwrap_or(false),
        }
    }
}

/// One provider session, owned by exactly one registry.
#[async_trait]
pub trait ProviderConnection: Send + Sync {
    fn name(&self) -> &str;

    fn state(&self) -> ConnectionState;

    /// Start the provider and complete the protocol handshake.
    async fn connect(&self) -> McpResult<()>;

    async fn list_capabilities(&self) -> McpResult<Vec<ToolDescriptor>>;

    async fn invoke(&self, tool: &str, args: &ToolArgs) -> McpResult<ToolOutput>;

    /// Tear the session down. Idempotent, and safe when `connect` never succeeded.
    async fn disconnect(&self) -> McpResult<()>;
}

/// Creates connections from configuration.
pub trait ProviderConnector: Send + Sync {
    fn create(&self, config: &McpServerConfig) -> Arc<dyn ProviderConnection>;
}

/// Spawns providers as child processes speaking MCP over stdio.
#[derive(Debug, Clone, Copy, Default)]
pub struct StdioConnector;

impl ProviderConnector for StdioConnector {
    fn create(&self, config: &McpServerConfig) -> Arc<dyn ProviderConnection> {
        Arc::new(McpProviderConnection::new(config.clone()))
    }
}

pub struct McpProviderConnection {
    config: McpServerConfig,
    state: RwLock<ConnectionState>,
    /// Cloneable request handle so invocations run concurrently.
    peer: RwLock<Option<Peer<RoleClient>>>,
    /// Owns the child process and session task.
    client: tokio::sync::Mutex<Option<McpClient>>,
}

impl McpProviderConnection {
    pub fn new(config: McpServerConfig) -> Self {
        Self {
            config,
            state: RwLock::new(ConnectionState::Disconnected),
            peer: RwLock::new(None),
            client: tokio::sync::Mutex::new(None),
        }
    }

    fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }

    fn ready_peer(&self) -> McpResult<Peer<RoleClient>> {
        let state = self.state();
        if state != ConnectionState::Ready {
            return Err(self.invalid_state(state, ConnectionState::Ready));
        }
        self.peer
            .read()
            .clone()
            .ok_or_else(|| McpError::ServerDisconnected(self.config.name.clone()))
    }

    fn invalid_state(&self, state: ConnectionState, expected: ConnectionState) -> McpError {
        McpError::InvalidState {
            provider: self.config.name.clone(),
            state: state.to_string(),
            expected: expected.to_string(),
        }
    }

    async fn spawn(&self) -> McpResult<McpClient> {
        use rmcp::{
            transport::{ConfigureCommandExt, TokioChildProcess},
            ServiceExt,
        };

        let McpServerConfig {
            command,
            args,
            envs,
            ..
        } = &self.config;

        let transport = TokioChildProcess::new(tokio::process::Command::new(command).configure(
            |cmd| {
                cmd.args(args)
                    .envs(envs.iter())
                    .stderr(std::process::Stdio::inherit());
            },
        ))
        .map_err(|e| McpError::Transport(format!("create stdio transport: {}", e)))?;

        ConciergeClientHandler::new()
            .serve(transport)
            .await
            .map_err(|e| McpError::ConnectionFailed(format!("initialize stdio client: {}", e)))
    }
}

#[async_trait]
impl ProviderConnection for McpProviderConnection {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    async fn connect(&self) -> McpResult<()> {
        {
            let mut state = self.state.write();
            match *state {
                ConnectionState::Ready => return Ok(()),
                ConnectionState::Disconnected => *state = ConnectionState::Connecting,
                other => return Err(self.invalid_state(other, ConnectionState::Disconnected)),
            }
        }

        debug!(provider = %self.config.name, command = %self.config.command, "Starting provider");
        match self.spawn().await {
            Ok(client) => {
                *self.peer.write() = Some(client.peer().clone());
                *self.client.lock().await = Some(client);
                self.set_state(ConnectionState::Ready);
                info!(provider = %self.config.name, "Provider ready");
                Ok(())
            }
            Err(e) => {
                self.set_state(ConnectionState::Failed);
                Err(e)
            }
        }
    }

    async fn list_capabilities(&self) -> McpResult<Vec<ToolDescriptor>> {
        let peer = self.ready_peer()?;
        let tools = peer
            .list_all_tools()
            .await
            .map_err(|e| McpError::Transport(format!("list tools: {}", e)))?;
        Ok(tools.iter().map(ToolDescriptor::from).collect())
    }

    async fn invoke(&self, tool: &str, args: &ToolArgs) -> McpResult<ToolOutput> {
        let peer = self.ready_peer()?;
        let request = CallToolRequestParam {
            name: Cow::Owned(tool.to_string()),
            arguments: Some(args.as_map().clone()),
        };
        let result = peer
            .call_tool(request)
            .await
            .map_err(|e| McpError::ToolExecution(format!("MCP call failed: {}", e)))?;
        Ok(ToolOutput::from_call_result(result))
    }

    async fn disconnect(&self) -> McpResult<()> {
        {
            let mut state = self.state.write();
            match *state {
                ConnectionState::Disconnected | ConnectionState::Failed => return Ok(()),
                _ => *state = ConnectionState::Disconnecting,
            }
        }

        self.peer.write().take();
        let client = self.client.lock().await.take();
        self.set_state(ConnectionState::Disconnected);

        if let Some(client) = client {
            if let Err(e) = client.cancel().await {
                warn!(provider = %self.config.name, error = %e, "Error closing provider session");
                return Err(McpError::Transport(format!("close session: {}", e)));
            }
        }
        info!(provider = %self.config.name, "Provider disconnected");
        Ok(())
    }
}
