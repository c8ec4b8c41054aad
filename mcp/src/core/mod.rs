//! Provider infrastructure: configuration, connections and the registry.

pub mod config;
pub mod connection;
pub mod handler;
pub mod registry;

pub use config::{McpConfig, McpServerConfig, Tool};
pub use connection::{
    ConnectionState, McpProviderConnection, ProviderConnection, ProviderConnector, StdioConnector,
    ToolOutput,
};
pub use handler::ConciergeClientHandler;
pub use registry::{ToolCallResult, ToolRegistry};
