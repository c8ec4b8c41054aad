//! Provider configuration types.
//!
//! Each provider is a child process speaking MCP over stdio.

use std::{collections::HashMap, fmt};

pub use rmcp::model::Tool;
use serde::{Deserialize, Serialize};

use crate::error::McpResult;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct McpConfig {
    /// Providers, in registration order. Later providers win name collisions.
    #[serde(default)]
    pub servers: Vec<McpServerConfig>,
}

#[derive(Clone, Deserialize, Serialize)]
pub struct McpServerConfig {
    pub name: String,
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    /// Extra environment for the child process (API keys, credentials paths)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub envs: HashMap<String, String>,
}

impl McpServerConfig {
    pub fn stdio(name: impl Into<String>, command: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            command: command.into(),
            args: Vec::new(),
            envs: HashMap::new(),
        }
    }

    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.envs.insert(key.into(), value.into());
        self
    }
}

impl fmt::Debug for McpServerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let env_keys: Vec<&String> = self.envs.keys().collect();
        f.debug_struct("McpServerConfig")
            .field("name", &self.name)
            .field("command", &self.command)
            .field("args", &self.args)
            .field("envs", &env_keys)
            .finish()
    }
}

impl McpConfig {
    pub fn from_yaml(content: &str) -> McpResult<Self> {
        Ok(serde_yaml::from_str(content)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_stdio_servers() {
        let yaml = r#"
servers:
  - name: calendar
    command: python
    args: ["servers/gcalendar.py"]
  - name: maps
    command: python
    args: ["servers/maps.py"]
    envs:
      GOOGLE_MAPS_API_KEY: secret
"#;
        let config = McpConfig::from_yaml(yaml).unwrap();
        assert_eq!(config.servers.len(), 2);
        assert_eq!(config.servers[0].name, "calendar");
        assert_eq!(config.servers[0].args, vec!["servers/gcalendar.py"]);
        assert!(config.servers[0].envs.is_empty());
        assert_eq!(
            config.servers[1].envs.get("GOOGLE_MAPS_API_KEY").map(String::as_str),
            Some("secret")
        );
    }

    #[test]
    fn test_empty_config() {
        let config = McpConfig::from_yaml("{}").unwrap();
        assert!(config.servers.is_empty());
    }

    #[test]
    fn test_debug_hides_env_values() {
        let server = McpServerConfig::stdio("maps", "python").with_env("API_KEY", "hunter2");
        let debug = format!("{server:?}");
        assert!(debug.contains("API_KEY"));
        assert!(!debug.contains("hunter2"));
    }
}
