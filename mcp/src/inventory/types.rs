//! Core types for the tool inventory.

use serde::{Deserialize, Serialize};

use super::schema::ArgSchema;
use crate::core::config::Tool;

/// A callable operation advertised by a provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub schema: ArgSchema,
}

impl ToolDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>, schema: ArgSchema) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            schema,
        }
    }
}

impl From<&Tool> for ToolDescriptor {
    fn from(tool: &Tool) -> Self {
        Self {
            name: tool.name.to_string(),
            description: tool
                .description
                .as_deref()
                .map(str::to_string)
                .unwrap_or_default(),
            schema: ArgSchema::from_json_schema(&tool.input_schema),
        }
    }
}

/// Tool descriptor plus the provider currently owning it.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolEntry {
    pub descriptor: ToolDescriptor,
    pub provider: String,
}

impl ToolEntry {
    pub fn new(provider: impl Into<String>, descriptor: ToolDescriptor) -> Self {
        Self {
            descriptor,
            provider: provider.into(),
        }
    }

    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    pub fn provider(&self) -> &str {
        &self.provider
    }
}
