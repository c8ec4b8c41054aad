//! Flat tool namespace across all ready providers.
//!
//! Names are unique. When two providers declare the same name the later
//! registration replaces the earlier one and a collision warning is logged.

use std::collections::HashSet;

use dashmap::DashMap;
use tracing::warn;

use super::types::{ToolDescriptor, ToolEntry};

pub struct ToolInventory {
    tools: DashMap<String, ToolEntry>,
    tools_by_provider: DashMap<String, HashSet<String>>,
}

impl ToolInventory {
    pub fn new() -> Self {
        Self {
            tools: DashMap::new(),
            tools_by_provider: DashMap::new(),
        }
    }
}

impl Default for ToolInventory {
    fn default() -> Self {
        Self::new()
    }
}

impl ToolInventory {
    /// Register a descriptor for a provider. Last registration wins.
    pub fn insert(&self, provider: &str, descriptor: ToolDescriptor) {
        let name = descriptor.name.clone();
        let entry = ToolEntry::new(provider, descriptor);

        if let Some(previous) = self.tools.insert(name.clone(), entry) {
            if previous.provider != provider {
                warn!(
                    tool = %name,
                    previous = %previous.provider,
                    current = %provider,
                    "Tool name collision, later provider wins"
                );
                if let Some(mut names) = self.tools_by_provider.get_mut(&previous.provider) {
                    names.remove(&name);
                }
            }
        }

        self.tools_by_provider
            .entry(provider.to_string())
            .or_default()
            .insert(name);
    }

    pub fn get(&self, name: &str) -> Option<ToolEntry> {
        self.tools.get(name).map(|e| e.clone())
    }

    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    pub fn provider_for(&self, name: &str) -> Option<String> {
        self.tools.get(name).map(|e| e.provider.clone())
    }

    /// All entries sorted by tool name.
    pub fn list(&self) -> Vec<ToolEntry> {
        let mut entries: Vec<ToolEntry> = self.tools.iter().map(|e| e.value().clone()).collect();
        entries.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
        entries
    }

    /// Tool names currently owned by a provider.
    pub fn tools_of(&self, provider: &str) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools_by_provider
            .get(provider)
            .map(|names| names.iter().cloned().collect())
            .unwrap_or_default();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn clear(&self) {
        self.tools.clear();
        self.tools_by_provider.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::ArgSchema;

    fn descriptor(name: &str, description: &str) -> ToolDescriptor {
        ToolDescriptor::new(name, description, ArgSchema::default())
    }

    #[test]
    fn test_insert_and_get() {
        let inventory = ToolInventory::new();
        inventory.insert("calendar", descriptor("get_events", "List events"));

        assert!(inventory.has_tool("get_events"));
        assert_eq!(inventory.provider_for("get_events").as_deref(), Some("calendar"));
        assert_eq!(inventory.len(), 1);
    }

    #[test]
    fn test_last_registration_wins() {
        let inventory = ToolInventory::new();
        inventory.insert("calendar", descriptor("search", "calendar search"));
        inventory.insert("maps", descriptor("search", "maps search"));

        let entry = inventory.get("search").unwrap();
        assert_eq!(entry.provider(), "maps");
        assert_eq!(entry.descriptor.description, "maps search");
        assert_eq!(inventory.len(), 1);
        assert!(inventory.tools_of("calendar").is_empty());
        assert_eq!(inventory.tools_of("maps"), vec!["search".to_string()]);
    }

    #[test]
    fn test_list_is_sorted() {
        let inventory = ToolInventory::new();
        inventory.insert("maps", descriptor("search_places", ""));
        inventory.insert("calendar", descriptor("create_event", ""));

        let names: Vec<_> = inventory.list().into_iter().map(|e| e.descriptor.name).collect();
        assert_eq!(names, ["create_event", "search_places"]);
    }

    #[test]
    fn test_clear() {
        let inventory = ToolInventory::new();
        inventory.insert("maps", descriptor("get_directions", ""));
        inventory.clear();
        assert!(inventory.is_empty());
        assert!(inventory.tools_of("maps").is_empty());
    }
}
