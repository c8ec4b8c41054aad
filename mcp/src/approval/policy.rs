//! Which tools need a human decision before they run.

use std::collections::BTreeSet;

/// Tools that mutate external state out of the box.
pub const DEFAULT_SENSITIVE_TOOLS: &[&str] = &["create_event", "update_event", "delete_event"];

/// Process-wide set of tool names that always route through the approval gate.
///
/// Checked at invocation time, so a tool added by a provider later is still
/// gated if its name is listed here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensitiveToolSet {
    names: BTreeSet<String>,
}

impl SensitiveToolSet {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn empty() -> Self {
        Self {
            names: BTreeSet::new(),
        }
    }

    pub fn requires_approval(&self, tool_name: &str) -> bool {
        self.names.contains(tool_name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

impl Default for SensitiveToolSet {
    fn default() -> Self {
        Self::new(DEFAULT_SENSITIVE_TOOLS.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_set_covers_event_mutations() {
        let set = SensitiveToolSet::default();
        assert!(set.requires_approval("create_event"));
        assert!(set.requires_approval("update_event"));
        assert!(set.requires_approval("delete_event"));
        assert!(!set.requires_approval("get_events"));
        assert!(!set.requires_approval("get_directions"));
    }

    #[test]
    fn test_custom_set() {
        let set = SensitiveToolSet::new(["send_email"]);
        assert!(set.requires_approval("send_email"));
        assert!(!set.requires_approval("create_event"));
        assert_eq!(set.names().collect::<Vec<_>>(), vec!["send_email"]);
    }
}
