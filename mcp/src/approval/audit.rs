//! Audit logging for approval decisions.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::session::SessionId;

const DEFAULT_MAX_ENTRIES: usize = 10000;

/// Where a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionSource {
    /// Blocking terminal prompt.
    Terminal,
    /// Asynchronous chat callback.
    Chat,
    /// Made by the process itself (session reset, rejected duplicate).
    System,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DecisionResult {
    Pending,
    Approved,
    Modified,
    Cancelled { reason: String },
    Rejected { reason: String },
}

impl DecisionResult {
    /// Whether the tool was allowed to run.
    pub fn is_approved(&self) -> bool {
        matches!(self, DecisionResult::Approved | DecisionResult::Modified)
    }

    pub fn is_final(&self) -> bool {
        !matches!(self, DecisionResult::Pending)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub session_id: SessionId,
    pub tool_name: String,
    pub result: DecisionResult,
    pub source: DecisionSource,
}

impl AuditEntry {
    pub fn new(
        session_id: SessionId,
        tool_name: String,
        result: DecisionResult,
        source: DecisionSource,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            session_id,
            tool_name,
            result,
            source,
        }
    }
}

/// Bounded, thread-safe audit log. Oldest entries are evicted first.
#[derive(Debug)]
pub struct AuditLog {
    entries: RwLock<VecDeque<AuditEntry>>,
    max_entries: usize,
}

impl Default for AuditLog {
    fn default() -> Self {
        Self::new()
    }
}

impl AuditLog {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_MAX_ENTRIES)
    }

    pub fn with_capacity(max_entries: usize) -> Self {
        Self {
            entries: RwLock::new(VecDeque::with_capacity(max_entries.min(1024))),
            max_entries: max_entries.max(1),
        }
    }

    pub fn record(&self, entry: AuditEntry) {
        let mut entries = self.entries.write();
        if entries.len() >= self.max_entries {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    pub fn record_decision(
        &self,
        session_id: &SessionId,
        tool_name: &str,
        result: DecisionResult,
        source: DecisionSource,
    ) {
        self.record(AuditEntry::new(
            session_id.clone(),
            tool_name.to_string(),
            result,
            source,
        ));
    }

    /// Most recent entries first.
    pub fn recent(&self, limit: usize) -> Vec<AuditEntry> {
        self.entries.read().iter().rev().take(limit).cloned().collect()
    }

    /// Entries for one session, oldest first.
    pub fn for_session(&self, session_id: &SessionId) -> Vec<AuditEntry> {
        self.entries
            .read()
            .iter()
            .filter(|e| &e.session_id == session_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }
}
