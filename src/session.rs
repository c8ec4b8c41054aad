//! Conversation state and the in-memory session store.
//!
//! One [`ConversationState`] per [`SessionId`], each behind its own async
//! mutex. A turn (or an approval resume) holds the lock from start to end, so
//! work on one session is serialized while different sessions run in parallel.

use std::sync::Arc;

use concierge_mcp::SessionId;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use crate::{
    assistant::Intent,
    llm::{ChatMessage, Role},
    parsers::{CalendarEvent, PlaceHit},
};

/// Static per-session preferences.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Where travel estimates start from.
    #[serde(default = "default_origin")]
    pub default_origin: String,
    /// driving, walking, bicycling or transit
    #[serde(default = "default_mode")]
    pub default_mode: String,
    /// Slack added on top of travel time.
    #[serde(default = "default_buffer_minutes")]
    pub buffer_minutes: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_origin: default_origin(),
            default_mode: default_mode(),
            buffer_minutes: default_buffer_minutes(),
        }
    }
}

fn default_origin() -> String {
    "Seoul Station".to_string()
}

fn default_mode() -> String {
    "transit".to_string()
}

fn default_buffer_minutes() -> u32 {
    10
}

/// A structured record gathered by a branch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GatheredItem {
    Event(CalendarEvent),
    Place(PlaceHit),
}

impl GatheredItem {
    pub fn as_event(&self) -> Option<&CalendarEvent> {
        match self {
            GatheredItem::Event(event) => Some(event),
            GatheredItem::Place(_) => None,
        }
    }
}

/// Travel enrichment for one gathered item.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TravelAnnotation {
    /// Index into `gathered_items`.
    pub item_index: usize,
    pub origin: String,
    pub destination: String,
    pub mode: String,
    pub duration_minutes: Option<u32>,
    /// Suggested departure, `HH:MM`.
    pub departure: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationState {
    pub turns: Vec<ChatMessage>,
    pub intent: Intent,
    pub gathered_items: Vec<GatheredItem>,
    pub travel_annotations: Vec<TravelAnnotation>,
    pub session_config: SessionConfig,
}

impl ConversationState {
    pub fn new(session_config: SessionConfig) -> Self {
        Self {
            turns: Vec::new(),
            intent: Intent::General,
            gathered_items: Vec::new(),
            travel_annotations: Vec::new(),
            session_config,
        }
    }

    /// Back to an empty conversation, keeping the preferences.
    pub fn reset(&mut self) {
        *self = Self::new(self.session_config.clone());
    }

    pub fn last_user_message(&self) -> Option<&str> {
        self.turns
            .iter()
            .rev()
            .find(|t| t.role == Role::User)
            .map(|t| t.content.as_str())
    }

    pub fn events(&self) -> impl Iterator<Item = &CalendarEvent> {
        self.gathered_items.iter().filter_map(GatheredItem::as_event)
    }
}

pub struct SessionStore {
    sessions: DashMap<SessionId, Arc<Mutex<ConversationState>>>,
    defaults: SessionConfig,
}

impl SessionStore {
    pub fn new(defaults: SessionConfig) -> Self {
        Self {
            sessions: DashMap::new(),
            defaults,
        }
    }

    /// Session handle, created on first use.
    pub fn session(&self, id: &SessionId) -> Arc<Mutex<ConversationState>> {
        self.sessions
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(ConversationState::new(self.defaults.clone()))))
            .clone()
    }

    pub fn contains(&self, id: &SessionId) -> bool {
        self.sessions.contains_key(id)
    }

    /// Clone of the current state, if the session exists.
    pub async fn snapshot(&self, id: &SessionId) -> Option<ConversationState> {
        let session = self.sessions.get(id).map(|s| s.clone())?;
        let state = session.lock().await;
        Some(state.clone())
    }

    /// Reset the session's conversation.
    pub async fn reset(&self, id: &SessionId) {
        let session = self.session(id);
        session.lock().await.reset();
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(SessionConfig::default())
    }
}
