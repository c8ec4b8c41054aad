//! Calendar events from the events tool output.
//!
//! Two shapes are accepted. JSON, either an array of events or an object
//! holding `events`/`items`:
//!
//! ```json
//! [{"summary": "Standup", "start": {"dateTime": "2025-12-15T09:00:00+08:00"}, "location": "Office"}]
//! ```
//!
//! or the bullet text listing:
//!
//! ```text
//! • 2025-12-15T09:00:00+08:00: Standup @ Office
//! • 2025-12-16: Holiday @ No location
//! ```

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;

const NO_LOCATION: &str = "No location";

static ISO_START: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"^(\d{4}-\d{2}-\d{2})(?:[T ](\d{2}:\d{2}))?").ok());

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CalendarEvent {
    pub summary: String,
    /// Start as reported by the provider.
    pub start: String,
    /// `YYYY-MM-DD`, when the start carries a date.
    pub date: Option<String>,
    /// `HH:MM`, absent for all-day events.
    pub time: Option<String>,
    pub location: Option<String>,
}

impl CalendarEvent {
    pub fn new(summary: impl Into<String>, start: impl Into<String>, location: Option<String>) -> Self {
        let start = start.into();
        let (date, time) = split_start(&start);
        Self {
            summary: summary.into(),
            start,
            date,
            time,
            location: location.and_then(clean_location),
        }
    }

    pub fn has_location(&self) -> bool {
        self.location.is_some()
    }
}

fn split_start(start: &str) -> (Option<String>, Option<String>) {
    let Some(caps) = ISO_START.as_ref().and_then(|re| re.captures(start.trim())) else {
        return (None, None);
    };
    (
        caps.get(1).map(|m| m.as_str().to_string()),
        caps.get(2).map(|m| m.as_str().to_string()),
    )
}

fn clean_location(location: String) -> Option<String> {
    let trimmed = location.trim();
    if trimmed.is_empty() || trimmed.eq_ignore_ascii_case(NO_LOCATION) {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Parse the events tool result. Unrecognised text yields no events.
pub fn parse_events(text: &str) -> Vec<CalendarEvent> {
    match serde_json::from_str::<Value>(text.trim()) {
        Ok(value) => parse_json_events(&value),
        Err(_) => text.lines().filter_map(parse_bullet_line).collect(),
    }
}

fn parse_json_events(value: &Value) -> Vec<CalendarEvent> {
    let items = match value {
        Value::Array(items) => items.as_slice(),
        Value::Object(obj) => match obj.get("events").or_else(|| obj.get("items")) {
            Some(Value::Array(items)) => items.as_slice(),
            _ => return Vec::new(),
        },
        _ => return Vec::new(),
    };

    items
        .iter()
        .filter_map(|item| {
            let summary = item
                .get("summary")
                .or_else(|| item.get("title"))
                .and_then(Value::as_str)
                .unwrap_or("No title");
            let start = match item.get("start")? {
                Value::String(s) => s.clone(),
                Value::Object(obj) => obj
                    .get("dateTime")
                    .or_else(|| obj.get("date"))
                    .and_then(Value::as_str)?
                    .to_string(),
                _ => return None,
            };
            let location = item
                .get("location")
                .and_then(Value::as_str)
                .map(str::to_string);
            Some(CalendarEvent::new(summary, start, location))
        })
        .collect()
}

fn parse_bullet_line(line: &str) -> Option<CalendarEvent> {
    let line = line
        .trim()
        .trim_start_matches(['•', '-', '*'])
        .trim_start();
    let (start, rest) = line.split_once(": ")?;
    if !start.starts_with(|c: char| c.is_ascii_digit()) {
        return None;
    }
    let (summary, location) = match rest.rsplit_once(" @ ") {
        Some((summary, location)) => (summary, Some(location.to_string())),
        None => (rest, None),
    };
    Some(CalendarEvent::new(summary.trim(), start.trim(), location))
}
