//! ExtractEventInfo step.
//!
//! Transition: ExtractEventInfo → ExecuteCreateEvent (draft complete)
//!                              | GenerateResponse (extraction failed)

use chrono::{Duration, Local, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};
use tracing::{info, warn};

use super::{ask, json_object, string_field};
use crate::{
    assistant::{
        context::{EventDraft, TurnContext},
        prompts,
        state::{StepResult, TurnState},
    },
    error::Result,
};

/// Length given to events without an end time.
const DEFAULT_EVENT_MINUTES: i64 = 60;

/// Pull the event fields out of the user's request.
///
/// ## Reads
/// - `ctx.conversation.turns`: the latest user message.
///
/// ## Writes
/// - `ctx.scratch.event_draft` on success, `ctx.scratch.errors` otherwise.
/// - `ctx.state`
pub(crate) async fn extract_event_info(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let answer = match ask(ctx, &prompts::extract_event(Local::now())).await {
        Ok(answer) => answer,
        Err(e) => {
            warn!(session = %ctx.session_id, error = %e, "Event extraction failed");
            ctx.scratch
                .errors
                .push("could not read the event details".to_string());
            ctx.state = TurnState::GenerateResponse;
            return Ok(StepResult::Continue);
        }
    };

    let draft = json_object(&answer)
        .ok_or_else(|| "could not read the event details".to_string())
        .and_then(|fields| event_draft(&fields));

    match draft {
        Ok(draft) => {
            info!(session = %ctx.session_id, title = %draft.title, start = %draft.start, "Extracted event");
            ctx.scratch.event_draft = Some(draft);
            ctx.state = TurnState::ExecuteCreateEvent;
        }
        Err(reason) => {
            warn!(session = %ctx.session_id, reason = %reason, "Incomplete event");
            ctx.scratch.errors.push(reason);
            ctx.state = TurnState::GenerateResponse;
        }
    }
    Ok(StepResult::Continue)
}

fn event_draft(fields: &Map<String, Value>) -> Result<EventDraft, String> {
    let title = string_field(fields, "title").ok_or("no event title")?;
    let date = string_field(fields, "date").ok_or("no date")?;
    let date = NaiveDate::parse_from_str(&date, "%Y-%m-%d")
        .map_err(|_| format!("unrecognised date '{date}'"))?;
    let start_time = string_field(fields, "start_time").ok_or("no start time")?;
    let start_time = parse_clock(&start_time).ok_or(format!("unrecognised time '{start_time}'"))?;

    let start = NaiveDateTime::new(date, start_time);
    let end = string_field(fields, "end_time")
        .and_then(|t| parse_clock(&t))
        .map(|t| NaiveDateTime::new(date, t))
        .filter(|end| *end > start)
        .unwrap_or(start + Duration::minutes(DEFAULT_EVENT_MINUTES));

    Ok(EventDraft {
        title,
        start: start.format("%Y-%m-%dT%H:%M:00").to_string(),
        end: end.format("%Y-%m-%dT%H:%M:00").to_string(),
        location: string_field(fields, "location"),
    })
}

fn parse_clock(text: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(text, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(text, "%H:%M:%S"))
        .ok()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn fields(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_full_draft() {
        let draft = event_draft(&fields(json!({
            "title": "Lunch with Mina",
            "date": "2025-12-16",
            "start_time": "12:30",
            "end_time": "13:30",
            "location": "Gangnam Station"
        })))
        .unwrap();
        assert_eq!(draft.start, "2025-12-16T12:30:00");
        assert_eq!(draft.end, "2025-12-16T13:30:00");
        assert_eq!(draft.location.as_deref(), Some("Gangnam Station"));
    }

    #[test]
    fn test_missing_end_is_one_hour() {
        let draft = event_draft(&fields(json!({
            "title": "Call",
            "date": "2025-12-16",
            "start_time": "23:30",
            "end_time": null,
            "location": null
        })))
        .unwrap();
        assert_eq!(draft.end, "2025-12-17T00:30:00");
        assert_eq!(draft.location, None);
    }

    #[test]
    fn test_missing_date_is_an_error() {
        let err = event_draft(&fields(json!({"title": "Call", "start_time": "10:00"}))).unwrap_err();
        assert_eq!(err, "no date");
    }
}
