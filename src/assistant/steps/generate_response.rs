//! GenerateResponse step.
//!
//! Transition: GenerateResponse → (terminal)

use std::fmt::Write as _;

use chrono::Local;
use tracing::warn;

use crate::{
    assistant::{
        context::{TurnContext, TurnScratch},
        intent::Intent,
        prompts,
        state::StepResult,
    },
    error::Result,
    llm::ChatMessage,
    session::{ConversationState, GatheredItem},
};

/// Synthesize the answer for the turn and append it to the conversation.
///
/// Never fails on a model error: a plain summary of the gathered context is
/// used instead, so every turn ends with an assistant message.
///
/// ## Reads
/// - `ctx.conversation`: gathered items, annotations, history.
/// - `ctx.scratch`: intent, branch results and recorded errors.
///
/// ## Writes
/// - `ctx.conversation.turns`: the new assistant turn.
pub(crate) async fn generate_response(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let context = context_block(&*ctx.conversation, &ctx.scratch);

    let mut messages = Vec::with_capacity(ctx.conversation.turns.len() + 1);
    let mut system = prompts::system(Local::now());
    if !context.is_empty() {
        system.push_str("\n\nContext:\n");
        system.push_str(&context);
    }
    messages.push(ChatMessage::system(system));
    messages.extend(ctx.conversation.turns.iter().cloned());

    let answer = match ctx.components.llm.complete(&messages).await {
        Ok(answer) if !answer.trim().is_empty() => answer.trim().to_string(),
        Ok(_) => fallback(&context),
        Err(e) => {
            warn!(session = %ctx.session_id, error = %e, "Response generation failed, using fallback");
            fallback(&context)
        }
    };

    ctx.conversation.turns.push(ChatMessage::assistant(answer.clone()));
    Ok(StepResult::Finished(answer))
}

fn fallback(context: &str) -> String {
    if context.is_empty() {
        "Sorry, I couldn't come up with an answer right now. Please try again.".to_string()
    } else {
        format!("Here is what I found:\n{context}")
    }
}

/// Intent-specific facts for the model. Empty for small talk.
fn context_block(conversation: &ConversationState, scratch: &TurnScratch) -> String {
    let mut out = String::new();

    match scratch.intent {
        Intent::CheckSchedule => schedule_context(&mut out, conversation, scratch),
        Intent::CreateEvent => create_event_context(&mut out, scratch),
        Intent::SearchPlace => search_context(&mut out, conversation, scratch),
        Intent::GetDirections => directions_context(&mut out, scratch),
        Intent::General => {}
    }

    for error in &scratch.errors {
        let _ = writeln!(out, "⚠️ Problem: {error}");
    }
    out.trim_end().to_string()
}

fn schedule_context(out: &mut String, conversation: &ConversationState, scratch: &TurnScratch) {
    if let Some(period) = &scratch.period {
        let _ = writeln!(out, "Schedule for: {period}");
    }

    let events: Vec<_> = conversation
        .gathered_items
        .iter()
        .enumerate()
        .filter_map(|(i, item)| item.as_event().map(|e| (i, e)))
        .collect();

    if events.is_empty() {
        match &scratch.tool_output {
            Some(raw) if !raw.trim().is_empty() => {
                let _ = writeln!(out, "Calendar returned:\n{}", raw.trim());
            }
            Some(_) => {
                let _ = writeln!(out, "No events in this period.");
            }
            None => {}
        }
        return;
    }

    for (index, event) in events {
        let when = match (&event.date, &event.time) {
            (Some(date), Some(time)) => format!("{date} {time}"),
            (Some(date), None) => format!("{date} (all day)"),
            _ => event.start.clone(),
        };
        let _ = write!(out, "📅 {when} {}", event.summary);
        if let Some(location) = &event.location {
            let _ = write!(out, " @ {location}");
        }
        out.push('\n');

        let Some(travel) = conversation
            .travel_annotations
            .iter()
            .find(|a| a.item_index == index)
        else {
            continue;
        };
        if let Some(error) = &travel.error {
            let _ = writeln!(out, "   🚗 Travel time unavailable: {error}");
            continue;
        }
        match travel.duration_minutes {
            Some(minutes) => {
                let _ = write!(
                    out,
                    "   🚗 {minutes} min by {} from {}",
                    travel.mode, travel.origin
                );
                if let Some(departure) = &travel.departure {
                    let _ = write!(out, ", leave by {departure}");
                }
                out.push('\n');
            }
            None => {
                let _ = writeln!(out, "   🚗 Travel time unknown from {}", travel.origin);
            }
        }
    }
}

fn create_event_context(out: &mut String, scratch: &TurnScratch) {
    if let Some(draft) = &scratch.event_draft {
        let _ = writeln!(out, "Event: {} from {} to {}", draft.title, draft.start, draft.end);
        if let Some(location) = &draft.location {
            let _ = writeln!(out, "Location: {location}");
        }
    }
    if scratch.cancelled {
        let _ = writeln!(out, "The user cancelled creating this event. Nothing was created.");
    } else if let Some(output) = &scratch.tool_output {
        let _ = writeln!(out, "Calendar result: {}", output.trim());
    }
}

fn search_context(out: &mut String, conversation: &ConversationState, scratch: &TurnScratch) {
    if let Some(query) = &scratch.search_query {
        let _ = writeln!(out, "Search: {query}");
    }
    let mut any = false;
    for item in &conversation.gathered_items {
        if let GatheredItem::Place(place) = item {
            any = true;
            let _ = write!(out, "📍 {}", place.name);
            if let Some(address) = &place.address {
                let _ = write!(out, ", {address}");
            }
            if let Some(rating) = &place.rating {
                let _ = write!(out, " (rating {rating})");
            }
            out.push('\n');
        }
    }
    if !any {
        if let Some(output) = &scratch.tool_output {
            let _ = writeln!(out, "Search returned:\n{}", output.trim());
        }
    }
}

fn directions_context(out: &mut String, scratch: &TurnScratch) {
    if let Some(route) = &scratch.route {
        let _ = writeln!(
            out,
            "Route: {} → {} ({})",
            route.origin, route.destination, route.mode
        );
        if let Some(minutes) = route.duration_minutes {
            let _ = writeln!(out, "Estimated travel time: {minutes} min");
        }
    }
    if scratch.cancelled {
        let _ = writeln!(out, "The user cancelled the lookup.");
    } else if let Some(output) = &scratch.tool_output {
        let _ = writeln!(out, "Directions:\n{}", output.trim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        assistant::context::EventDraft,
        parsers::CalendarEvent,
        session::{SessionConfig, TravelAnnotation},
    };

    #[test]
    fn test_schedule_context_lists_departure() {
        let mut conversation = ConversationState::new(SessionConfig::default());
        conversation.gathered_items.push(GatheredItem::Event(CalendarEvent::new(
            "Dentist",
            "2025-12-16T09:00:00+09:00",
            Some("Gangnam Station".to_string()),
        )));
        conversation.travel_annotations.push(TravelAnnotation {
            item_index: 0,
            origin: "Seoul Station".to_string(),
            destination: "Gangnam Station".to_string(),
            mode: "transit".to_string(),
            duration_minutes: Some(50),
            departure: Some("08:00".to_string()),
            error: None,
        });

        let scratch = TurnScratch {
            intent: Intent::CheckSchedule,
            ..Default::default()
        };
        let context = context_block(&conversation, &scratch);
        assert!(context.contains("2025-12-16 09:00 Dentist @ Gangnam Station"));
        assert!(context.contains("50 min by transit"));
        assert!(context.contains("leave by 08:00"));
    }

    #[test]
    fn test_cancelled_event_context() {
        let conversation = ConversationState::new(SessionConfig::default());
        let scratch = TurnScratch {
            intent: Intent::CreateEvent,
            event_draft: Some(EventDraft {
                title: "Lunch".to_string(),
                start: "2025-12-16T12:00:00".to_string(),
                end: "2025-12-16T13:00:00".to_string(),
                location: None,
            }),
            cancelled: true,
            ..Default::default()
        };
        let context = context_block(&conversation, &scratch);
        assert!(context.contains("Event: Lunch"));
        assert!(context.contains("cancelled"));
    }

    #[test]
    fn test_errors_are_listed_and_fallback_uses_context() {
        let conversation = ConversationState::new(SessionConfig::default());
        let scratch = TurnScratch {
            errors: vec!["get_events failed: Error: timeout".to_string()],
            ..Default::default()
        };
        let context = context_block(&conversation, &scratch);
        assert!(context.contains("timeout"));
        assert!(fallback(&context).contains("timeout"));
        assert!(fallback("").starts_with("Sorry"));
    }
}
