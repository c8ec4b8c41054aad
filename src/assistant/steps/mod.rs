//! Step implementations for the assistant state machine.
//!
//! Each step is a standalone async function that reads/writes `TurnContext`
//! and updates `ctx.state` to drive the state machine forward.

mod check_locations;
mod classify_intent;
mod enrich_with_travel;
mod execute_create_event;
mod execute_directions;
mod execute_search_place;
mod extract_event_info;
mod fetch_items;
mod generate_response;

pub(crate) use check_locations::check_locations;
pub(crate) use classify_intent::classify_intent;
pub(crate) use enrich_with_travel::enrich_with_travel;
pub(crate) use execute_create_event::execute_create_event;
pub(crate) use execute_directions::execute_directions;
pub(crate) use execute_search_place::execute_search_place;
pub(crate) use extract_event_info::extract_event_info;
pub(crate) use fetch_items::fetch_items;
pub(crate) use generate_response::generate_response;

use concierge_mcp::ToolArgs;
use serde_json::{Map, Value};
use tracing::debug;

use super::{
    context::TurnContext,
    gate::{self, Dispatch},
    state::StepResult,
};
use crate::{
    error::Result,
    llm::{ChatMessage, LlmError},
};

/// One-shot model call over an instruction and the latest user message.
async fn ask(ctx: &TurnContext<'_>, instruction: &str) -> Result<String, LlmError> {
    let message = ctx.conversation.last_user_message().unwrap_or_default();
    let messages = [ChatMessage::system(instruction), ChatMessage::user(message)];
    let answer = ctx.components.llm.complete(&messages).await?;
    debug!(answer = %answer, "Extraction answer");
    Ok(answer.trim().to_string())
}

/// The first JSON object in a model answer, tolerating code fences and prose.
fn json_object(text: &str) -> Option<Map<String, Value>> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    match serde_json::from_str::<Value>(&text[start..=end]).ok()? {
        Value::Object(map) => Some(map),
        _ => None,
    }
}

/// Non-empty string field; JSON `null` and blanks are absent.
fn string_field(map: &Map<String, Value>, key: &str) -> Option<String> {
    map.get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty() && !s.eq_ignore_ascii_case("null"))
        .map(str::to_string)
}

/// Run the branch's main tool through the gate and record the outcome.
///
/// Returns `Some` when the turn must suspend for approval.
async fn run_branch_tool(
    ctx: &mut TurnContext<'_>,
    tool: &str,
    args: ToolArgs,
) -> Result<Option<StepResult>> {
    let resume = serde_json::to_value(&ctx.scratch)?;
    match gate::dispatch(&ctx.components, &ctx.session_id, tool, args, Some(resume)).await {
        Dispatch::Completed(result) => ctx.scratch.record_tool_result(tool, &result),
        Dispatch::Cancelled => ctx.scratch.cancelled = true,
        Dispatch::Suspended(request) => return Ok(Some(StepResult::Suspended(request))),
        Dispatch::Rejected(reason) => ctx.scratch.errors.push(reason),
    }
    Ok(None)
}
