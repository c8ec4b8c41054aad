//! FetchItems step.
//!
//! Transition: FetchItems → CheckLocations

use chrono::Local;
use tracing::{info, warn};

use super::{ask, run_branch_tool};
use crate::{
    assistant::{
        context::TurnContext,
        prompts,
        state::{StepResult, TurnState},
    },
    error::Result,
    parsers::{parse_events, parse_period},
    session::GatheredItem,
};

/// Work out the requested period and load the matching calendar events.
///
/// ## Reads
/// - `ctx.conversation.turns`: the latest user message.
/// - `ctx.components.tools.events`
///
/// ## Writes
/// - `ctx.scratch.period`, `ctx.scratch.tool_output` or `ctx.scratch.errors`
/// - `ctx.conversation.gathered_items`: one `Event` per parsed entry.
/// - `ctx.state` → `CheckLocations`.
pub(crate) async fn fetch_items(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let period = match ask(ctx, &prompts::extract_period(Local::now())).await {
        Ok(answer) => parse_period(&answer),
        Err(e) => {
            warn!(session = %ctx.session_id, error = %e, "Period extraction failed");
            parse_period(ctx.conversation.last_user_message().unwrap_or_default())
        }
    };
    info!(session = %ctx.session_id, period = %period, "Fetching events");

    let tool = ctx.components.tools.events.clone();
    let args = period.to_args();
    ctx.scratch.period = Some(period);
    if let Some(suspended) = run_branch_tool(ctx, &tool, args).await? {
        return Ok(suspended);
    }

    if let Some(output) = &ctx.scratch.tool_output {
        let events = parse_events(output);
        info!(session = %ctx.session_id, count = events.len(), "Parsed events");
        ctx.conversation
            .gathered_items
            .extend(events.into_iter().map(GatheredItem::Event));
    }

    ctx.state = TurnState::CheckLocations;
    Ok(StepResult::Continue)
}
