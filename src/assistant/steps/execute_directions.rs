//! ExecuteDirections step.
//!
//! Transition: ExecuteDirections → GenerateResponse

use concierge_mcp::ToolArgs;
use tracing::{info, warn};

use super::{ask, json_object, run_branch_tool, string_field};
use crate::{
    assistant::{
        context::{RouteRequest, TurnContext},
        prompts,
        state::{StepResult, TurnState},
    },
    error::Result,
    parsers::parse_duration_minutes,
};

const TRAVEL_MODES: [&str; 4] = ["driving", "walking", "bicycling", "transit"];

/// Look up a route between two places.
///
/// Origin and mode fall back to the session defaults. Without a
/// destination no tool is called.
///
/// ## Reads
/// - `ctx.conversation.turns`: the latest user message.
/// - `ctx.conversation.session_config`
///
/// ## Writes
/// - `ctx.scratch.route`, `tool_output` or `errors`
/// - `ctx.state` → `GenerateResponse`.
pub(crate) async fn execute_directions(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let fields = match ask(ctx, prompts::EXTRACT_ROUTE).await {
        Ok(answer) => json_object(&answer).unwrap_or_default(),
        Err(e) => {
            warn!(session = %ctx.session_id, error = %e, "Route extraction failed");
            Default::default()
        }
    };

    let Some(destination) = string_field(&fields, "destination") else {
        ctx.scratch.errors.push("no destination given".to_string());
        ctx.state = TurnState::GenerateResponse;
        return Ok(StepResult::Continue);
    };
    let config = &ctx.conversation.session_config;
    let origin = string_field(&fields, "origin").unwrap_or_else(|| config.default_origin.clone());
    let mode = string_field(&fields, "mode")
        .map(|m| m.to_lowercase())
        .filter(|m| TRAVEL_MODES.contains(&m.as_str()))
        .unwrap_or_else(|| config.default_mode.clone());
    info!(session = %ctx.session_id, origin = %origin, destination = %destination, mode = %mode, "Looking up route");

    let tool = ctx.components.tools.directions.clone();
    let args = ToolArgs::new()
        .with("origin", origin.clone())
        .with("destination", destination.clone())
        .with("mode", mode.clone());
    ctx.scratch.route = Some(RouteRequest {
        origin,
        destination,
        mode,
        duration_minutes: None,
    });
    if let Some(suspended) = run_branch_tool(ctx, &tool, args).await? {
        return Ok(suspended);
    }

    let duration = ctx.scratch.tool_output.as_deref().and_then(parse_duration_minutes);
    if let Some(route) = ctx.scratch.route.as_mut() {
        route.duration_minutes = duration;
    }

    ctx.state = TurnState::GenerateResponse;
    Ok(StepResult::Continue)
}
