//! ExecuteCreateEvent step.
//!
//! Transition: ExecuteCreateEvent → GenerateResponse | (suspended for approval)

use concierge_mcp::ToolArgs;

use super::run_branch_tool;
use crate::{
    assistant::{
        context::TurnContext,
        state::{StepResult, TurnState},
    },
    error::Result,
};

/// Create the drafted event. Sensitive by default, so this goes through
/// the approval gate before the registry sees it.
///
/// ## Reads
/// - `ctx.scratch.event_draft`
///
/// ## Writes
/// - `ctx.scratch.tool_output`, `cancelled` or `errors`
/// - `ctx.state` → `GenerateResponse`, unless suspended.
pub(crate) async fn execute_create_event(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let Some(draft) = ctx.scratch.event_draft.clone() else {
        ctx.scratch.errors.push("no event to create".to_string());
        ctx.state = TurnState::GenerateResponse;
        return Ok(StepResult::Continue);
    };

    let mut args = ToolArgs::new()
        .with("title", draft.title)
        .with("start", draft.start)
        .with("end", draft.end);
    if let Some(location) = draft.location {
        args.insert("location", location);
    }

    let tool = ctx.components.tools.create_event.clone();
    if let Some(suspended) = run_branch_tool(ctx, &tool, args).await? {
        return Ok(suspended);
    }

    ctx.state = TurnState::GenerateResponse;
    Ok(StepResult::Continue)
}
