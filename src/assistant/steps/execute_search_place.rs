//! ExecuteSearchPlace step.
//!
//! Transition: ExecuteSearchPlace → GenerateResponse

use concierge_mcp::ToolArgs;
use tracing::warn;

use super::{ask, run_branch_tool};
use crate::{
    assistant::{
        context::TurnContext,
        prompts,
        state::{StepResult, TurnState},
    },
    error::Result,
    parsers::parse_places,
    session::GatheredItem,
};

/// Search for places matching the user's request.
///
/// The query is extracted by the model; when that fails the raw message is
/// used as the query.
///
/// ## Reads
/// - `ctx.conversation.turns`: the latest user message.
///
/// ## Writes
/// - `ctx.scratch.search_query`, `tool_output` or `errors`
/// - `ctx.conversation.gathered_items`: one `Place` per hit.
/// - `ctx.state` → `GenerateResponse`.
pub(crate) async fn execute_search_place(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let fallback = ctx
        .conversation
        .last_user_message()
        .unwrap_or_default()
        .to_string();
    let query = match ask(ctx, prompts::EXTRACT_SEARCH_QUERY).await {
        Ok(answer) if !answer.is_empty() => answer.trim_matches('"').to_string(),
        Ok(_) => fallback,
        Err(e) => {
            warn!(session = %ctx.session_id, error = %e, "Query extraction failed, using message");
            fallback
        }
    };

    let tool = ctx.components.tools.search_places.clone();
    let args = ToolArgs::new().with("query", query.clone());
    ctx.scratch.search_query = Some(query);
    if let Some(suspended) = run_branch_tool(ctx, &tool, args).await? {
        return Ok(suspended);
    }

    if let Some(output) = &ctx.scratch.tool_output {
        ctx.conversation
            .gathered_items
            .extend(parse_places(output).into_iter().map(GatheredItem::Place));
    }

    ctx.state = TurnState::GenerateResponse;
    Ok(StepResult::Continue)
}
