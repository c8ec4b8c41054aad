//! ClassifyIntent step.
//!
//! Transition: ClassifyIntent → FetchItems | ExtractEventInfo | ExecuteSearchPlace
//!                            | ExecuteDirections | GenerateResponse

use tracing::{info, warn};

use super::ask;
use crate::{
    assistant::{
        context::TurnContext,
        intent::Intent,
        prompts,
        state::{StepResult, TurnState},
    },
    error::Result,
};

/// Label the latest user message and pick the branch.
///
/// A model failure is not fatal: the turn falls through to `general`.
///
/// ## Reads
/// - `ctx.conversation.turns`: the latest user message.
///
/// ## Writes
/// - `ctx.conversation.intent`, `ctx.scratch.intent`
/// - `ctx.conversation.gathered_items`, `travel_annotations`: cleared.
/// - `ctx.state` → first node of the branch.
pub(crate) async fn classify_intent(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let intent = match ask(ctx, prompts::CLASSIFY_INTENT).await {
        Ok(answer) => Intent::from_classifier_output(&answer),
        Err(e) => {
            warn!(session = %ctx.session_id, error = %e, "Intent classification failed");
            Intent::General
        }
    };
    info!(session = %ctx.session_id, intent = %intent, "Classified intent");

    ctx.conversation.intent = intent;
    ctx.scratch.intent = intent;
    ctx.conversation.gathered_items.clear();
    ctx.conversation.travel_annotations.clear();

    ctx.state = match intent {
        Intent::CheckSchedule => TurnState::FetchItems,
        Intent::CreateEvent => TurnState::ExtractEventInfo,
        Intent::SearchPlace => TurnState::ExecuteSearchPlace,
        Intent::GetDirections => TurnState::ExecuteDirections,
        Intent::General => TurnState::GenerateResponse,
    };
    Ok(StepResult::Continue)
}
