//! CheckLocations step.
//!
//! Transition: CheckLocations → EnrichWithTravel | GenerateResponse

use crate::{
    assistant::{
        context::TurnContext,
        state::{StepResult, TurnState},
    },
    error::Result,
};

/// Route to travel enrichment when at least one event has a location.
///
/// ## Reads
/// - `ctx.conversation.gathered_items`
///
/// ## Writes
/// - `ctx.state`
pub(crate) async fn check_locations(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    ctx.state = if ctx.conversation.events().any(|e| e.has_location()) {
        TurnState::EnrichWithTravel
    } else {
        TurnState::GenerateResponse
    };
    Ok(StepResult::Continue)
}
