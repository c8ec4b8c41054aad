//! Single state machine driver for an assistant turn.
//!
//! One function, one loop, one match. Dispatches the appropriate step
//! based on `ctx.state` and handles the result.

use super::{
    context::TurnContext,
    state::{StepResult, TurnState},
    steps, TurnReply,
};
use crate::error::Result;

/// Execute the state machine until a step ends the turn.
///
/// A fresh turn starts in `ClassifyIntent`; an approval resume starts in
/// `GenerateResponse`. Errors only come from broken invariants (a resume
/// snapshot that cannot be serialized); tool and model failures are data.
pub(crate) async fn execute(ctx: &mut TurnContext<'_>) -> Result<TurnReply> {
    loop {
        let result = match ctx.state {
            TurnState::ClassifyIntent => steps::classify_intent(ctx).await,

            TurnState::FetchItems => steps::fetch_items(ctx).await,

            TurnState::CheckLocations => steps::check_locations(ctx).await,

            TurnState::EnrichWithTravel => steps::enrich_with_travel(ctx).await,

            TurnState::ExtractEventInfo => steps::extract_event_info(ctx).await,

            TurnState::ExecuteCreateEvent => steps::execute_create_event(ctx).await,

            TurnState::ExecuteSearchPlace => steps::execute_search_place(ctx).await,

            TurnState::ExecuteDirections => steps::execute_directions(ctx).await,

            TurnState::GenerateResponse => steps::generate_response(ctx).await,
        };

        match result? {
            StepResult::Continue => continue,
            StepResult::Finished(answer) => return Ok(TurnReply::Reply(answer)),
            StepResult::Suspended(request) => return Ok(TurnReply::ApprovalRequired(request)),
        }
    }
}
