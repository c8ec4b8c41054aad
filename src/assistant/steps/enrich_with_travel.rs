//! EnrichWithTravel step.
//!
//! Transition: EnrichWithTravel → GenerateResponse

use concierge_mcp::{ToolArgs, ToolCallResult};
use futures::future::join_all;
use tracing::{debug, info};

use crate::{
    assistant::{
        context::TurnContext,
        gate::{self, Dispatch},
        state::{StepResult, TurnState},
    },
    error::Result,
    parsers::{departure_time, parse_duration_minutes},
    session::{GatheredItem, TravelAnnotation},
};

/// Ask the directions tool for every located event and suggest departures.
///
/// Calls run concurrently; annotations keep the order of `gathered_items`.
/// A failed call becomes an annotation with `error` set. These calls may not
/// suspend, so a gated directions tool in chat mode is reported per event.
///
/// ## Reads
/// - `ctx.conversation.gathered_items`: events with a location.
/// - `ctx.conversation.session_config`: origin, mode and buffer.
///
/// ## Writes
/// - `ctx.conversation.travel_annotations`
/// - `ctx.state` → `GenerateResponse`.
pub(crate) async fn enrich_with_travel(ctx: &mut TurnContext<'_>) -> Result<StepResult> {
    let config = ctx.conversation.session_config.clone();
    let tool = ctx.components.tools.directions.clone();

    let located: Vec<(usize, String, Option<String>)> = ctx
        .conversation
        .gathered_items
        .iter()
        .enumerate()
        .filter_map(|(index, item)| match item {
            GatheredItem::Event(event) => event
                .location
                .clone()
                .map(|location| (index, location, event.time.clone())),
            GatheredItem::Place(_) => None,
        })
        .collect();
    info!(session = %ctx.session_id, count = located.len(), "Enriching events with travel");

    let components = ctx.components.clone();
    let session_id = ctx.session_id.clone();
    let lookups = located.into_iter().map(|(item_index, destination, time)| {
        let components = components.clone();
        let session_id = session_id.clone();
        let tool = tool.clone();
        let config = config.clone();
        async move {
            let args = ToolArgs::new()
                .with("origin", config.default_origin.clone())
                .with("destination", destination.clone())
                .with("mode", config.default_mode.clone());
            let mut annotation = TravelAnnotation {
                item_index,
                origin: config.default_origin.clone(),
                destination,
                mode: config.default_mode.clone(),
                ..Default::default()
            };

            match gate::dispatch(&components, &session_id, &tool, args, None).await {
                Dispatch::Completed(ToolCallResult::Success(text)) => {
                    annotation.duration_minutes = parse_duration_minutes(&text);
                    annotation.departure = departure_time(
                        time.as_deref(),
                        annotation.duration_minutes,
                        config.buffer_minutes,
                    );
                    if annotation.duration_minutes.is_none() {
                        debug!(destination = %annotation.destination, "No duration in directions output");
                    }
                }
                Dispatch::Completed(other) => annotation.error = Some(other.to_string()),
                Dispatch::Cancelled => annotation.error = Some("cancelled by user".to_string()),
                Dispatch::Suspended(_) => {
                    annotation.error = Some("needs approval".to_string());
                }
                Dispatch::Rejected(reason) => annotation.error = Some(reason),
            }
            annotation
        }
    });

    ctx.conversation.travel_annotations = join_all(lookups).await;
    ctx.state = TurnState::GenerateResponse;
    Ok(StepResult::Continue)
}
