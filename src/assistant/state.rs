//! State machine types for one assistant turn.

use concierge_mcp::ApprovalRequest;

/// Position of a turn in the workflow.
///
/// Every branch converges on `GenerateResponse`, which ends the turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TurnState {
    // ── Entry ───────────────────────────────────────────────────
    /// Classify the latest user message.
    ClassifyIntent,

    // ── check_schedule ──────────────────────────────────────────
    /// Extract the period and fetch calendar events.
    FetchItems,
    /// Decide whether any event needs travel enrichment.
    CheckLocations,
    /// Travel time and departure suggestion per located event.
    EnrichWithTravel,

    // ── create_event ────────────────────────────────────────────
    /// Extract title, date, times and location.
    ExtractEventInfo,
    /// Run the create tool through the approval gate.
    ExecuteCreateEvent,

    // ── search_place / get_directions ───────────────────────────
    ExecuteSearchPlace,
    ExecuteDirections,

    // ── Terminal ────────────────────────────────────────────────
    /// Synthesize the answer and append it to the conversation.
    GenerateResponse,
}

/// The result of executing a single step.
pub(crate) enum StepResult {
    /// The step updated `ctx.state`. The driver should continue the loop.
    Continue,
    /// Terminal: the answer appended to the conversation.
    Finished(String),
    /// Terminal: a sensitive call is parked until the user decides.
    Suspended(ApprovalRequest),
}
