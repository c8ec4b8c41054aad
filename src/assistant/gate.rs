//! Tool dispatch through the approval gate.
//!
//! Non-sensitive tools go straight to the registry. Sensitive ones either
//! block on the prompter or are parked as a pending approval, depending on
//! the configured [`ApprovalGate`].

use concierge_mcp::{
    ApprovalDecision, ApprovalError, ApprovalRequest, DecisionSource, SessionId, ToolArgs,
    ToolCallResult,
};
use serde_json::Value;
use tracing::{info, warn};

use super::context::{ApprovalGate, SharedComponents};

pub(crate) enum Dispatch {
    /// The registry was called.
    Completed(ToolCallResult),
    /// The user declined; nothing was called.
    Cancelled,
    /// Parked until the user decides.
    Suspended(ApprovalRequest),
    /// Could not be gated (another approval pending, or suspension not allowed).
    Rejected(String),
}

/// Call `tool`, gating it when it is sensitive.
///
/// `resume` is the snapshot stored with a pending approval. Passing `None`
/// forbids suspension, for calls made in a batch.
pub(crate) async fn dispatch(
    components: &SharedComponents,
    session_id: &SessionId,
    tool: &str,
    args: ToolArgs,
    resume: Option<Value>,
) -> Dispatch {
    if !components.sensitive.requires_approval(tool) {
        return Dispatch::Completed(components.registry.invoke(tool, &args).await);
    }

    match &components.gate {
        ApprovalGate::Synchronous(prompter) => {
            let prompter = prompter.clone();
            let tool_name = tool.to_string();
            let proposed = args.clone();
            let decision =
                tokio::task::spawn_blocking(move || prompter.decide(&tool_name, &proposed))
                    .await
                    .unwrap_or_else(|e| {
                        warn!(tool = %tool, error = %e, "Approval prompt aborted");
                        ApprovalDecision::cancelled_because("prompt aborted")
                    });
            components
                .approvals
                .record_decision(session_id, tool, &decision, DecisionSource::Terminal);

            match decision.effective_args(&args) {
                Some(approved) => {
                    info!(tool = %tool, "Sensitive call approved");
                    Dispatch::Completed(components.registry.invoke(tool, &approved).await)
                }
                None => {
                    info!(tool = %tool, "Sensitive call cancelled");
                    Dispatch::Cancelled
                }
            }
        }
        ApprovalGate::Asynchronous => {
            let Some(resume) = resume else {
                return Dispatch::Rejected(format!(
                    "{tool} needs approval and cannot run as part of a batch"
                ));
            };
            match components
                .approvals
                .request_approval(session_id, tool, args, resume)
            {
                Ok(request) => Dispatch::Suspended(request),
                Err(ApprovalError::AlreadyPending(_)) => Dispatch::Rejected(format!(
                    "{tool} was not started because another operation is still waiting for approval"
                )),
                Err(e) => Dispatch::Rejected(e.to_string()),
            }
        }
    }
}
