//! Events streamed while a workflow runs.
//!
//! `run_stream` / `send_responses_streaming` yield these in causal order:
//! executor invocations, forwarded agent updates, human-input requests,
//! scheduler status, yielded outputs, and errors. No global real-time order
//! is claimed across unrelated agents' internal tool streams beyond what each
//! agent handle itself emits.

use std::fmt;

use tokio::sync::mpsc;

use crate::agent::AgentRunUpdate;
use crate::error::ErrorReason;
use crate::workflow::HumanFeedbackRequest;

/// Run-state machine of a workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    /// The scheduler is draining the inbox.
    Running,
    /// Inbox empty, at least one pending human-input request.
    IdleWithPendingRequests,
    /// At least one output yielded, inbox empty, no pending requests.
    Completed,
    /// A handler failed or the caller cancelled. Terminal.
    Failed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunStatus::Running => "running",
            RunStatus::IdleWithPendingRequests => "idle_with_pending_requests",
            RunStatus::Completed => "completed",
            RunStatus::Failed => "failed",
        };
        write!(f, "{}", name)
    }
}

/// Event yielded from a workflow's event stream.
#[derive(Debug, Clone)]
pub enum WorkflowEvent {
    /// A handler is about to run on the named executor.
    ExecutorInvoked {
        /// Target executor id.
        executor_id: String,
    },
    /// Streamed partial agent output (UI only).
    AgentUpdate(AgentRunUpdate),
    /// The workflow is requesting user input; resume with
    /// `send_responses_streaming({request_id: answer, ...})`.
    RequestInfo {
        /// Key the response must carry.
        request_id: String,
        /// The request payload.
        data: HumanFeedbackRequest,
    },
    /// Scheduler status transition (also emitted after every handler).
    Status(RunStatus),
    /// A yielded final output.
    Output {
        /// Output text.
        data: String,
    },
    /// A workflow-level error. Fatal unless the reason is
    /// `UnknownRequest` / `DuplicateResponse`.
    Error {
        /// Coarse reason tag.
        reason: ErrorReason,
        /// Human-readable detail.
        details: String,
    },
}

/// Forwards [`AgentRunUpdate`]s from an agent handle into the event stream.
///
/// Handlers create a channel, pass the sender into [`crate::agent::AgentHandle::run`],
/// and await `forward` alongside the run (`tokio::join!`) so every update is
/// forwarded before the handler returns.
pub struct UpdateForwarder {
    event_tx: mpsc::Sender<WorkflowEvent>,
}

impl UpdateForwarder {
    /// Wraps an event sender.
    pub fn new(event_tx: mpsc::Sender<WorkflowEvent>) -> Self {
        Self { event_tx }
    }

    /// Returns (update_tx, update_rx) for one agent invocation.
    pub fn channel(&self) -> (mpsc::Sender<AgentRunUpdate>, mpsc::Receiver<AgentRunUpdate>) {
        mpsc::channel(128)
    }

    /// Forwards updates until the sender side is dropped.
    pub async fn forward(&self, mut update_rx: mpsc::Receiver<AgentRunUpdate>) {
        while let Some(update) = update_rx.recv().await {
            let _ = self.event_tx.send(WorkflowEvent::AgentUpdate(update)).await;
        }
    }
}
