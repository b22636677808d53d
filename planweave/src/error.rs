//! Runtime error types for workflow execution.
//!
//! Builder-time validation errors live in [`crate::workflow::GraphError`];
//! tool errors in [`crate::tool::ToolError`]. Everything the engine can
//! surface while a run is in flight is an [`EngineError`].

use thiserror::Error;

use crate::workflow::MessageKind;

/// Error raised while executing a workflow run.
///
/// Handler errors abort the current handler and fail the run unless the
/// supervisor catches and reroutes; `UnknownRequest` / `DuplicateResponse`
/// are emitted as events without changing the run state.
#[derive(Debug, Clone, Error)]
pub enum EngineError {
    /// A message has no handler for its (target, kind) pair, or was sent on
    /// an edge that does not exist.
    #[error("no handler for {kind} message at executor '{executor_id}'")]
    UnroutableMessage {
        /// Target executor id.
        executor_id: String,
        /// Kind of the undeliverable message.
        kind: MessageKind,
    },

    /// An agent configured with a response schema returned unparseable text
    /// twice in succession (one reprompt is attempted first).
    #[error("structured output parse failure: {0}")]
    StructuredOutputParseFailure(String),

    /// The LLM transport failed past the client's retry budget.
    #[error("agent run failed: {0}")]
    AgentRunFailure(String),

    /// A resumption response named a request id that was never registered.
    #[error("unknown request id: {0}")]
    UnknownRequest(String),

    /// A resumption response named a request id that was already consumed.
    #[error("duplicate response for request id: {0}")]
    DuplicateResponse(String),

    /// The caller aborted the event stream.
    #[error("run cancelled")]
    Cancelled,
}

/// Coarse reason tag carried on error events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorReason {
    UnroutableMessage,
    StructuredOutputParseFailure,
    AgentRunFailure,
    UnknownRequest,
    DuplicateResponse,
    Cancelled,
}

impl EngineError {
    /// Reason tag for this error, used on [`crate::workflow::WorkflowEvent::Error`].
    pub fn reason(&self) -> ErrorReason {
        match self {
            EngineError::UnroutableMessage { .. } => ErrorReason::UnroutableMessage,
            EngineError::StructuredOutputParseFailure(_) => {
                ErrorReason::StructuredOutputParseFailure
            }
            EngineError::AgentRunFailure(_) => ErrorReason::AgentRunFailure,
            EngineError::UnknownRequest(_) => ErrorReason::UnknownRequest,
            EngineError::DuplicateResponse(_) => ErrorReason::DuplicateResponse,
            EngineError::Cancelled => ErrorReason::Cancelled,
        }
    }
}
