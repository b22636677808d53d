//! Structured logging for scheduler events.

use crate::error::EngineError;
use crate::workflow::{MessageKind, RunStatus};

/// Log one handler dispatch.
pub fn log_dispatch(executor_id: &str, kind: MessageKind) {
    tracing::debug!(executor_id = executor_id, kind = %kind, "dispatching message");
}

/// Log the end of a drain with its resulting status.
pub fn log_run_complete(status: RunStatus) {
    tracing::info!(status = %status, "workflow drain complete");
}

/// Log a workflow-level error.
pub fn log_run_error(error: &EngineError) {
    tracing::error!(?error, "workflow error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn logging_functions_do_not_panic() {
        log_dispatch("supervisor", MessageKind::Prompt);
        log_run_complete(RunStatus::Completed);
        log_run_error(&EngineError::Cancelled);
    }
}
