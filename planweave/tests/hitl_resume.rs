//! Integration tests for human-in-the-loop suspension and resumption.

mod init_logging;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio_stream::StreamExt;

use planweave::{
    EngineError, ErrorReason, Executor, HumanFeedbackRequest, MessageKind, RunStatus,
    WorkflowBuilder, WorkflowContext, WorkflowEvent, WorkflowMessage,
};

/// Start executor that suspends on `requests` questions, then yields once all
/// answers arrived.
struct Gate {
    requests: Vec<&'static str>,
    answered: AtomicUsize,
}

impl Gate {
    fn new(requests: Vec<&'static str>) -> Self {
        Self {
            requests,
            answered: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl Executor for Gate {
    fn id(&self) -> &str {
        "gate"
    }
    fn accepts(&self) -> &'static [MessageKind] {
        &[MessageKind::Prompt, MessageKind::HumanResponse]
    }
    async fn handle(
        &self,
        msg: WorkflowMessage,
        ctx: &mut WorkflowContext,
    ) -> Result<(), EngineError> {
        match msg {
            WorkflowMessage::Prompt(_) => {
                for question in &self.requests {
                    ctx.request_info(HumanFeedbackRequest::clarification(
                        *question, "gate", vec![],
                    ));
                }
                Ok(())
            }
            WorkflowMessage::HumanResponse { text, .. } => {
                let n = self.answered.fetch_add(1, Ordering::SeqCst) + 1;
                if n == self.requests.len() {
                    ctx.yield_output(format!("done after {}: {}", n, text));
                }
                Ok(())
            }
            other => Err(EngineError::UnroutableMessage {
                executor_id: "gate".into(),
                kind: other.kind(),
            }),
        }
    }
}

fn gate_workflow(requests: Vec<&'static str>) -> planweave::Workflow {
    let mut builder = WorkflowBuilder::new();
    builder
        .add_executor(Arc::new(Gate::new(requests)))
        .with_start("gate");
    builder.build().expect("valid graph")
}

fn request_ids(events: &[WorkflowEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::RequestInfo { request_id, .. } => Some(request_id.clone()),
            _ => None,
        })
        .collect()
}

/// **Scenario**: A request suspends the run as idle-with-pending; answering
/// it completes the run.
#[tokio::test]
async fn request_then_resume_completes() {
    let workflow = gate_workflow(vec!["how many guests?"]);
    let events: Vec<_> = workflow.run_stream("plan a party").collect().await;

    let ids = request_ids(&events);
    assert_eq!(ids.len(), 1);
    assert!(matches!(
        events.last(),
        Some(WorkflowEvent::Status(RunStatus::IdleWithPendingRequests))
    ));
    assert_eq!(workflow.status(), Some(RunStatus::IdleWithPendingRequests));
    assert_eq!(workflow.pending_requests().await.len(), 1);

    let responses: HashMap<String, String> =
        [(ids[0].clone(), "50 people, Dec 15".to_string())].into();
    let resumed: Vec<_> = workflow.send_responses_streaming(responses).collect().await;

    assert!(resumed
        .iter()
        .any(|e| matches!(e, WorkflowEvent::Output { data } if data.contains("50 people"))));
    assert_eq!(workflow.status(), Some(RunStatus::Completed));
    assert!(workflow.pending_requests().await.is_empty());
}

/// **Scenario**: An unknown request id emits one UnknownRequest error and
/// leaves the run state and pending table untouched.
#[tokio::test]
async fn unknown_request_id_is_non_fatal() {
    let workflow = gate_workflow(vec!["how many guests?"]);
    let _: Vec<_> = workflow.run_stream("plan a party").collect().await;
    assert_eq!(workflow.status(), Some(RunStatus::IdleWithPendingRequests));

    let responses: HashMap<String, String> = [("no-such-id".to_string(), "x".to_string())].into();
    let events: Vec<_> = workflow.send_responses_streaming(responses).collect().await;

    let errors: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, WorkflowEvent::Error { .. }))
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(matches!(
        errors[0],
        WorkflowEvent::Error {
            reason: ErrorReason::UnknownRequest,
            ..
        }
    ));
    assert_eq!(workflow.status(), Some(RunStatus::IdleWithPendingRequests));
    assert_eq!(workflow.pending_requests().await.len(), 1);
}

/// **Scenario**: An empty response map yields exactly one status event of the
/// current state and makes no progress.
#[tokio::test]
async fn empty_response_map_is_a_noop() {
    let workflow = gate_workflow(vec!["how many guests?"]);
    let _: Vec<_> = workflow.run_stream("plan a party").collect().await;

    let events: Vec<_> = workflow
        .send_responses_streaming(HashMap::new())
        .collect()
        .await;

    assert_eq!(events.len(), 1);
    assert!(matches!(
        events[0],
        WorkflowEvent::Status(RunStatus::IdleWithPendingRequests)
    ));
    assert_eq!(workflow.pending_requests().await.len(), 1);
}

/// **Scenario**: Answering an already-consumed request id is rejected as a
/// duplicate without disturbing the terminal state.
#[tokio::test]
async fn consumed_request_id_is_duplicate() {
    let workflow = gate_workflow(vec!["how many guests?"]);
    let events: Vec<_> = workflow.run_stream("plan a party").collect().await;
    let ids = request_ids(&events);

    let responses: HashMap<String, String> = [(ids[0].clone(), "50".to_string())].into();
    let _: Vec<_> = workflow.send_responses_streaming(responses).collect().await;
    assert_eq!(workflow.status(), Some(RunStatus::Completed));

    let again: HashMap<String, String> = [(ids[0].clone(), "60".to_string())].into();
    let events: Vec<_> = workflow.send_responses_streaming(again).collect().await;
    assert!(events.iter().any(|e| matches!(
        e,
        WorkflowEvent::Error {
            reason: ErrorReason::DuplicateResponse,
            ..
        }
    )));
    assert_eq!(workflow.status(), Some(RunStatus::Completed));
}

/// **Scenario**: Two outstanding requests can be answered in one batch; a
/// partial batch leaves the run idle.
#[tokio::test]
async fn batch_and_partial_resumption() {
    let workflow = gate_workflow(vec!["date?", "headcount?"]);
    let events: Vec<_> = workflow.run_stream("plan a party").collect().await;
    let ids = request_ids(&events);
    assert_eq!(ids.len(), 2);

    // Answer only the first: still idle, one request left.
    let first: HashMap<String, String> = [(ids[0].clone(), "Dec 15".to_string())].into();
    let _: Vec<_> = workflow.send_responses_streaming(first).collect().await;
    assert_eq!(workflow.status(), Some(RunStatus::IdleWithPendingRequests));
    assert_eq!(workflow.pending_requests().await.len(), 1);

    // Answer the second: run completes.
    let second: HashMap<String, String> = [(ids[1].clone(), "50".to_string())].into();
    let resumed: Vec<_> = workflow.send_responses_streaming(second).collect().await;
    assert!(resumed
        .iter()
        .any(|e| matches!(e, WorkflowEvent::Output { .. })));
    assert_eq!(workflow.status(), Some(RunStatus::Completed));
}
