//! Workflow engine: graph, FIFO inbox, run-state machine, streaming API.
//!
//! One cooperative scheduler drains the inbox strictly sequentially; handlers
//! never overlap. The run core lives behind an async mutex held for the whole
//! drain, so `run_stream` and `send_responses_streaming` serialize against
//! each other by construction. Events flow through a bounded channel; a
//! dropped receiver is how the engine observes caller cancellation.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::{Arc, Mutex as StdMutex};

use tokio::sync::{mpsc, Mutex};
use tokio_stream::wrappers::ReceiverStream;
use uuid::Uuid;

use crate::error::EngineError;
use crate::workflow::executor::PendingAction;
use crate::workflow::logging::{log_dispatch, log_run_complete, log_run_error};
use crate::workflow::{
    Executor, HumanFeedbackRequest, PendingRequest, RunStatus, WorkflowContext, WorkflowEvent,
    WorkflowMessage,
};

/// Mutable state of one workflow run.
struct RunCore {
    inbox: VecDeque<(String, WorkflowMessage)>,
    pending: HashMap<String, PendingRequest>,
    consumed: HashSet<String>,
    outputs_emitted: usize,
    terminal: bool,
}

impl RunCore {
    fn new() -> Self {
        Self {
            inbox: VecDeque::new(),
            pending: HashMap::new(),
            consumed: HashSet::new(),
            outputs_emitted: 0,
            terminal: false,
        }
    }
}

/// An immutable executor graph plus the state of its (single) run.
///
/// Built by [`crate::workflow::WorkflowBuilder::build`]. Runs are in-memory
/// only; the id is stable across rebuilds so external UIs can cache routes.
#[derive(Clone)]
pub struct Workflow {
    id: String,
    start_id: String,
    executors: HashMap<String, Arc<dyn Executor>>,
    edges: HashMap<String, HashSet<String>>,
    core: Arc<Mutex<RunCore>>,
    status: Arc<StdMutex<Option<RunStatus>>>,
}

impl Workflow {
    pub(crate) fn new(
        id: String,
        start_id: String,
        executors: HashMap<String, Arc<dyn Executor>>,
        edges: HashMap<String, HashSet<String>>,
    ) -> Self {
        Self {
            id,
            start_id,
            executors,
            edges,
            core: Arc::new(Mutex::new(RunCore::new())),
            status: Arc::new(StdMutex::new(None)),
        }
    }

    /// Stable workflow id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current run status; `None` before the first `run_stream`.
    pub fn status(&self) -> Option<RunStatus> {
        self.status.lock().map(|s| *s).unwrap_or(None)
    }

    /// Outstanding human-input requests, keyed by request id.
    pub async fn pending_requests(&self) -> Vec<(String, HumanFeedbackRequest)> {
        let core = self.core.lock().await;
        core.pending
            .iter()
            .map(|(id, p)| (id.clone(), p.request.clone()))
            .collect()
    }

    fn set_status(&self, status: RunStatus) {
        if let Ok(mut guard) = self.status.lock() {
            *guard = Some(status);
        }
    }

    /// Starts a new run from `prompt` and streams its events.
    pub fn run_stream(&self, prompt: impl Into<String>) -> ReceiverStream<WorkflowEvent> {
        let prompt = prompt.into();
        let (tx, rx) = mpsc::channel(128);
        let workflow = self.clone();
        tokio::spawn(async move {
            let mut core = workflow.core.lock().await;
            if core.terminal {
                if let Some(status) = workflow.status() {
                    let _ = tx.send(WorkflowEvent::Status(status)).await;
                }
                return;
            }
            workflow.set_status(RunStatus::Running);
            core.inbox
                .push_back((workflow.start_id.clone(), WorkflowMessage::Prompt(prompt)));
            workflow.drain(&mut core, &tx).await;
        });
        ReceiverStream::new(rx)
    }

    /// Resumes an idle run by answering pending requests.
    ///
    /// Unknown ids emit `UnknownRequest` and already-consumed ids emit
    /// `DuplicateResponse`, both without changing the run state. Responses
    /// for ids that remain unanswered leave the run idle. An empty map yields
    /// exactly one status event and makes no progress.
    pub fn send_responses_streaming(
        &self,
        responses: HashMap<String, String>,
    ) -> ReceiverStream<WorkflowEvent> {
        let (tx, rx) = mpsc::channel(128);
        let workflow = self.clone();
        tokio::spawn(async move {
            let mut core = workflow.core.lock().await;
            let mut progressed = false;
            for (request_id, text) in responses {
                if core.consumed.contains(&request_id) {
                    let err = EngineError::DuplicateResponse(request_id);
                    log_run_error(&err);
                    let _ = tx
                        .send(WorkflowEvent::Error {
                            reason: err.reason(),
                            details: err.to_string(),
                        })
                        .await;
                    continue;
                }
                match core.pending.remove(&request_id) {
                    Some(pending) => {
                        core.consumed.insert(request_id.clone());
                        core.inbox.push_back((
                            pending.origin_executor_id,
                            WorkflowMessage::HumanResponse { request_id, text },
                        ));
                        progressed = true;
                    }
                    None => {
                        let err = EngineError::UnknownRequest(request_id);
                        log_run_error(&err);
                        let _ = tx
                            .send(WorkflowEvent::Error {
                                reason: err.reason(),
                                details: err.to_string(),
                            })
                            .await;
                    }
                }
            }
            if !progressed {
                if let Some(status) = workflow.status() {
                    let _ = tx.send(WorkflowEvent::Status(status)).await;
                }
                return;
            }
            workflow.set_status(RunStatus::Running);
            workflow.drain(&mut core, &tx).await;
        });
        ReceiverStream::new(rx)
    }

    /// Drains the inbox strictly FIFO until empty, failure, or cancellation.
    async fn drain(&self, core: &mut RunCore, tx: &mpsc::Sender<WorkflowEvent>) {
        loop {
            if tx.is_closed() {
                self.cancel(core);
                return;
            }
            let Some((target, msg)) = core.inbox.pop_front() else {
                break;
            };
            let kind = msg.kind();
            let Some(executor) = self.executors.get(&target).cloned() else {
                self.fail(
                    core,
                    tx,
                    EngineError::UnroutableMessage {
                        executor_id: target,
                        kind,
                    },
                )
                .await;
                return;
            };
            if !executor.accepts().contains(&kind) {
                self.fail(
                    core,
                    tx,
                    EngineError::UnroutableMessage {
                        executor_id: target,
                        kind,
                    },
                )
                .await;
                return;
            }

            log_dispatch(&target, kind);
            let _ = tx
                .send(WorkflowEvent::ExecutorInvoked {
                    executor_id: target.clone(),
                })
                .await;

            let mut ctx = WorkflowContext::new(
                target.clone(),
                self.edges.get(&target).cloned().unwrap_or_default(),
                tx.clone(),
            );
            match executor.handle(msg, &mut ctx).await {
                Ok(()) => {
                    for action in ctx.into_actions() {
                        match action {
                            PendingAction::Send {
                                target: send_target,
                                message,
                            } => {
                                core.inbox.push_back((send_target, message));
                            }
                            PendingAction::Yield { output } => {
                                core.outputs_emitted += 1;
                                let _ = tx.send(WorkflowEvent::Output { data: output }).await;
                            }
                            PendingAction::Request { request } => {
                                let request_id = Uuid::new_v4().to_string();
                                tracing::debug!(
                                    request_id = %request_id,
                                    origin = %target,
                                    "registered human-input request"
                                );
                                core.pending.insert(
                                    request_id.clone(),
                                    PendingRequest {
                                        origin_executor_id: target.clone(),
                                        request: request.clone(),
                                    },
                                );
                                let _ = tx
                                    .send(WorkflowEvent::RequestInfo {
                                        request_id,
                                        data: request,
                                    })
                                    .await;
                            }
                        }
                    }
                    let _ = tx.send(WorkflowEvent::Status(RunStatus::Running)).await;
                }
                Err(e) => {
                    self.fail(core, tx, e).await;
                    return;
                }
            }
        }

        if !core.pending.is_empty() {
            self.set_status(RunStatus::IdleWithPendingRequests);
            log_run_complete(RunStatus::IdleWithPendingRequests);
            let _ = tx
                .send(WorkflowEvent::Status(RunStatus::IdleWithPendingRequests))
                .await;
            return;
        }
        if core.outputs_emitted > 0 {
            core.terminal = true;
            self.set_status(RunStatus::Completed);
            log_run_complete(RunStatus::Completed);
            let _ = tx.send(WorkflowEvent::Status(RunStatus::Completed)).await;
            return;
        }
        // Inbox drained with nothing yielded and nothing pending: the graph
        // went silent, which no state of the run machine describes as success.
        self.fail(
            core,
            tx,
            EngineError::AgentRunFailure("run ended without output or pending requests".into()),
        )
        .await;
    }

    async fn fail(&self, core: &mut RunCore, tx: &mpsc::Sender<WorkflowEvent>, error: EngineError) {
        log_run_error(&error);
        let _ = tx
            .send(WorkflowEvent::Error {
                reason: error.reason(),
                details: error.to_string(),
            })
            .await;
        core.inbox.clear();
        core.pending.clear();
        core.terminal = true;
        self.set_status(RunStatus::Failed);
        log_run_complete(RunStatus::Failed);
        let _ = tx.send(WorkflowEvent::Status(RunStatus::Failed)).await;
    }

    fn cancel(&self, core: &mut RunCore) {
        let error = EngineError::Cancelled;
        log_run_error(&error);
        core.inbox.clear();
        core.pending.clear();
        core.terminal = true;
        self.set_status(RunStatus::Failed);
        log_run_complete(RunStatus::Failed);
    }
}
