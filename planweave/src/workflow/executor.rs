//! Executor contract and the per-dispatch workflow context.
//!
//! An executor is a named node with typed inbound handlers. The context is
//! handed to exactly one handler at a time and offers three operations
//! (`send_message`, `yield_output`, `request_info`) plus live agent-update
//! forwarding. Everything enqueued here is applied by the engine after the
//! handler returns, in enqueue order.

use std::collections::HashSet;

use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::agent::{AgentHandle, AgentRun, AgentRunError};
use crate::error::EngineError;
use crate::message::ChatMessage;
use crate::workflow::event::{UpdateForwarder, WorkflowEvent};
use crate::workflow::{HumanFeedbackRequest, MessageKind, WorkflowMessage};

/// A named node in the workflow graph.
///
/// Executors own their private state behind interior mutability; the
/// scheduler never overlaps two handler invocations, but an executor must be
/// safe under re-entry (a later message may arrive while earlier state
/// persists).
#[async_trait]
pub trait Executor: Send + Sync {
    /// Stable id, unique within the graph.
    fn id(&self) -> &str;

    /// Message kinds this executor handles.
    fn accepts(&self) -> &'static [MessageKind];

    /// Message kinds this executor may send on outbound edges.
    fn emits(&self) -> &'static [MessageKind] {
        &[]
    }

    /// Handles one inbound message.
    async fn handle(
        &self,
        msg: WorkflowMessage,
        ctx: &mut WorkflowContext,
    ) -> Result<(), EngineError>;
}

/// Action recorded by a handler, applied by the engine afterwards.
pub(crate) enum PendingAction {
    Send {
        target: String,
        message: WorkflowMessage,
    },
    Yield {
        output: String,
    },
    Request {
        request: HumanFeedbackRequest,
    },
}

/// Context passed to one handler invocation.
pub struct WorkflowContext {
    executor_id: String,
    allowed_targets: HashSet<String>,
    event_tx: mpsc::Sender<WorkflowEvent>,
    actions: Vec<PendingAction>,
}

impl WorkflowContext {
    pub(crate) fn new(
        executor_id: String,
        allowed_targets: HashSet<String>,
        event_tx: mpsc::Sender<WorkflowEvent>,
    ) -> Self {
        Self {
            executor_id,
            allowed_targets,
            event_tx,
            actions: Vec::new(),
        }
    }

    /// Id of the executor this context belongs to.
    pub fn executor_id(&self) -> &str {
        &self.executor_id
    }

    /// Enqueues `msg` for the named executor. Routing is strictly by
    /// `target_id`; the graph must hold an edge from this executor to it.
    pub fn send_message(
        &mut self,
        msg: WorkflowMessage,
        target_id: &str,
    ) -> Result<(), EngineError> {
        if !self.allowed_targets.contains(target_id) {
            return Err(EngineError::UnroutableMessage {
                executor_id: target_id.to_string(),
                kind: msg.kind(),
            });
        }
        self.actions.push(PendingAction::Send {
            target: target_id.to_string(),
            message: msg,
        });
        Ok(())
    }

    /// Emits a terminal workflow output. Multiple yields are permitted; the
    /// final yield plus an empty inbox completes the run.
    pub fn yield_output(&mut self, value: impl Into<String>) {
        self.actions.push(PendingAction::Yield {
            output: value.into(),
        });
    }

    /// Registers a human-input request. The engine assigns a request id,
    /// emits a `RequestInfo` event, and later delivers the response to this
    /// executor as a `HumanResponse` message.
    pub fn request_info(&mut self, request: HumanFeedbackRequest) {
        self.actions.push(PendingAction::Request { request });
    }

    /// Runs an agent with its updates forwarded into the event stream.
    ///
    /// Uses the channel + `tokio::join!` shape so every update is forwarded
    /// before this returns.
    pub async fn run_agent(
        &self,
        agent: &AgentHandle,
        messages: &[ChatMessage],
    ) -> Result<AgentRun, AgentRunError> {
        let forwarder = UpdateForwarder::new(self.event_tx.clone());
        let (update_tx, update_rx) = forwarder.channel();
        let (run, ()) = tokio::join!(
            agent.run(messages, Some(update_tx)),
            forwarder.forward(update_rx),
        );
        run
    }

    pub(crate) fn into_actions(self) -> Vec<PendingAction> {
        self.actions
    }
}
