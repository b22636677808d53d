//! Supervisor executor: the routing node that drives the high-level plan.
//!
//! The only executor that interprets domain semantics. Each inbound message
//! advances a phase machine (start → await-specialist / await-user → done)
//! and triggers one structured decision from the supervisor agent: route to a
//! specialist, request human input, or synthesize the final plan.

mod decision;
mod flatten;
mod specialist;

pub use decision::{decision_schema, parse_decision, Specialist, SupervisorDecision};
pub use flatten::flatten_tool_content;
pub use specialist::SpecialistExecutor;

use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;

use crate::agent::AgentHandle;
use crate::error::EngineError;
use crate::message::ChatMessage;
use crate::prompts;
use crate::workflow::{
    AgentExecutorRequest, Executor, HumanFeedbackRequest, MessageKind, WorkflowContext,
    WorkflowMessage,
};

/// Executor id of the supervisor node.
pub const SUPERVISOR_ID: &str = "supervisor";

/// Where the supervisor is in its conversation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Start,
    AwaitSpecialist,
    AwaitUser,
    Done,
}

struct SupervisorState {
    phase: Phase,
    conversation: Vec<ChatMessage>,
}

/// The routing executor, driven by [`SupervisorDecision`] outputs.
pub struct SupervisorExecutor {
    agent: AgentHandle,
    state: Mutex<SupervisorState>,
}

impl SupervisorExecutor {
    /// Wraps the supervisor agent (configure it with
    /// [`decision_schema`]-bearing instructions and a response schema).
    pub fn new(agent: AgentHandle) -> Self {
        Self {
            agent,
            state: Mutex::new(SupervisorState {
                phase: Phase::Start,
                conversation: Vec::new(),
            }),
        }
    }

    fn state(&self) -> Result<MutexGuard<'_, SupervisorState>, EngineError> {
        self.state
            .lock()
            .map_err(|_| EngineError::AgentRunFailure("supervisor state poisoned".into()))
    }

    /// Invokes the supervisor agent for a decision, retrying exactly once
    /// with a schema restatement when the first output does not parse.
    async fn decide(&self, ctx: &WorkflowContext) -> Result<SupervisorDecision, EngineError> {
        let conversation = self.state()?.conversation.clone();
        let run = ctx
            .run_agent(&self.agent, &conversation)
            .await
            .map_err(|e| EngineError::AgentRunFailure(e.to_string()))?;
        if let Some(decision) = parse_decision(run.value.as_ref()) {
            return Ok(decision);
        }
        tracing::warn!(text = %run.text, "supervisor decision did not parse, reprompting once");
        let mut retry = conversation;
        retry.push(ChatMessage::system(prompts::schema_reminder()));
        let run = ctx
            .run_agent(&self.agent, &retry)
            .await
            .map_err(|e| EngineError::AgentRunFailure(e.to_string()))?;
        parse_decision(run.value.as_ref()).ok_or_else(|| {
            EngineError::StructuredOutputParseFailure(format!(
                "supervisor returned an unparseable decision twice: {}",
                run.text
            ))
        })
    }

    async fn dispatch(&self, ctx: &mut WorkflowContext) -> Result<(), EngineError> {
        let decision = self.decide(ctx).await?;
        match decision {
            SupervisorDecision::Route {
                target_specialist,
                message_to_specialist,
            } => {
                tracing::info!(target = %target_specialist.executor_id(), "routing to specialist");
                let messages = {
                    let mut state = self.state()?;
                    state
                        .conversation
                        .push(ChatMessage::assistant(message_to_specialist));
                    state.phase = Phase::AwaitSpecialist;
                    flatten_tool_content(&state.conversation)
                };
                ctx.send_message(
                    WorkflowMessage::AgentRequest(AgentExecutorRequest { messages }),
                    target_specialist.executor_id(),
                )
            }
            SupervisorDecision::RequestInput { prompt_to_user } => {
                tracing::info!("requesting human input");
                let snapshot = {
                    let mut state = self.state()?;
                    state.phase = Phase::AwaitUser;
                    state.conversation.clone()
                };
                ctx.request_info(HumanFeedbackRequest::clarification(
                    prompt_to_user,
                    SUPERVISOR_ID,
                    snapshot,
                ));
                Ok(())
            }
            SupervisorDecision::Synthesize { final_plan } => {
                if final_plan.trim().is_empty() {
                    return Err(EngineError::StructuredOutputParseFailure(
                        "synthesize decision carried an empty final_plan".into(),
                    ));
                }
                tracing::info!("synthesizing final plan");
                {
                    let mut state = self.state()?;
                    state
                        .conversation
                        .push(ChatMessage::assistant(final_plan.clone()));
                    state.phase = Phase::Done;
                }
                ctx.yield_output(final_plan);
                Ok(())
            }
        }
    }
}

#[async_trait]
impl Executor for SupervisorExecutor {
    fn id(&self) -> &str {
        SUPERVISOR_ID
    }

    fn accepts(&self) -> &'static [MessageKind] {
        &[
            MessageKind::Prompt,
            MessageKind::AgentResponse,
            MessageKind::HumanResponse,
        ]
    }

    fn emits(&self) -> &'static [MessageKind] {
        &[MessageKind::AgentRequest]
    }

    async fn handle(
        &self,
        msg: WorkflowMessage,
        ctx: &mut WorkflowContext,
    ) -> Result<(), EngineError> {
        let kind = msg.kind();
        let expected = match kind {
            MessageKind::Prompt => Phase::Start,
            MessageKind::AgentResponse => Phase::AwaitSpecialist,
            MessageKind::HumanResponse => Phase::AwaitUser,
            MessageKind::AgentRequest => Phase::Done,
        };
        {
            let mut state = self.state()?;
            if state.phase != expected || expected == Phase::Done {
                return Err(EngineError::UnroutableMessage {
                    executor_id: SUPERVISOR_ID.into(),
                    kind,
                });
            }
            match msg {
                WorkflowMessage::Prompt(prompt) => {
                    state.conversation.push(ChatMessage::user(prompt));
                }
                WorkflowMessage::AgentResponse(response) => {
                    // The specialist's reply plus its tool activity, with
                    // call/result parts already reduced to opaque markers so
                    // they can cross into this and later agent threads.
                    let body = flatten_tool_content(&response.run.messages)
                        .iter()
                        .map(ChatMessage::text)
                        .filter(|t| !t.is_empty())
                        .collect::<Vec<_>>()
                        .join("\n");
                    state.conversation.push(ChatMessage::user(format!(
                        "[{} specialist] {}",
                        response.executor_id, body
                    )));
                }
                WorkflowMessage::HumanResponse { text, .. } => {
                    state.conversation.push(ChatMessage::user(text));
                }
                WorkflowMessage::AgentRequest(_) => {
                    return Err(EngineError::UnroutableMessage {
                        executor_id: SUPERVISOR_ID.into(),
                        kind,
                    });
                }
            }
        }
        self.dispatch(ctx).await
    }
}
