//! Specialist executor: a thin wrapper around one domain agent.
//!
//! Receives a flattened conversation, invokes its agent handle (updates are
//! forwarded live), and sends the reply back to the supervisor. Specialists
//! do not inspect or route, and carry no response schema; their tools run
//! freely during the LLM turn.

use async_trait::async_trait;

use crate::agent::AgentHandle;
use crate::error::EngineError;
use crate::workflow::{
    AgentExecutorResponse, Executor, MessageKind, WorkflowContext, WorkflowMessage,
};

use super::SUPERVISOR_ID;

/// Executor wrapping one schema-free domain agent.
pub struct SpecialistExecutor {
    id: String,
    agent: AgentHandle,
}

impl SpecialistExecutor {
    /// Wraps `agent`; the executor id is the agent's name.
    pub fn new(agent: AgentHandle) -> Self {
        Self {
            id: agent.name().to_string(),
            agent,
        }
    }
}

#[async_trait]
impl Executor for SpecialistExecutor {
    fn id(&self) -> &str {
        &self.id
    }

    fn accepts(&self) -> &'static [MessageKind] {
        &[MessageKind::AgentRequest]
    }

    fn emits(&self) -> &'static [MessageKind] {
        &[MessageKind::AgentResponse]
    }

    async fn handle(
        &self,
        msg: WorkflowMessage,
        ctx: &mut WorkflowContext,
    ) -> Result<(), EngineError> {
        let WorkflowMessage::AgentRequest(request) = msg else {
            return Err(EngineError::UnroutableMessage {
                executor_id: self.id.clone(),
                kind: msg.kind(),
            });
        };
        tracing::info!(specialist = %self.id, "specialist invoked");
        let run = ctx
            .run_agent(&self.agent, &request.messages)
            .await
            .map_err(|e| EngineError::AgentRunFailure(e.to_string()))?;
        let mut full_conversation = request.messages;
        full_conversation.extend(run.messages.iter().cloned());
        ctx.send_message(
            WorkflowMessage::AgentResponse(AgentExecutorResponse {
                executor_id: self.id.clone(),
                run,
                full_conversation,
            }),
            SUPERVISOR_ID,
        )
    }
}
