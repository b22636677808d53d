//! Messages carried on workflow edges, and the human-feedback request shape.
//!
//! The engine routes one closed sum type, [`WorkflowMessage`]; executors
//! declare which [`MessageKind`]s they accept and emit, and the builder
//! validates that every edge's outbound/inbound kinds intersect.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

use crate::agent::AgentRun;
use crate::message::ChatMessage;

/// Request sent by the supervisor to a specialist executor.
///
/// The message list has already been through tool-content flattening, so it
/// contains no `FunctionCall` / `FunctionResult` parts.
#[derive(Debug, Clone)]
pub struct AgentExecutorRequest {
    /// Conversation for the specialist's agent, flattened to plain text.
    pub messages: Vec<ChatMessage>,
}

/// Response sent back by a specialist executor after one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentExecutorResponse {
    /// Id of the responding specialist executor.
    pub executor_id: String,
    /// The agent invocation outcome (messages, terminal text, parsed value).
    pub run: AgentRun,
    /// Request messages plus the messages produced during the run.
    pub full_conversation: Vec<ChatMessage>,
}

/// Why the workflow is asking the user for input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestType {
    /// Missing details needed before work can proceed.
    Clarification,
    /// A choice between presented options.
    Selection,
    /// Sign-off on a proposed step.
    Approval,
}

/// A request for human input, registered in the pending-request table.
///
/// The response is free-form text, delivered back to the requesting executor
/// as a [`WorkflowMessage::HumanResponse`].
#[derive(Debug, Clone)]
pub struct HumanFeedbackRequest {
    /// Question shown to the user.
    pub prompt: String,
    /// Extra structured context for UIs.
    pub context: Map<String, Value>,
    /// Kind of input being requested.
    pub request_type: RequestType,
    /// Executor id that raised the request.
    pub requesting_agent: String,
    /// Conversation at the moment of the request.
    pub conversation_snapshot: Vec<ChatMessage>,
}

impl HumanFeedbackRequest {
    /// Creates a clarification request with empty context.
    pub fn clarification(
        prompt: impl Into<String>,
        requesting_agent: impl Into<String>,
        conversation_snapshot: Vec<ChatMessage>,
    ) -> Self {
        Self {
            prompt: prompt.into(),
            context: Map::new(),
            request_type: RequestType::Clarification,
            requesting_agent: requesting_agent.into(),
            conversation_snapshot,
        }
    }
}

/// One entry in the pending-request table.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    /// Executor to which the eventual response is delivered.
    pub origin_executor_id: String,
    /// The request itself.
    pub request: HumanFeedbackRequest,
}

/// A message routed between executors.
#[derive(Debug, Clone)]
pub enum WorkflowMessage {
    /// The initial user prompt, delivered to the start executor.
    Prompt(String),
    /// Supervisor-to-specialist dispatch.
    AgentRequest(AgentExecutorRequest),
    /// Specialist-to-supervisor reply.
    AgentResponse(AgentExecutorResponse),
    /// A human response resolving a pending request.
    HumanResponse {
        /// Id of the pending request this answers.
        request_id: String,
        /// Free-form response text.
        text: String,
    },
}

impl WorkflowMessage {
    /// Discriminant used for handler declaration and edge validation.
    pub fn kind(&self) -> MessageKind {
        match self {
            WorkflowMessage::Prompt(_) => MessageKind::Prompt,
            WorkflowMessage::AgentRequest(_) => MessageKind::AgentRequest,
            WorkflowMessage::AgentResponse(_) => MessageKind::AgentResponse,
            WorkflowMessage::HumanResponse { .. } => MessageKind::HumanResponse,
        }
    }
}

/// Fieldless discriminant of [`WorkflowMessage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MessageKind {
    Prompt,
    AgentRequest,
    AgentResponse,
    HumanResponse,
}

impl fmt::Display for MessageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            MessageKind::Prompt => "prompt",
            MessageKind::AgentRequest => "agent_request",
            MessageKind::AgentResponse => "agent_response",
            MessageKind::HumanResponse => "human_response",
        };
        write!(f, "{}", name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: kind() maps each variant to its discriminant.
    #[test]
    fn message_kind_matches_variant() {
        assert_eq!(
            WorkflowMessage::Prompt("p".into()).kind(),
            MessageKind::Prompt
        );
        assert_eq!(
            WorkflowMessage::AgentRequest(AgentExecutorRequest { messages: vec![] }).kind(),
            MessageKind::AgentRequest
        );
        assert_eq!(
            WorkflowMessage::HumanResponse {
                request_id: "r".into(),
                text: "t".into()
            }
            .kind(),
            MessageKind::HumanResponse
        );
    }

    /// **Scenario**: Display of MessageKind uses snake_case names.
    #[test]
    fn message_kind_display() {
        assert_eq!(MessageKind::AgentResponse.to_string(), "agent_response");
        assert_eq!(MessageKind::HumanResponse.to_string(), "human_response");
    }

    /// **Scenario**: clarification() fills type, agent, and empty context.
    #[test]
    fn clarification_constructor() {
        let req = HumanFeedbackRequest::clarification("how many guests?", "supervisor", vec![]);
        assert_eq!(req.request_type, RequestType::Clarification);
        assert_eq!(req.requesting_agent, "supervisor");
        assert!(req.context.is_empty());
    }
}
