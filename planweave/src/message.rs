//! Chat message types shared by agents and the workflow engine.
//!
//! A message is a role-tagged container with an ordered list of content parts.
//! Tool invocations appear as `FunctionCall` / `FunctionResult` parts whose
//! `call_id`s pair up within one agent's thread. That pairing is local to the
//! emitting agent; see [`crate::supervisor::flatten_tool_content`] for the
//! conversion applied before a conversation crosses to another agent.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Role of a chat message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// System instructions; typically first in the list.
    System,
    /// User (or human-response) input.
    User,
    /// Model output: text and/or function calls.
    Assistant,
    /// Function results produced by executing an assistant's calls.
    Tool,
}

/// A function call emitted by the model during a turn.
///
/// **Interaction**: Appears as a [`ContentPart::FunctionCall`] inside an
/// assistant message; the matching result carries the same `call_id`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    /// Identifier pairing this call with its result within one thread.
    pub call_id: String,
    /// Tool operation name (e.g. an MCP tools/call name).
    pub name: String,
    /// JSON arguments for the call.
    pub arguments: Value,
}

/// The result of executing one function call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResult {
    /// `call_id` of the call this result answers.
    pub call_id: String,
    /// JSON result payload (text results are JSON strings).
    pub result: Value,
}

/// One content part of a chat message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContentPart {
    /// Plain text.
    Text(String),
    /// A function call emitted by the model.
    FunctionCall(FunctionCall),
    /// A result for a prior function call in the same thread.
    FunctionResult(FunctionResult),
}

impl ContentPart {
    /// Returns the text when this part is `Text`, otherwise `None`.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ContentPart::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// A single message in a conversation: role plus ordered content parts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Who produced the message.
    pub role: Role,
    /// Ordered content parts.
    pub contents: Vec<ContentPart>,
}

impl ChatMessage {
    /// Creates a system message with one text part.
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            contents: vec![ContentPart::Text(content.into())],
        }
    }

    /// Creates a user message with one text part.
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            contents: vec![ContentPart::Text(content.into())],
        }
    }

    /// Creates an assistant message with one text part.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            contents: vec![ContentPart::Text(content.into())],
        }
    }

    /// Creates an assistant message carrying text plus function calls.
    ///
    /// Empty text yields no `Text` part, so a pure tool-call turn contains
    /// only `FunctionCall` parts.
    pub fn assistant_with_calls(content: impl Into<String>, calls: Vec<FunctionCall>) -> Self {
        let text = content.into();
        let mut contents = Vec::with_capacity(calls.len() + 1);
        if !text.is_empty() {
            contents.push(ContentPart::Text(text));
        }
        contents.extend(calls.into_iter().map(ContentPart::FunctionCall));
        Self {
            role: Role::Assistant,
            contents,
        }
    }

    /// Creates a tool message carrying function results.
    pub fn tool_results(results: Vec<FunctionResult>) -> Self {
        Self {
            role: Role::Tool,
            contents: results.into_iter().map(ContentPart::FunctionResult).collect(),
        }
    }

    /// Concatenates all text parts of this message.
    pub fn text(&self) -> String {
        self.contents
            .iter()
            .filter_map(ContentPart::as_text)
            .collect::<Vec<_>>()
            .join("")
    }

    /// True when any part is a `FunctionCall` or `FunctionResult`.
    pub fn has_tool_content(&self) -> bool {
        self.contents.iter().any(|p| {
            matches!(
                p,
                ContentPart::FunctionCall(_) | ContentPart::FunctionResult(_)
            )
        })
    }
}
