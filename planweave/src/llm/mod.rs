//! Chat client abstraction consumed by [`crate::agent::AgentHandle`].
//!
//! The engine never talks to an LLM directly; an agent handle drives one
//! configured client through this seam. Prompt execution, retries, and
//! token streaming are the client's concern.
//!
//! # Streaming
//!
//! `complete()` accepts an optional `Sender<MessageChunk>`. Implementations
//! that stream send partial text through the channel as it arrives and still
//! return the complete turn at the end. The default for non-streaming
//! implementations is to send the full content as one chunk.

mod mock;

pub use mock::{MockChatClient, ScriptedTurn};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::message::{ChatMessage, FunctionCall};
use crate::tool::ToolSpec;

/// One chunk of streamed assistant text.
#[derive(Debug, Clone)]
pub struct MessageChunk {
    pub content: String,
}

/// One completed model turn: assistant text and any function calls.
///
/// **Interaction**: Returned by [`ChatClient::complete`]; the agent handle
/// turns it into an assistant [`ChatMessage`] and executes the calls.
#[derive(Debug, Clone)]
pub struct ChatTurn {
    /// Assistant text (may be empty on a pure tool-call turn).
    pub content: String,
    /// Function calls requested this turn; empty means the model is done.
    pub tool_calls: Vec<FunctionCall>,
}

/// Error from the chat transport, reported past the client's own retry policy.
#[derive(Debug, Error)]
pub enum ChatClientError {
    /// The transport failed and the client gave up.
    #[error("chat transport failed: {0}")]
    Transport(String),
}

/// Chat client: given messages and available tools, produces one model turn.
///
/// Implementations: [`MockChatClient`] (scripted turns for tests and the demo
/// driver); real clients wrap an HTTP LLM API and apply their own retry
/// policy before reporting [`ChatClientError::Transport`].
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Runs one model turn over `messages`, advertising `tools`.
    ///
    /// When `chunk_tx` is `Some`, partial assistant text is sent through the
    /// channel as it is produced; the full [`ChatTurn`] is still returned.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<ChatTurn, ChatClientError>;
}
