//! Mock chat client for tests and the demo driver.
//!
//! Plays back a scripted queue of turns: plain text, tool calls, or a hard
//! transport failure. Each `complete()` consumes one turn; an exhausted
//! script is a transport error so tests fail loudly instead of looping.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::mpsc;

use crate::message::{ChatMessage, FunctionCall};
use crate::tool::ToolSpec;

use super::{ChatClient, ChatClientError, ChatTurn, MessageChunk};

/// One scripted model turn.
#[derive(Debug, Clone)]
pub struct ScriptedTurn {
    content: String,
    tool_calls: Vec<FunctionCall>,
    fail: Option<String>,
}

impl ScriptedTurn {
    /// A text-only turn (no tool calls; the model is done).
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![],
            fail: None,
        }
    }

    /// A turn that emits one tool call alongside optional text.
    pub fn tool_call(
        content: impl Into<String>,
        call_id: impl Into<String>,
        name: impl Into<String>,
        arguments: Value,
    ) -> Self {
        Self {
            content: content.into(),
            tool_calls: vec![FunctionCall {
                call_id: call_id.into(),
                name: name.into(),
                arguments,
            }],
            fail: None,
        }
    }

    /// A turn that fails with a transport error.
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            tool_calls: vec![],
            fail: Some(message.into()),
        }
    }
}

/// Mock client: consumes scripted turns in order.
///
/// **Interaction**: Implements [`ChatClient`]; used by engine and supervisor
/// tests, and by the demo CLI team.
pub struct MockChatClient {
    script: Mutex<VecDeque<ScriptedTurn>>,
}

impl MockChatClient {
    /// Creates a client playing back `turns` in order.
    pub fn scripted(turns: Vec<ScriptedTurn>) -> Self {
        Self {
            script: Mutex::new(turns.into()),
        }
    }

    /// Convenience: a client whose every turn is plain text, in order.
    pub fn with_replies(replies: Vec<&str>) -> Self {
        Self::scripted(replies.into_iter().map(ScriptedTurn::text).collect())
    }
}

#[async_trait]
impl ChatClient for MockChatClient {
    async fn complete(
        &self,
        _messages: &[ChatMessage],
        _tools: &[ToolSpec],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<ChatTurn, ChatClientError> {
        let turn = {
            let mut script = self
                .script
                .lock()
                .map_err(|e| ChatClientError::Transport(e.to_string()))?;
            script.pop_front()
        };
        let turn =
            turn.ok_or_else(|| ChatClientError::Transport("mock script exhausted".into()))?;
        if let Some(msg) = turn.fail {
            return Err(ChatClientError::Transport(msg));
        }
        if let Some(tx) = chunk_tx {
            if !turn.content.is_empty() {
                let _ = tx
                    .send(MessageChunk {
                        content: turn.content.clone(),
                    })
                    .await;
            }
        }
        Ok(ChatTurn {
            content: turn.content,
            tool_calls: turn.tool_calls,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Turns are consumed in order; exhaustion is a transport error.
    #[tokio::test]
    async fn scripted_turns_in_order_then_exhausted() {
        let client = MockChatClient::with_replies(vec!["first", "second"]);
        let t1 = client.complete(&[], &[], None).await.unwrap();
        assert_eq!(t1.content, "first");
        let t2 = client.complete(&[], &[], None).await.unwrap();
        assert_eq!(t2.content, "second");
        let err = client.complete(&[], &[], None).await;
        assert!(matches!(err, Err(ChatClientError::Transport(_))));
    }

    /// **Scenario**: A failure turn surfaces as a transport error with its message.
    #[tokio::test]
    async fn failure_turn_is_transport_error() {
        let client = MockChatClient::scripted(vec![ScriptedTurn::failure("503 upstream")]);
        match client.complete(&[], &[], None).await {
            Err(ChatClientError::Transport(msg)) => assert!(msg.contains("503"), "{}", msg),
            other => panic!("expected Transport error, got {:?}", other.map(|t| t.content)),
        }
    }

    /// **Scenario**: With a chunk channel, content arrives as one chunk.
    #[tokio::test]
    async fn streams_content_as_single_chunk() {
        let client = MockChatClient::with_replies(vec!["hello"]);
        let (tx, mut rx) = mpsc::channel(8);
        let turn = client.complete(&[], &[], Some(tx)).await.unwrap();
        assert_eq!(turn.content, "hello");
        let chunk = rx.recv().await.expect("one chunk");
        assert_eq!(chunk.content, "hello");
    }
}
