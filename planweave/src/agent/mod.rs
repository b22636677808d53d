//! Agent handle: one configured agent invoked via `run(messages)`.
//!
//! Wraps a chat client plus bound tools. `run` drives the model to
//! completion, executing any function calls it emits (looping until the model
//! stops requesting tools or a safety cap is hit), and returns the aggregated
//! [`AgentRun`]. Each invocation is a fresh conversation scope; nothing here
//! relies on service-side thread identity.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tokio::sync::mpsc;

use crate::llm::{ChatClient, ChatTurn};
use crate::message::{ChatMessage, ContentPart, FunctionResult};
use crate::tool::{Tool, ToolSpec};

/// Cap on model/tool rounds within one invocation.
const MAX_TOOL_ROUNDS: usize = 8;

/// Incremental event surfaced while an agent runs. Observability only;
/// routing decisions use the final [`AgentRun`].
#[derive(Debug, Clone)]
pub struct AgentRunUpdate {
    /// Executor on whose behalf the agent is running.
    pub executor_id: String,
    /// Partial text, function calls, or function results.
    pub contents: Vec<ContentPart>,
}

/// Outcome of one agent invocation.
#[derive(Debug, Clone)]
pub struct AgentRun {
    /// Messages produced during this invocation (assistant turns and tool
    /// results, in emission order with matching call ids).
    pub messages: Vec<ChatMessage>,
    /// Terminal assistant text.
    pub text: String,
    /// Parsed structured output; `Some` iff a response schema was configured
    /// and the terminal text parsed as JSON.
    pub value: Option<Value>,
}

/// Unrecoverable agent failure, reported to the invoking executor.
#[derive(Debug, Error)]
pub enum AgentRunError {
    /// The chat transport failed past its retry budget.
    #[error("agent '{agent}' failed: {message}")]
    Failed {
        /// Agent name.
        agent: String,
        /// Transport failure detail.
        message: String,
    },
}

/// A configured agent: model endpoint, instructions, tools, optional schema.
///
/// **Interaction**: Constructed by the driver, owned by an executor, invoked
/// through [`AgentHandle::run`]. The tool set may be empty (a missing tool
/// dependency simply binds nothing).
pub struct AgentHandle {
    name: String,
    instructions: String,
    tools: Vec<Arc<dyn Tool>>,
    response_schema: Option<Value>,
    client: Arc<dyn ChatClient>,
    next_call_ordinal: AtomicU64,
}

impl AgentHandle {
    /// Creates a handle with no tools and no response schema.
    pub fn new(
        name: impl Into<String>,
        instructions: impl Into<String>,
        client: Arc<dyn ChatClient>,
    ) -> Self {
        Self {
            name: name.into(),
            instructions: instructions.into(),
            tools: vec![],
            response_schema: None,
            client,
            next_call_ordinal: AtomicU64::new(1),
        }
    }

    /// Binds tools. Handles are shared read-only capabilities.
    pub fn with_tools(mut self, tools: Vec<Arc<dyn Tool>>) -> Self {
        self.tools = tools;
        self
    }

    /// Configures a structured-response schema; `run` will attempt to parse
    /// the terminal text into [`AgentRun::value`].
    pub fn with_response_schema(mut self, schema: Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    /// Agent name (doubles as the executor id in the stock wiring).
    pub fn name(&self) -> &str {
        &self.name
    }

    fn tool_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().flat_map(|t| t.capabilities()).collect()
    }

    /// Executes one call against whichever bound tool advertises the name.
    ///
    /// Tool-level failures become result content rather than run failures:
    /// the model (and ultimately the supervisor) reacts to them as text.
    async fn execute_call(&self, name: &str, arguments: Value) -> Value {
        for tool in &self.tools {
            if tool.capabilities().iter().any(|s| s.name == name) {
                return match tool.invoke(name, arguments.clone()).await {
                    Ok(value) => value,
                    Err(e) => serde_json::json!({ "error": e.to_string() }),
                };
            }
        }
        serde_json::json!({ "error": format!("no bound tool exposes '{}'", name) })
    }

    async fn emit(
        &self,
        update_tx: &Option<mpsc::Sender<AgentRunUpdate>>,
        contents: Vec<ContentPart>,
    ) {
        if let Some(tx) = update_tx {
            let _ = tx
                .send(AgentRunUpdate {
                    executor_id: self.name.clone(),
                    contents,
                })
                .await;
        }
    }

    /// Drives one agent turn to completion.
    ///
    /// `messages` is the caller's conversation (instructions are prepended
    /// internally). Updates stream through `update_tx` when provided. Tool
    /// calls and their results appear in the returned messages in emission
    /// order with matching call ids.
    pub async fn run(
        &self,
        messages: &[ChatMessage],
        update_tx: Option<mpsc::Sender<AgentRunUpdate>>,
    ) -> Result<AgentRun, AgentRunError> {
        let mut thread = Vec::with_capacity(messages.len() + 1);
        thread.push(ChatMessage::system(&self.instructions));
        thread.extend(messages.iter().cloned());

        let specs = self.tool_specs();
        let mut produced: Vec<ChatMessage> = Vec::new();
        let mut text = String::new();

        for round in 0..MAX_TOOL_ROUNDS {
            let ChatTurn {
                content,
                mut tool_calls,
            } = self
                .client
                .complete(&thread, &specs, None)
                .await
                .map_err(|e| AgentRunError::Failed {
                    agent: self.name.clone(),
                    message: e.to_string(),
                })?;

            // Clients may omit call ids; assign stable ones so results pair up.
            for call in &mut tool_calls {
                if call.call_id.is_empty() {
                    let n = self.next_call_ordinal.fetch_add(1, Ordering::SeqCst);
                    call.call_id = format!("{}-call-{}", self.name, n);
                }
            }

            let assistant = ChatMessage::assistant_with_calls(content.clone(), tool_calls.clone());
            self.emit(&update_tx, assistant.contents.clone()).await;
            thread.push(assistant.clone());
            produced.push(assistant);
            text = content;

            if tool_calls.is_empty() {
                break;
            }
            if round + 1 == MAX_TOOL_ROUNDS {
                tracing::warn!(agent = %self.name, "tool round cap reached, stopping turn");
                break;
            }

            let mut results = Vec::with_capacity(tool_calls.len());
            for call in tool_calls {
                tracing::debug!(agent = %self.name, tool = %call.name, "executing tool call");
                let result = self.execute_call(&call.name, call.arguments).await;
                results.push(FunctionResult {
                    call_id: call.call_id,
                    result,
                });
            }
            let tool_message = ChatMessage::tool_results(results);
            self.emit(&update_tx, tool_message.contents.clone()).await;
            thread.push(tool_message.clone());
            produced.push(tool_message);
        }

        let value = self
            .response_schema
            .as_ref()
            .and_then(|_| parse_structured(&text));
        Ok(AgentRun {
            messages: produced,
            text,
            value,
        })
    }
}

/// Attempts to parse assistant text as a JSON value.
///
/// Accepts raw JSON or JSON embedded in surrounding prose / code fences
/// (first `{` to last `}`). Returns `None` when nothing parses.
fn parse_structured(text: &str) -> Option<Value> {
    let trimmed = text.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        if value.is_object() {
            return Some(value);
        }
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    if end <= start {
        return None;
    }
    serde_json::from_str(&trimmed[start..=end]).ok()
}
