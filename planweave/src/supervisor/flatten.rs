//! Tool-content flattening applied before a conversation crosses agents.
//!
//! A `FunctionResult` whose `call_id` is unknown to the receiving agent's
//! thread is a hard error in typical chat APIs, so call/result parts are
//! rewritten as plain text markers. The markers are stable opaque strings;
//! nothing downstream parses them back.

use serde_json::Value;

use crate::message::{ChatMessage, ContentPart, Role};

/// Renders a result value for a marker: strings raw, everything else as JSON.
fn render_result(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn flatten_message(msg: &ChatMessage) -> ChatMessage {
    let contents = msg
        .contents
        .iter()
        .map(|part| match part {
            ContentPart::Text(t) => ContentPart::Text(t.clone()),
            ContentPart::FunctionCall(c) => {
                ContentPart::Text(format!("[Tool Call: {}({})]", c.name, c.arguments))
            }
            ContentPart::FunctionResult(r) => ContentPart::Text(format!(
                "[Tool Result {}: {}]",
                r.call_id,
                render_result(&r.result)
            )),
        })
        .collect();
    // A tool-role message without a live call binding is exactly the
    // cross-thread hazard this conversion removes.
    let role = if msg.role == Role::Tool {
        Role::User
    } else {
        msg.role
    };
    ChatMessage { role, contents }
}

/// Flattens `FunctionCall` / `FunctionResult` parts into text markers,
/// preserving order. Idempotent: a flattened conversation passes through
/// unchanged.
pub fn flatten_tool_content(messages: &[ChatMessage]) -> Vec<ChatMessage> {
    messages.iter().map(flatten_message).collect()
}
