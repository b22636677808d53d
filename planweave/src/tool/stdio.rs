//! Subprocess-backed tool transport speaking line-delimited JSON-RPC.
//!
//! Spawns the server process on `connect`, initializes it, and maps
//! `tools/list` / `tools/call` onto the [`Tool`] contract. Child stderr is
//! discarded unless `stderr_verbose` is set. The child is spawned with
//! kill-on-drop so a dropped scope cannot leak the process; orderly `close`
//! drops stdin and waits for exit (bounded by the scope's grace period).

use std::process::Stdio;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex as StdMutex;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tokio::sync::Mutex;

use super::{Tool, ToolError, ToolSpec};

/// How long one JSON-RPC request waits for its response.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

struct StdioSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
}

/// Tool backed by a subprocess JSON-RPC server over stdio.
///
/// Constructed unconnected; [`crate::tool::ToolScope::acquire`] spawns the
/// process. Requests are serialized behind a mutex: the single stdio pipe is
/// this transport's own concurrency concern.
pub struct StdioTool {
    command: String,
    args: Vec<String>,
    env: Vec<(String, String)>,
    stderr_verbose: bool,
    session: Mutex<Option<StdioSession>>,
    specs: StdMutex<Vec<ToolSpec>>,
    next_id: AtomicU64,
}

impl StdioTool {
    /// Creates an unconnected handle for `command args...`.
    ///
    /// The child inherits only its default environment; use `with_env` for
    /// servers that need credentials.
    pub fn new(command: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            command: command.into(),
            args,
            env: vec![],
            stderr_verbose: false,
            session: Mutex::new(None),
            specs: StdMutex::new(vec![]),
            next_id: AtomicU64::new(1),
        }
    }

    /// Adds env vars passed to the server process.
    pub fn with_env(
        mut self,
        env: impl IntoIterator<Item = (impl Into<String>, impl Into<String>)>,
    ) -> Self {
        self.env = env
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        self
    }

    /// Lets the child write to stderr (quiet by default).
    pub fn with_stderr_verbose(mut self, verbose: bool) -> Self {
        self.stderr_verbose = verbose;
        self
    }

    fn fresh_id(&self) -> String {
        format!("planweave-{}", self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    async fn request(
        &self,
        session: &mut StdioSession,
        method: &str,
        params: Value,
    ) -> Result<Value, ToolError> {
        let id = self.fresh_id();
        let request = serde_json::json!({
            "jsonrpc": "2.0",
            "id": id,
            "method": method,
            "params": params,
        });
        let mut line = request.to_string();
        line.push('\n');
        session
            .stdin
            .write_all(line.as_bytes())
            .await
            .map_err(|e| ToolError::Transport(format!("write {}: {}", method, e)))?;
        session
            .stdin
            .flush()
            .await
            .map_err(|e| ToolError::Transport(e.to_string()))?;

        let response = tokio::time::timeout(REQUEST_TIMEOUT, async {
            // Skip notifications and unrelated ids until ours arrives.
            loop {
                let mut buf = String::new();
                let n = session
                    .stdout
                    .read_line(&mut buf)
                    .await
                    .map_err(|e| ToolError::Transport(format!("read {}: {}", method, e)))?;
                if n == 0 {
                    return Err(ToolError::Transport(format!(
                        "server closed pipe during {}",
                        method
                    )));
                }
                let Ok(value) = serde_json::from_str::<Value>(&buf) else {
                    continue;
                };
                if value.get("id").and_then(Value::as_str) == Some(id.as_str()) {
                    return Ok(value);
                }
            }
        })
        .await
        .map_err(|_| ToolError::Transport(format!("timeout waiting for {}", method)))??;

        if let Some(err) = response.get("error") {
            let msg = err
                .get("message")
                .and_then(Value::as_str)
                .unwrap_or("unknown JSON-RPC error");
            return Err(ToolError::Transport(msg.to_string()));
        }
        response
            .get("result")
            .cloned()
            .ok_or_else(|| ToolError::Transport(format!("no result in {} response", method)))
    }
}

/// Parses a `tools/list` result into specs.
fn parse_list_result(result: &Value) -> Result<Vec<ToolSpec>, ToolError> {
    let tools = result
        .get("tools")
        .and_then(Value::as_array)
        .ok_or_else(|| ToolError::Transport("tools/list result has no tools array".into()))?;
    let mut specs = Vec::with_capacity(tools.len());
    for t in tools {
        specs.push(ToolSpec {
            name: t
                .get("name")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            description: t
                .get("description")
                .and_then(Value::as_str)
                .map(String::from),
            input_schema: t
                .get("inputSchema")
                .cloned()
                .unwrap_or_else(|| Value::Object(serde_json::Map::new())),
        });
    }
    Ok(specs)
}

/// Extracts a result value from a `tools/call` response: joined text blocks,
/// or `structuredContent` when no text is present.
fn parse_call_result(result: &Value) -> Result<Value, ToolError> {
    if result
        .get("isError")
        .and_then(Value::as_bool)
        .unwrap_or(false)
    {
        let msg = result
            .get("content")
            .and_then(Value::as_array)
            .and_then(|a| a.first())
            .and_then(|b| b.get("text").and_then(Value::as_str))
            .unwrap_or("tool returned error");
        return Err(ToolError::Transport(msg.to_string()));
    }
    let mut parts = Vec::new();
    if let Some(blocks) = result.get("content").and_then(Value::as_array) {
        for block in blocks {
            if block.get("type").and_then(Value::as_str) == Some("text") {
                if let Some(text) = block.get("text").and_then(Value::as_str) {
                    parts.push(text);
                }
            }
        }
    }
    let text = parts.join("\n").trim().to_string();
    if !text.is_empty() {
        return Ok(Value::String(text));
    }
    if let Some(structured) = result.get("structuredContent") {
        return Ok(structured.clone());
    }
    Err(ToolError::Transport(
        "no text or structuredContent in tools/call response".into(),
    ))
}

#[async_trait]
impl Tool for StdioTool {
    async fn connect(&self) -> Result<(), ToolError> {
        let mut command = Command::new(&self.command);
        command
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(if self.stderr_verbose {
                Stdio::inherit()
            } else {
                Stdio::null()
            })
            .kill_on_drop(true);
        for (key, value) in &self.env {
            command.env(key, value);
        }
        let mut child = command
            .spawn()
            .map_err(|e| ToolError::Unavailable(format!("spawn {}: {}", self.command, e)))?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| ToolError::Unavailable("child stdin unavailable".into()))?;
        let stdout = child
            .stdout
            .take()
            .map(BufReader::new)
            .ok_or_else(|| ToolError::Unavailable("child stdout unavailable".into()))?;

        let mut session = StdioSession {
            child,
            stdin,
            stdout,
        };
        self.request(
            &mut session,
            "initialize",
            serde_json::json!({"clientInfo": {"name": "planweave"}}),
        )
        .await
        .map_err(|e| ToolError::Unavailable(e.to_string()))?;
        let listed = self
            .request(&mut session, "tools/list", Value::Object(serde_json::Map::new()))
            .await
            .map_err(|e| ToolError::Unavailable(e.to_string()))?;
        let specs = parse_list_result(&listed).map_err(|e| ToolError::Unavailable(e.to_string()))?;
        if let Ok(mut cached) = self.specs.lock() {
            *cached = specs;
        }
        *self.session.lock().await = Some(session);
        Ok(())
    }

    async fn close(&self) -> Result<(), ToolError> {
        let session = self.session.lock().await.take();
        let Some(session) = session else {
            return Ok(());
        };
        let StdioSession {
            mut child,
            stdin,
            stdout,
        } = session;
        // Closing stdin signals the server to exit.
        drop(stdin);
        drop(stdout);
        let _ = child.wait().await;
        Ok(())
    }

    fn abort(&self) {
        if let Ok(mut guard) = self.session.try_lock() {
            if let Some(mut session) = guard.take() {
                let _ = session.child.start_kill();
            }
        }
    }

    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let mut guard = self.session.lock().await;
        let session = guard
            .as_mut()
            .ok_or_else(|| ToolError::Unavailable("not connected".into()))?;
        let params = serde_json::json!({ "name": name, "arguments": arguments });
        let result = self.request(session, "tools/call", params).await?;
        parse_call_result(&result)
    }

    fn capabilities(&self) -> Vec<ToolSpec> {
        self.specs.lock().map(|s| s.clone()).unwrap_or_default()
    }
}
