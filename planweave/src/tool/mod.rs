//! Tool capability abstraction and lifecycle management.
//!
//! Agent handles consume tools during a turn via `invoke`; the driver owns
//! their lifetimes through scoped acquisition ([`ToolScope`]), which
//! guarantees release on every exit path. Implementations include
//! [`StdioTool`] (subprocess-backed transport) and [`MockTool`] (tests).

mod mock;
mod scope;
mod stdio;

pub use mock::MockTool;
pub use scope::{ToolScope, SHUTDOWN_GRACE};
pub use stdio::StdioTool;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Tool operation specification, aligned with MCP `tools/list` result items.
///
/// **Interaction**: Returned by [`Tool::capabilities`]; the agent handle
/// advertises these to its chat client so the model can emit matching calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    /// Operation name (used in `invoke`).
    pub name: String,
    /// Human-readable description for the model.
    pub description: Option<String>,
    /// JSON Schema for arguments.
    pub input_schema: Value,
}

/// Errors from connecting to or invoking a tool.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Connection / scoped acquisition failed. Surfaced at driver startup.
    #[error("tool unavailable: {0}")]
    Unavailable(String),
    /// No operation with the given name.
    #[error("tool operation not found: {0}")]
    NotFound(String),
    /// Arguments rejected by the tool.
    #[error("invalid tool arguments: {0}")]
    InvalidInput(String),
    /// Transport failure during an invocation.
    #[error("tool transport error: {0}")]
    Transport(String),
}

/// An external capability exposed to agent handles.
///
/// Handles returned by constructors are **unconnected**; `connect` is called
/// by [`ToolScope::acquire`]. A tool's own concurrency (e.g. a single stdio
/// pipe) is its responsibility; the engine shares handles read-only.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Connects the underlying transport. No-op for in-process tools.
    async fn connect(&self) -> Result<(), ToolError>;

    /// Orderly shutdown: flush pending I/O and let child processes exit.
    ///
    /// Callers bound this with [`SHUTDOWN_GRACE`]; see [`ToolScope::close`].
    async fn close(&self) -> Result<(), ToolError>;

    /// Forced synchronous release, safe to call from `Drop`.
    fn abort(&self);

    /// Invokes one operation with JSON arguments.
    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError>;

    /// Lists the operations this tool exposes. Empty before `connect` for
    /// transports that discover capabilities remotely.
    fn capabilities(&self) -> Vec<ToolSpec>;
}
