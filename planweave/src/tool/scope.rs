//! Scoped tool acquisition: connect on entry, guaranteed release on exit.
//!
//! The driver acquires scopes at its outermost frame and passes the handles
//! by value into the workflow builder. Explicit `close()` gives the tool a
//! bounded grace period for orderly shutdown; if the scope is instead dropped
//! (error, cancellation, panic/unwind), the tool is force-released.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use super::{Tool, ToolError};

/// Grace period an orderly `close()` waits before forcing termination.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(5);

/// A live, connected tool acquisition.
///
/// Each `acquire` produces an independent instance; there is no global
/// singleton per tool type. The handle is shared read-only with any executor
/// holding a clone for the duration of the scope.
pub struct ToolScope {
    tool: Arc<dyn Tool>,
    released: AtomicBool,
}

impl ToolScope {
    /// Connects `tool` and returns the scope guarding its release.
    ///
    /// Connection failure is [`ToolError::Unavailable`]; the caller may retry
    /// or proceed without the tool (agents accept empty tool sets).
    pub async fn acquire(tool: Arc<dyn Tool>) -> Result<Self, ToolError> {
        tool.connect()
            .await
            .map_err(|e| ToolError::Unavailable(e.to_string()))?;
        Ok(Self {
            tool,
            released: AtomicBool::new(false),
        })
    }

    /// The connected handle, for passing into agent construction.
    pub fn tool(&self) -> Arc<dyn Tool> {
        Arc::clone(&self.tool)
    }

    /// Orderly release: waits up to [`SHUTDOWN_GRACE`] for `close()`, then
    /// forces termination.
    pub async fn close(self) -> Result<(), ToolError> {
        self.released.store(true, Ordering::SeqCst);
        match tokio::time::timeout(SHUTDOWN_GRACE, self.tool.close()).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!("tool close exceeded grace period, forcing termination");
                self.tool.abort();
                Ok(())
            }
        }
    }
}

impl Drop for ToolScope {
    fn drop(&mut self) {
        if !self.released.load(Ordering::SeqCst) {
            self.tool.abort();
        }
    }
}
