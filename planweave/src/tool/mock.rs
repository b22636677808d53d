//! Mock tool for tests: fixed capabilities, canned results, lifecycle flags.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::Value;

use super::{Tool, ToolError, ToolSpec};

/// In-process mock tool.
///
/// Exposes one operation per canned result registered with `with_result`.
/// Lifecycle transitions are recorded so tests can assert scoped release.
///
/// **Interaction**: Implements [`Tool`]; used by agent-handle and supervisor
/// tests and by [`crate::tool::ToolScope`] unit tests.
pub struct MockTool {
    name: String,
    results: Mutex<Vec<(String, Value)>>,
    invocations: Mutex<Vec<(String, Value)>>,
    connected: AtomicBool,
    closed: AtomicBool,
    aborted: AtomicBool,
    fail_connect: bool,
}

impl MockTool {
    /// Creates a mock with no operations.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            results: Mutex::new(vec![]),
            invocations: Mutex::new(vec![]),
            connected: AtomicBool::new(false),
            closed: AtomicBool::new(false),
            aborted: AtomicBool::new(false),
            fail_connect: false,
        }
    }

    /// Registers an operation returning a fixed result.
    pub fn with_result(self, operation: impl Into<String>, result: Value) -> Self {
        if let Ok(mut results) = self.results.lock() {
            results.push((operation.into(), result));
        }
        self
    }

    /// Makes `connect` fail, for acquisition-failure tests.
    pub fn failing_connect(mut self) -> Self {
        self.fail_connect = true;
        self
    }

    /// True once `connect` succeeded.
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::SeqCst)
    }

    /// True once `close` ran.
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    /// True once `abort` ran (forced release path).
    pub fn was_aborted(&self) -> bool {
        self.aborted.load(Ordering::SeqCst)
    }

    /// Operations invoked so far, in order.
    pub fn invocations(&self) -> Vec<(String, Value)> {
        self.invocations.lock().map(|v| v.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl Tool for MockTool {
    async fn connect(&self) -> Result<(), ToolError> {
        if self.fail_connect {
            return Err(ToolError::Unavailable(format!(
                "{}: connect refused",
                self.name
            )));
        }
        self.connected.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn close(&self) -> Result<(), ToolError> {
        self.closed.store(true, Ordering::SeqCst);
        Ok(())
    }

    fn abort(&self) {
        self.aborted.store(true, Ordering::SeqCst);
    }

    async fn invoke(&self, name: &str, arguments: Value) -> Result<Value, ToolError> {
        let result = {
            let results = self
                .results
                .lock()
                .map_err(|e| ToolError::Transport(e.to_string()))?;
            results
                .iter()
                .find(|(op, _)| op == name)
                .map(|(_, r)| r.clone())
        };
        let result = result.ok_or_else(|| ToolError::NotFound(name.to_string()))?;
        if let Ok(mut invocations) = self.invocations.lock() {
            invocations.push((name.to_string(), arguments));
        }
        Ok(result)
    }

    fn capabilities(&self) -> Vec<ToolSpec> {
        self.results
            .lock()
            .map(|results| {
                results
                    .iter()
                    .map(|(op, _)| ToolSpec {
                        name: op.clone(),
                        description: Some(format!("{} via {}", op, self.name)),
                        input_schema: serde_json::json!({"type": "object"}),
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: invoke returns the canned result and records the call.
    #[tokio::test]
    async fn invoke_returns_canned_result() {
        let tool = MockTool::new("weather").with_result(
            "get_forecast",
            serde_json::json!({"high": 72, "conditions": "sunny"}),
        );
        let out = tool
            .invoke("get_forecast", serde_json::json!({"city": "Seattle"}))
            .await
            .unwrap();
        assert_eq!(out["high"], 72);
        let calls = tool.invocations();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "get_forecast");
    }

    /// **Scenario**: invoking an unregistered operation yields NotFound.
    #[tokio::test]
    async fn invoke_unknown_operation_not_found() {
        let tool = MockTool::new("weather");
        let err = tool.invoke("nope", serde_json::json!({})).await;
        assert!(matches!(err, Err(ToolError::NotFound(_))));
    }

    /// **Scenario**: capabilities lists one spec per registered operation.
    #[test]
    fn capabilities_one_spec_per_operation() {
        let tool = MockTool::new("calendar")
            .with_result("check_date", serde_json::json!("free"))
            .with_result("book_date", serde_json::json!("booked"));
        let specs = tool.capabilities();
        assert_eq!(specs.len(), 2);
        assert_eq!(specs[0].name, "check_date");
    }
}
