//! Workflow builder: executors + directed edges, validated at build time.
//!
//! Add executors with `add_executor`, wire edges with `add_edge(from, to)`,
//! name the start executor, then `build()` to get an immutable [`Workflow`].
//! Violations are build-time [`GraphError`]s, never observed at runtime.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use crate::workflow::engine::Workflow;
use crate::workflow::{Executor, MessageKind};

/// Error when building a workflow graph.
#[derive(Debug, Error)]
pub enum GraphError {
    /// Two executors registered the same id.
    #[error("duplicate executor id: {0}")]
    DuplicateExecutor(String),

    /// No start executor was named.
    #[error("workflow has no start executor")]
    MissingStart,

    /// An edge endpoint or the start id is not a registered executor.
    #[error("unknown executor: {0}")]
    UnknownExecutor(String),

    /// The start executor does not accept the initial prompt.
    #[error("start executor '{0}' does not accept the prompt message")]
    StartRejectsPrompt(String),

    /// An edge whose source emits nothing its destination accepts.
    #[error("edge {from} -> {to} has no common message kind")]
    EdgeTypeMismatch {
        /// Source executor id.
        from: String,
        /// Destination executor id.
        to: String,
    },
}

/// Builder for a [`Workflow`].
pub struct WorkflowBuilder {
    id: Option<String>,
    start: Option<String>,
    executors: Vec<Arc<dyn Executor>>,
    edges: Vec<(String, String)>,
}

impl Default for WorkflowBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl WorkflowBuilder {
    /// Creates an empty builder.
    pub fn new() -> Self {
        Self {
            id: None,
            start: None,
            executors: Vec::new(),
            edges: Vec::new(),
        }
    }

    /// Sets a stable workflow id (a uuid is generated otherwise). External
    /// UIs use it to cache routes across rebuilds.
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Registers an executor.
    pub fn add_executor(&mut self, executor: Arc<dyn Executor>) -> &mut Self {
        self.executors.push(executor);
        self
    }

    /// Adds a directed edge. Bidirectional links are two edges.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        self.edges.push((from.into(), to.into()));
        self
    }

    /// Names the start executor; its handler receives the initial prompt.
    pub fn with_start(&mut self, id: impl Into<String>) -> &mut Self {
        self.start = Some(id.into());
        self
    }

    /// Validates the graph and produces an immutable workflow.
    pub fn build(self) -> Result<Workflow, GraphError> {
        let mut executors: HashMap<String, Arc<dyn Executor>> = HashMap::new();
        for executor in self.executors {
            let id = executor.id().to_string();
            if executors.insert(id.clone(), executor).is_some() {
                return Err(GraphError::DuplicateExecutor(id));
            }
        }

        let start = self.start.ok_or(GraphError::MissingStart)?;
        let start_executor = executors
            .get(&start)
            .ok_or_else(|| GraphError::UnknownExecutor(start.clone()))?;
        if !start_executor.accepts().contains(&MessageKind::Prompt) {
            return Err(GraphError::StartRejectsPrompt(start));
        }

        let mut edges: HashMap<String, HashSet<String>> = HashMap::new();
        for (from, to) in self.edges {
            let src = executors
                .get(&from)
                .ok_or_else(|| GraphError::UnknownExecutor(from.clone()))?;
            let dst = executors
                .get(&to)
                .ok_or_else(|| GraphError::UnknownExecutor(to.clone()))?;
            let compatible = src.emits().iter().any(|k| dst.accepts().contains(k));
            if !compatible {
                return Err(GraphError::EdgeTypeMismatch { from, to });
            }
            edges.entry(from).or_default().insert(to);
        }

        let id = self.id.unwrap_or_else(|| Uuid::new_v4().to_string());
        Ok(Workflow::new(id, start, executors, edges))
    }
}
