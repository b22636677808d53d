//! # Planweave
//!
//! A single-process, message-passing workflow core for event-planning agents.
//! A supervisor routes work to four domain specialists (venue, budget,
//! catering, logistics), suspends for human input when details are missing,
//! and synthesizes one final itinerary.
//!
//! ## Design principles
//!
//! - **One cooperative scheduler**: a FIFO inbox drained strictly
//!   sequentially; handlers never overlap.
//! - **Typed edges**: executors declare the message kinds they accept and
//!   emit; the builder validates every edge before a run exists.
//! - **Structured output as control flow**: the supervisor's next step is a
//!   tagged [`SupervisorDecision`] matched exhaustively; parse failure is a
//!   distinct outcome with exactly one reprompt.
//! - **Scoped tool lifetimes**: the driver acquires tools through
//!   [`ToolScope`] and release runs on every exit path, cancellation and
//!   unwind included.
//! - **Thread isolation**: tool call/result content is flattened to text
//!   markers before a conversation crosses agents.
//!
//! ## Main modules
//!
//! - [`workflow`]: [`WorkflowBuilder`], [`Workflow`], [`Executor`],
//!   [`WorkflowContext`], [`WorkflowEvent`]: build and run the graph.
//! - [`supervisor`]: [`SupervisorExecutor`], [`SpecialistExecutor`],
//!   [`SupervisorDecision`], [`flatten_tool_content`].
//! - [`agent`]: [`AgentHandle`], [`AgentRun`], [`AgentRunUpdate`].
//! - [`llm`]: [`ChatClient`] trait, [`MockChatClient`].
//! - [`tool`]: [`Tool`], [`ToolScope`], [`StdioTool`], [`MockTool`].
//! - [`message`]: [`ChatMessage`], [`ContentPart`], [`Role`].
//! - [`team`] / [`prompts`]: stock five-agent wiring and its instructions.
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//!
//! use planweave::{
//!     build_event_workflow, decision_schema, prompts, AgentHandle, EventTeam,
//!     MockChatClient, RunStatus, WorkflowEvent,
//! };
//! use tokio_stream::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let client = Arc::new(MockChatClient::with_replies(vec![
//!     r#"{"next_action": "synthesize", "final_plan": "Lunch at noon."}"#,
//! ]));
//! let team = EventTeam {
//!     supervisor: AgentHandle::new("supervisor", prompts::supervisor_instructions(), client.clone())
//!         .with_response_schema(decision_schema()),
//!     venue: AgentHandle::new("venue", prompts::VENUE_INSTRUCTIONS, client.clone()),
//!     budget: AgentHandle::new("budget", prompts::BUDGET_INSTRUCTIONS, client.clone()),
//!     catering: AgentHandle::new("catering", prompts::CATERING_INSTRUCTIONS, client.clone()),
//!     logistics: AgentHandle::new("logistics", prompts::LOGISTICS_INSTRUCTIONS, client.clone()),
//! };
//! let workflow = build_event_workflow(team).expect("valid graph");
//! let mut events = workflow.run_stream("plan a 10-person team lunch");
//! while let Some(event) = events.next().await {
//!     if let WorkflowEvent::Output { data } = event {
//!         println!("{}", data);
//!     }
//! }
//! assert_eq!(workflow.status(), Some(RunStatus::Completed));
//! # }
//! ```

pub mod agent;
pub mod error;
pub mod llm;
pub mod message;
pub mod prompts;
pub mod supervisor;
pub mod team;
pub mod tool;
pub mod workflow;

pub use agent::{AgentHandle, AgentRun, AgentRunError, AgentRunUpdate};
pub use error::{EngineError, ErrorReason};
pub use llm::{ChatClient, ChatClientError, ChatTurn, MessageChunk, MockChatClient, ScriptedTurn};
pub use message::{ChatMessage, ContentPart, FunctionCall, FunctionResult, Role};
pub use supervisor::{
    decision_schema, flatten_tool_content, parse_decision, Specialist, SpecialistExecutor,
    SupervisorDecision, SupervisorExecutor, SUPERVISOR_ID,
};
pub use team::{build_event_workflow, EventTeam};
pub use tool::{MockTool, StdioTool, Tool, ToolError, ToolScope, ToolSpec, SHUTDOWN_GRACE};
pub use workflow::{
    AgentExecutorRequest, AgentExecutorResponse, Executor, GraphError, HumanFeedbackRequest,
    MessageKind, PendingRequest, RequestType, RunStatus, Workflow, WorkflowBuilder,
    WorkflowContext, WorkflowEvent, WorkflowMessage,
};
