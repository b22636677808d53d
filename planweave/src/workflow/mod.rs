//! Workflow graph, executor contract, engine, and streamed events.
//!
//! Build a graph with [`WorkflowBuilder`], then drive it with
//! [`Workflow::run_stream`] and resume suspended runs with
//! [`Workflow::send_responses_streaming`].

mod builder;
mod engine;
mod envelope;
mod event;
mod executor;
mod logging;

pub use builder::{GraphError, WorkflowBuilder};
pub use engine::Workflow;
pub use envelope::{
    AgentExecutorRequest, AgentExecutorResponse, HumanFeedbackRequest, MessageKind,
    PendingRequest, RequestType, WorkflowMessage,
};
pub use event::{RunStatus, UpdateForwarder, WorkflowEvent};
pub use executor::{Executor, WorkflowContext};
pub use logging::{log_dispatch, log_run_complete, log_run_error};
