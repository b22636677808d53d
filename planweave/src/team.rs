//! Stock wiring of the event-planning workflow.
//!
//! One supervisor, four specialists, bidirectional edges, start at the
//! supervisor. The specialist agents must be named `venue`, `budget`,
//! `catering`, and `logistics`: the ids the supervisor routes to.

use std::sync::Arc;

use crate::agent::AgentHandle;
use crate::supervisor::{Specialist, SpecialistExecutor, SupervisorExecutor, SUPERVISOR_ID};
use crate::workflow::{GraphError, Workflow, WorkflowBuilder};

/// The five agents of the stock event-planning team.
pub struct EventTeam {
    pub supervisor: AgentHandle,
    pub venue: AgentHandle,
    pub budget: AgentHandle,
    pub catering: AgentHandle,
    pub logistics: AgentHandle,
}

/// Builds the supervisor-plus-specialists workflow from a team.
pub fn build_event_workflow(team: EventTeam) -> Result<Workflow, GraphError> {
    let specialists = [team.venue, team.budget, team.catering, team.logistics];
    for (agent, expected) in specialists.iter().zip(Specialist::ALL) {
        if agent.name() != expected.executor_id() {
            return Err(GraphError::UnknownExecutor(expected.executor_id().into()));
        }
    }

    let mut builder = WorkflowBuilder::new();
    builder.add_executor(Arc::new(SupervisorExecutor::new(team.supervisor)));
    for agent in specialists {
        let id = agent.name().to_string();
        builder.add_executor(Arc::new(SpecialistExecutor::new(agent)));
        builder.add_edge(SUPERVISOR_ID, id.clone());
        builder.add_edge(id, SUPERVISOR_ID);
    }
    builder.with_start(SUPERVISOR_ID);
    builder.build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::llm::MockChatClient;

    fn agent(name: &str) -> AgentHandle {
        AgentHandle::new(name, "test", Arc::new(MockChatClient::with_replies(vec![])))
    }

    /// **Scenario**: A correctly named team builds a five-node workflow.
    #[test]
    fn stock_team_builds() {
        let workflow = build_event_workflow(EventTeam {
            supervisor: agent("supervisor"),
            venue: agent("venue"),
            budget: agent("budget"),
            catering: agent("catering"),
            logistics: agent("logistics"),
        })
        .expect("valid team");
        assert!(!workflow.id().is_empty());
    }

    /// **Scenario**: A misnamed specialist is rejected at build time.
    #[test]
    fn misnamed_specialist_rejected() {
        let err = build_event_workflow(EventTeam {
            supervisor: agent("supervisor"),
            venue: agent("rooms"),
            budget: agent("budget"),
            catering: agent("catering"),
            logistics: agent("logistics"),
        });
        assert!(matches!(err, Err(GraphError::UnknownExecutor(id)) if id == "venue"));
    }
}
