//! Scripted demo team for the console driver.
//!
//! The chat/LLM client is an external collaborator of the core; this wiring
//! stands a scripted [`MockChatClient`] in at that seam so the driver can be
//! exercised end to end (streaming, one human-input gate, a tool round, and
//! final synthesis) without network access. Swap the clients for a real
//! [`ChatClient`](planweave::ChatClient) implementation to go live.

use std::sync::Arc;

use planweave::{
    build_event_workflow, decision_schema, prompts, AgentHandle, EventTeam, GraphError,
    MockChatClient, MockTool, ScriptedTurn, Tool, ToolScope, Workflow,
};

fn decision(json: String) -> ScriptedTurn {
    ScriptedTurn::text(json)
}

fn supervisor_script() -> Vec<ScriptedTurn> {
    vec![
        decision(
            r#"{"next_action": "request_input",
                "prompt_to_user": "What date, headcount, and budget should I plan for?"}"#
                .into(),
        ),
        decision(
            r#"{"next_action": "route", "target_specialist": "venue",
                "message_to_specialist": "Scout a venue; check the weather first."}"#
                .into(),
        ),
        decision(
            r#"{"next_action": "route", "target_specialist": "budget",
                "message_to_specialist": "Allocate the budget across categories."}"#
                .into(),
        ),
        decision(
            r#"{"next_action": "route", "target_specialist": "catering",
                "message_to_specialist": "Propose a menu and service style."}"#
                .into(),
        ),
        decision(
            r#"{"next_action": "route", "target_specialist": "logistics",
                "message_to_specialist": "Draft the timeline."}"#
                .into(),
        ),
        decision(
            r#"{"next_action": "synthesize", "final_plan": "Venue: the Cedar Hall rooftop (forecast is clear). Budget: 45% venue, 30% catering, 15% logistics, 10% reserve. Catering: seasonal buffet with vegetarian mains. Timeline: 17:30 setup, 18:30 doors, 19:00 dinner, 21:30 teardown. Next steps: confirm headcount and sign the venue contract."}"#
                .into(),
        ),
    ]
}

/// Builds the demo workflow plus the tool scope the driver must hold open for
/// the run's duration (release it after the stream finishes).
pub async fn demo_workflow() -> Result<(Workflow, ToolScope), DemoError> {
    let weather: Arc<dyn Tool> = Arc::new(
        MockTool::new("weather")
            .with_result("get_forecast", serde_json::json!("Clear, 72F at 19:00")),
    );
    let scope = ToolScope::acquire(weather).await?;

    let supervisor = AgentHandle::new(
        "supervisor",
        prompts::supervisor_instructions(),
        Arc::new(MockChatClient::scripted(supervisor_script())),
    )
    .with_response_schema(decision_schema());

    let venue = AgentHandle::new(
        "venue",
        prompts::VENUE_INSTRUCTIONS,
        Arc::new(MockChatClient::scripted(vec![
            ScriptedTurn::tool_call(
                "Checking the forecast before recommending a rooftop.",
                "",
                "get_forecast",
                serde_json::json!({"when": "event evening"}),
            ),
            ScriptedTurn::text(
                "Cedar Hall rooftop: capacity 80, downtown, $1,800 for the evening.",
            ),
        ])),
    )
    .with_tools(vec![scope.tool()]);

    let budget = AgentHandle::new(
        "budget",
        prompts::BUDGET_INSTRUCTIONS,
        Arc::new(MockChatClient::with_replies(vec![
            "45% venue, 30% catering, 15% logistics, 10% reserve.",
        ])),
    );
    let catering = AgentHandle::new(
        "catering",
        prompts::CATERING_INSTRUCTIONS,
        Arc::new(MockChatClient::with_replies(vec![
            "Seasonal buffet, vegetarian mains, self-serve drinks station.",
        ])),
    );
    let logistics = AgentHandle::new(
        "logistics",
        prompts::LOGISTICS_INSTRUCTIONS,
        Arc::new(MockChatClient::with_replies(vec![
            "17:30 setup, 18:30 doors, 19:00 dinner, 21:30 teardown.",
        ])),
    );

    let workflow = build_event_workflow(EventTeam {
        supervisor,
        venue,
        budget,
        catering,
        logistics,
    })?;
    Ok((workflow, scope))
}

/// Errors while assembling the demo team.
#[derive(Debug, thiserror::Error)]
pub enum DemoError {
    #[error("graph: {0}")]
    Graph(#[from] GraphError),
    #[error("tool: {0}")]
    Tool(#[from] planweave::ToolError),
}
