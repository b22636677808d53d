//! End-to-end supervisor flows over scripted chat clients: direct synthesis,
//! the human-input gate, tool-content isolation, parse-failure recovery, and
//! specialist failure.

mod init_logging;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio_stream::StreamExt;

use planweave::{
    build_event_workflow, decision_schema, prompts, AgentHandle, ChatClient, ChatClientError,
    ChatMessage, ChatTurn, ContentPart, ErrorReason, EventTeam, MessageChunk, MockChatClient,
    MockTool, Role, RunStatus, ScriptedTurn, ToolSpec, Workflow, WorkflowEvent,
};
use tokio::sync::mpsc;

/// Wraps a scripted client and records the message lists it was given.
struct RecordingClient {
    inner: MockChatClient,
    calls: Arc<Mutex<Vec<Vec<ChatMessage>>>>,
}

impl RecordingClient {
    fn new(turns: Vec<ScriptedTurn>) -> (Arc<Self>, Arc<Mutex<Vec<Vec<ChatMessage>>>>) {
        let calls = Arc::new(Mutex::new(vec![]));
        (
            Arc::new(Self {
                inner: MockChatClient::scripted(turns),
                calls: calls.clone(),
            }),
            calls,
        )
    }
}

#[async_trait]
impl ChatClient for RecordingClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        tools: &[ToolSpec],
        chunk_tx: Option<mpsc::Sender<MessageChunk>>,
    ) -> Result<ChatTurn, ChatClientError> {
        self.calls.lock().unwrap().push(messages.to_vec());
        self.inner.complete(messages, tools, chunk_tx).await
    }
}

fn route(target: &str, message: &str) -> ScriptedTurn {
    ScriptedTurn::text(format!(
        r#"{{"next_action": "route", "target_specialist": "{}", "message_to_specialist": "{}"}}"#,
        target, message
    ))
}

fn request_input(prompt: &str) -> ScriptedTurn {
    ScriptedTurn::text(format!(
        r#"{{"next_action": "request_input", "prompt_to_user": "{}"}}"#,
        prompt
    ))
}

fn synthesize(plan: &str) -> ScriptedTurn {
    ScriptedTurn::text(format!(
        r#"{{"next_action": "synthesize", "final_plan": "{}"}}"#,
        plan
    ))
}

fn supervisor_agent(client: Arc<dyn ChatClient>) -> AgentHandle {
    AgentHandle::new("supervisor", prompts::supervisor_instructions(), client)
        .with_response_schema(decision_schema())
}

fn specialist_agent(name: &str, client: Arc<dyn ChatClient>) -> AgentHandle {
    AgentHandle::new(name, format!("You are the {} specialist.", name), client)
}

fn team_with(
    supervisor: Arc<dyn ChatClient>,
    venue: AgentHandle,
    budget: AgentHandle,
) -> Workflow {
    build_event_workflow(EventTeam {
        supervisor: supervisor_agent(supervisor),
        venue,
        budget,
        catering: specialist_agent(
            "catering",
            Arc::new(MockChatClient::with_replies(vec!["Boxed lunches, buffet style."])),
        ),
        logistics: specialist_agent(
            "logistics",
            Arc::new(MockChatClient::with_replies(vec![
                "Timeline: 11:45 setup, 12:00 lunch, 13:00 teardown.",
            ])),
        ),
    })
    .expect("valid team")
}

fn invoked_ids(events: &[WorkflowEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::ExecutorInvoked { executor_id } => Some(executor_id.clone()),
            _ => None,
        })
        .collect()
}

/// **Scenario**: Direct synthesis path — four routes then a final plan, one
/// output event, terminal Completed.
#[tokio::test]
async fn direct_synthesis_path() {
    let supervisor = Arc::new(MockChatClient::scripted(vec![
        route("venue", "Find a lunch spot for 10 in Seattle."),
        route("budget", "Allocate $200 across the event."),
        route("catering", "Propose a lunch menu."),
        route("logistics", "Lay out the timeline."),
        synthesize(
            "Itinerary: venue is the Pine Room; budget splits 50/30/20; \
             catering is a taco bar; timeline starts 12:00.",
        ),
    ]));
    let workflow = team_with(
        supervisor,
        specialist_agent(
            "venue",
            Arc::new(MockChatClient::with_replies(vec![
                "The Pine Room seats 12, downtown.",
            ])),
        ),
        specialist_agent(
            "budget",
            Arc::new(MockChatClient::with_replies(vec![
                "50% venue, 30% catering, 20% logistics.",
            ])),
        ),
    );

    let events: Vec<_> = workflow
        .run_stream("plan a 10-person team lunch, $200, Seattle")
        .collect()
        .await;

    let outputs: Vec<_> = events
        .iter()
        .filter_map(|e| match e {
            WorkflowEvent::Output { data } => Some(data.clone()),
            _ => None,
        })
        .collect();
    assert_eq!(outputs.len(), 1);
    for word in ["venue", "budget", "catering", "timeline"] {
        assert!(outputs[0].contains(word), "plan missing '{}': {}", word, outputs[0]);
    }
    assert_eq!(workflow.status(), Some(RunStatus::Completed));

    let order = invoked_ids(&events);
    assert_eq!(
        order,
        vec![
            "supervisor",
            "venue",
            "supervisor",
            "budget",
            "supervisor",
            "catering",
            "supervisor",
            "logistics",
            "supervisor",
        ]
    );
}

/// **Scenario**: Under-specified prompt — the supervisor gates on human input
/// before any specialist dispatch, then completes after resumption.
#[tokio::test]
async fn single_hitl_gate() {
    let supervisor = Arc::new(MockChatClient::scripted(vec![
        request_input("How many people, what date, what budget, what city?"),
        synthesize("Party plan: venue TBD hall, budget split, catering, timeline at 19:00."),
    ]));
    let workflow = team_with(
        supervisor,
        specialist_agent("venue", Arc::new(MockChatClient::with_replies(vec![]))),
        specialist_agent("budget", Arc::new(MockChatClient::with_replies(vec![]))),
    );

    let events: Vec<_> = workflow.run_stream("plan a party").collect().await;

    // The request arrives before any specialist is dispatched.
    assert!(invoked_ids(&events)
        .iter()
        .all(|id| id == "supervisor"));
    let request_id = events
        .iter()
        .find_map(|e| match e {
            WorkflowEvent::RequestInfo { request_id, data } => {
                assert_eq!(data.requesting_agent, "supervisor");
                assert!(data.prompt.contains("How many people"));
                Some(request_id.clone())
            }
            _ => None,
        })
        .expect("one RequestInfo event");
    assert_eq!(workflow.status(), Some(RunStatus::IdleWithPendingRequests));

    let responses: HashMap<String, String> =
        [(request_id, "50 people, Dec 15, $5000, Seattle".to_string())].into();
    let resumed: Vec<_> = workflow.send_responses_streaming(responses).collect().await;

    assert!(resumed
        .iter()
        .any(|e| matches!(e, WorkflowEvent::Output { .. })));
    assert_eq!(workflow.status(), Some(RunStatus::Completed));
}

/// **Scenario**: Tool-content isolation — the venue specialist's call/result
/// pair reaches the budget specialist only as text markers.
#[tokio::test]
async fn tool_content_isolation() {
    let supervisor = Arc::new(MockChatClient::scripted(vec![
        route("venue", "Scout venues; check the weather."),
        route("budget", "Allocate the budget."),
        synthesize("venue, budget, catering, timeline: all set."),
    ]));

    let weather: Arc<dyn planweave::Tool> = Arc::new(
        MockTool::new("weather").with_result("get_forecast", serde_json::json!("72F, sunny")),
    );
    let venue = specialist_agent(
        "venue",
        Arc::new(MockChatClient::scripted(vec![
            ScriptedTurn::tool_call(
                "Checking the forecast first.",
                "venue-c1",
                "get_forecast",
                serde_json::json!({"city": "Seattle"}),
            ),
            ScriptedTurn::text("Rooftop terrace works; forecast is sunny."),
        ])),
    )
    .with_tools(vec![weather]);

    let (budget_client, budget_calls) = RecordingClient::new(vec![ScriptedTurn::text(
        "60% venue, 25% catering, 15% logistics.",
    )]);
    let budget = specialist_agent("budget", budget_client);

    let workflow = team_with(supervisor, venue, budget);
    let events: Vec<_> = workflow.run_stream("plan a rooftop party").collect().await;
    assert_eq!(workflow.status(), Some(RunStatus::Completed));

    // The venue agent's updates surfaced its structured tool activity.
    assert!(events.iter().any(|e| matches!(
        e,
        WorkflowEvent::AgentUpdate(u)
            if u.executor_id == "venue"
                && u.contents.iter().any(|p| matches!(p, ContentPart::FunctionCall(_)))
    )));

    // The budget agent saw markers, never structured parts.
    let calls = budget_calls.lock().unwrap();
    assert_eq!(calls.len(), 1);
    let received = &calls[0];
    assert!(received.iter().all(|m| !m.has_tool_content()));
    let joined = received
        .iter()
        .map(ChatMessage::text)
        .collect::<Vec<_>>()
        .join("\n");
    assert!(joined.contains("[Tool Call: "), "{}", joined);
    assert!(joined.contains("[Tool Result "), "{}", joined);
    assert!(joined.contains("venue-c1"), "{}", joined);
}

/// **Scenario**: Parse-failure recovery — one unparseable decision triggers
/// exactly one schema-restating reprompt, then the run completes.
#[tokio::test]
async fn parse_failure_recovers_with_one_reprompt() {
    let (supervisor, supervisor_calls) = RecordingClient::new(vec![
        ScriptedTurn::text("We should probably plan something nice."),
        synthesize("ok"),
    ]);
    let workflow = team_with(
        supervisor,
        specialist_agent("venue", Arc::new(MockChatClient::with_replies(vec![]))),
        specialist_agent("budget", Arc::new(MockChatClient::with_replies(vec![]))),
    );

    let events: Vec<_> = workflow.run_stream("plan a thing").collect().await;

    assert!(events
        .iter()
        .any(|e| matches!(e, WorkflowEvent::Output { data } if data == "ok")));
    assert_eq!(workflow.status(), Some(RunStatus::Completed));

    let calls = supervisor_calls.lock().unwrap();
    assert_eq!(calls.len(), 2, "exactly one reprompt");
    let last = calls[1].last().expect("reprompt thread non-empty");
    assert_eq!(last.role, Role::System);
    assert!(last.text().contains("next_action"));
}

/// **Scenario**: A specialist crashing mid-turn fails the run with
/// AgentRunFailure.
#[tokio::test]
async fn specialist_failure_fails_run() {
    let supervisor = Arc::new(MockChatClient::scripted(vec![route(
        "venue",
        "Find a venue.",
    )]));
    let workflow = team_with(
        supervisor,
        specialist_agent(
            "venue",
            Arc::new(MockChatClient::scripted(vec![ScriptedTurn::failure(
                "connection reset",
            )])),
        ),
        specialist_agent("budget", Arc::new(MockChatClient::with_replies(vec![]))),
    );

    let events: Vec<_> = workflow.run_stream("plan a lunch").collect().await;

    assert!(events.iter().any(|e| matches!(
        e,
        WorkflowEvent::Error {
            reason: ErrorReason::AgentRunFailure,
            ..
        }
    )));
    assert_eq!(workflow.status(), Some(RunStatus::Failed));
}
