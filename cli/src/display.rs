//! Event rendering for the console driver.
//!
//! Tool-call and tool-result lines are keyed by `call_id` and printed once
//! each; everything else streams through with truncation.

use std::collections::HashSet;

use planweave::{ContentPart, RunStatus, WorkflowEvent};

/// Truncates a string to at most `max` chars; appends "..." when truncated.
/// UTF-8 safe.
pub fn truncate_display(s: &str, max: usize) -> String {
    const SUFFIX: &str = "...";
    let suffix_len = 3;
    if max <= suffix_len {
        return s.chars().take(max).collect();
    }
    if s.chars().count() <= max {
        return s.to_string();
    }
    format!(
        "{}{}",
        s.chars().take(max - suffix_len).collect::<String>(),
        SUFFIX
    )
}

const LINE_MAX: usize = 160;

/// Stateful renderer: prints events, deduplicates tool lines, and hands back
/// any human-input request for the resume loop.
pub struct EventRenderer {
    verbose: bool,
    seen_calls: HashSet<String>,
    seen_results: HashSet<String>,
}

impl EventRenderer {
    pub fn new(verbose: bool) -> Self {
        Self {
            verbose,
            seen_calls: HashSet::new(),
            seen_results: HashSet::new(),
        }
    }

    /// Renders one event; returns `(request_id, prompt)` for RequestInfo.
    pub fn render(&mut self, event: &WorkflowEvent) -> Option<(String, String)> {
        match event {
            WorkflowEvent::ExecutorInvoked { executor_id } => {
                if self.verbose {
                    eprintln!("-> {}", executor_id);
                }
                None
            }
            WorkflowEvent::AgentUpdate(update) => {
                for part in &update.contents {
                    match part {
                        ContentPart::Text(text) if !text.is_empty() => {
                            eprintln!(
                                "[{}] {}",
                                update.executor_id,
                                truncate_display(text, LINE_MAX)
                            );
                        }
                        ContentPart::Text(_) => {}
                        ContentPart::FunctionCall(call) => {
                            if self.seen_calls.insert(call.call_id.clone()) {
                                eprintln!(
                                    "[{}] tool call {}({})",
                                    update.executor_id,
                                    call.name,
                                    truncate_display(&call.arguments.to_string(), LINE_MAX)
                                );
                            }
                        }
                        ContentPart::FunctionResult(result) => {
                            if self.seen_results.insert(result.call_id.clone()) {
                                eprintln!(
                                    "[{}] tool result {}: {}",
                                    update.executor_id,
                                    result.call_id,
                                    truncate_display(&result.result.to_string(), LINE_MAX)
                                );
                            }
                        }
                    }
                }
                None
            }
            WorkflowEvent::RequestInfo { request_id, data } => {
                Some((request_id.clone(), data.prompt.clone()))
            }
            WorkflowEvent::Status(status) => {
                if self.verbose || *status == RunStatus::Failed {
                    eprintln!("status: {}", status);
                }
                None
            }
            WorkflowEvent::Output { data } => {
                println!("\n=== Final plan ===\n{}", data);
                None
            }
            WorkflowEvent::Error { details, .. } => {
                eprintln!("error: {}", details);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Short strings pass through; long strings end in "...".
    #[test]
    fn truncate_display_behavior() {
        assert_eq!(truncate_display("short", 10), "short");
        let long = "x".repeat(20);
        let out = truncate_display(&long, 10);
        assert_eq!(out.chars().count(), 10);
        assert!(out.ends_with("..."));
        assert_eq!(truncate_display("abcdef", 2), "ab");
    }

    /// **Scenario**: RequestInfo events hand back the id and prompt.
    #[test]
    fn render_returns_request() {
        use planweave::HumanFeedbackRequest;
        let mut renderer = EventRenderer::new(false);
        let event = WorkflowEvent::RequestInfo {
            request_id: "r1".into(),
            data: HumanFeedbackRequest::clarification("how many?", "supervisor", vec![]),
        };
        let request = renderer.render(&event);
        assert_eq!(request, Some(("r1".into(), "how many?".into())));
    }
}
