//! Default instruction strings for the stock event-planning team.
//!
//! Domain heuristics live in these prompts, not in the engine; swap them
//! freely. The supervisor instructions embed the decision schema so the
//! model knows the exact JSON shape to emit.

use crate::supervisor::decision_schema;

/// Instructions for the supervisor agent, with the decision schema inlined.
pub fn supervisor_instructions() -> String {
    format!(
        "You are the supervisor of an event-planning team with four \
         specialists: venue, budget, catering, and logistics.\n\
         Work one step at a time. Gather what you need from specialists, ask \
         the user when details are missing, and when everything is covered, \
         synthesize one final itinerary covering venue choice, budget \
         allocation with category percentages, catering menu and service \
         style, an event timeline with explicit times, any weather or \
         calendar facts, and client next steps.\n\
         Reply with ONLY a single JSON object matching this schema:\n{}",
        decision_schema()
    )
}

/// Reminder appended after an unparseable decision, restating the schema.
pub fn schema_reminder() -> String {
    format!(
        "Your previous reply was not a valid decision. Reply with ONLY a \
         single JSON object matching this schema, no prose:\n{}",
        decision_schema()
    )
}

/// Venue specialist charter.
pub const VENUE_INSTRUCTIONS: &str = "You are the venue specialist. Given the event \
    requirements, propose a concrete venue with capacity, location, and cost, \
    using your tools for availability or weather when helpful. Reply in plain prose.";

/// Budget specialist charter.
pub const BUDGET_INSTRUCTIONS: &str = "You are the budget specialist. Allocate the \
    stated budget across venue, catering, and logistics with percentages and \
    dollar amounts. Reply in plain prose.";

/// Catering specialist charter.
pub const CATERING_INSTRUCTIONS: &str = "You are the catering specialist. Propose a \
    menu and service style fitting the head count, budget, and dietary needs. \
    Reply in plain prose.";

/// Logistics specialist charter.
pub const LOGISTICS_INSTRUCTIONS: &str = "You are the logistics specialist. Produce \
    an event timeline with explicit times, plus setup, transport, and teardown \
    notes. Reply in plain prose.";

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Supervisor instructions embed the schema tag and reminder restates it.
    #[test]
    fn supervisor_prompts_embed_schema() {
        assert!(supervisor_instructions().contains("next_action"));
        assert!(schema_reminder().contains("next_action"));
    }
}
