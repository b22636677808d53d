//! The supervisor's structured routing decision.
//!
//! An LLM-produced tagged object used as a routing token: one variant per
//! outcome, matched exhaustively at the call site. Parse failure is a
//! distinct outcome (`None` from [`parse_decision`]), not an exception.

use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The four domain specialists the supervisor can route to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Specialist {
    Venue,
    Budget,
    Catering,
    Logistics,
}

impl Specialist {
    /// All specialists, in dispatch-precedence order.
    pub const ALL: [Specialist; 4] = [
        Specialist::Venue,
        Specialist::Budget,
        Specialist::Catering,
        Specialist::Logistics,
    ];

    /// The executor id this specialist is registered under.
    pub fn executor_id(&self) -> &'static str {
        match self {
            Specialist::Venue => "venue",
            Specialist::Budget => "budget",
            Specialist::Catering => "catering",
            Specialist::Logistics => "logistics",
        }
    }
}

/// One supervisor decision, tagged by `next_action`.
///
/// The tagged encoding makes "exactly the fields relevant to the action are
/// present" structural: any other shape fails to deserialize.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "next_action", rename_all = "snake_case")]
pub enum SupervisorDecision {
    /// Dispatch the conversation to one specialist.
    Route {
        /// Which specialist.
        target_specialist: Specialist,
        /// The supervisor's instruction to it.
        message_to_specialist: String,
    },
    /// Suspend and ask the user.
    RequestInput {
        /// Question for the user.
        prompt_to_user: String,
    },
    /// Produce the final itinerary and finish.
    Synthesize {
        /// The synthesized plan text.
        final_plan: String,
    },
}

/// JSON schema for [`SupervisorDecision`], embedded in the supervisor's
/// instructions so the model knows the exact shape.
pub fn decision_schema() -> Value {
    serde_json::to_value(schema_for!(SupervisorDecision)).unwrap_or(Value::Null)
}

/// Attempts to read a parsed agent value as a decision.
pub fn parse_decision(value: Option<&Value>) -> Option<SupervisorDecision> {
    value.and_then(|v| serde_json::from_value(v.clone()).ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// **Scenario**: Each action tag parses into its variant with its fields.
    #[test]
    fn parse_each_action() {
        let route = serde_json::json!({
            "next_action": "route",
            "target_specialist": "venue",
            "message_to_specialist": "find a room for 10",
        });
        assert_eq!(
            parse_decision(Some(&route)),
            Some(SupervisorDecision::Route {
                target_specialist: Specialist::Venue,
                message_to_specialist: "find a room for 10".into(),
            })
        );

        let ask = serde_json::json!({
            "next_action": "request_input",
            "prompt_to_user": "how many guests?",
        });
        assert!(matches!(
            parse_decision(Some(&ask)),
            Some(SupervisorDecision::RequestInput { .. })
        ));

        let done = serde_json::json!({
            "next_action": "synthesize",
            "final_plan": "ok",
        });
        assert!(matches!(
            parse_decision(Some(&done)),
            Some(SupervisorDecision::Synthesize { final_plan }) if final_plan == "ok"
        ));
    }

    /// **Scenario**: Unknown actions, missing fields, and None all fail to parse.
    #[test]
    fn parse_rejects_malformed() {
        assert!(parse_decision(None).is_none());
        let unknown = serde_json::json!({"next_action": "coordinate"});
        assert!(parse_decision(Some(&unknown)).is_none());
        let missing = serde_json::json!({"next_action": "route"});
        assert!(parse_decision(Some(&missing)).is_none());
        let wrong_specialist = serde_json::json!({
            "next_action": "route",
            "target_specialist": "entertainment",
            "message_to_specialist": "hi",
        });
        assert!(parse_decision(Some(&wrong_specialist)).is_none());
    }

    /// **Scenario**: The derived schema names the tag and every specialist.
    #[test]
    fn schema_mentions_tag_and_specialists() {
        let schema = decision_schema().to_string();
        assert!(schema.contains("next_action"), "{}", schema);
        for specialist in Specialist::ALL {
            assert!(schema.contains(specialist.executor_id()), "{}", schema);
        }
    }

    /// **Scenario**: executor ids are the lowercase serde names.
    #[test]
    fn executor_ids_match_serde_names() {
        for specialist in Specialist::ALL {
            let json = serde_json::to_value(specialist).expect("serialize");
            assert_eq!(json, Value::String(specialist.executor_id().into()));
        }
    }
}
