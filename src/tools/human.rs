//! `human_in_loop` tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolContext};
use crate::coordination::{EscalationPolicy, EscalationRequest};

pub struct HumanInLoop;

#[derive(Debug, Deserialize)]
struct HumanInLoopArgs {
    situation: String,
    context: String,
    /// Semicolon-separated list.
    #[serde(default)]
    suggested_actions: String,
}

#[async_trait]
impl Tool for HumanInLoop {
    fn name(&self) -> &str {
        "human_in_loop"
    }

    fn description(&self) -> &str {
        "Ask a human decision-maker for guidance on a blocked step. A decision containing 'cancel' ends the coordination."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "situation": {"type": "string", "description": "The problem that needs resolution"},
                "context": {"type": "string", "description": "Background information"},
                "suggested_actions": {"type": "string", "description": "Optional suggestions, separated by ';'"}
            },
            "required": ["situation", "context"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let args: HumanInLoopArgs = serde_json::from_value(args)?;
        let request = EscalationRequest {
            situation: args.situation,
            context: args.context,
            suggested_actions: args
                .suggested_actions
                .split(';')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
                .collect(),
        };

        let case = EscalationPolicy::new()
            .escalate(ctx.responder.as_ref(), &request)
            .await?;
        Ok(serde_json::to_string_pretty(&json!({
            "status": case.status,
            "decision": case.human_decision,
            "additional_instructions": case.additional_instructions,
            "timestamp": case.timestamp,
        }))?)
    }
}
