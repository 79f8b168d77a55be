//! `call_contact` tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolContext};
use crate::actions;
use crate::classify::Domain;
use crate::coordination::{build_result, ContactRequest, Participant, Role};

pub struct CallContact;

#[derive(Debug, Deserialize)]
struct CallContactArgs {
    contact_name: String,
    phone_number: String,
    purpose: String,
    #[serde(default)]
    details: String,
}

#[async_trait]
impl Tool for CallContact {
    fn name(&self) -> &str {
        "call_contact"
    }

    fn description(&self) -> &str {
        "Call someone by phone. The role (interviewer, candidate, HR/recruiter) is taken from the purpose. Returns the call outcome and the suggested next step."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "contact_name": {"type": "string", "description": "Name of the person to call"},
                "phone_number": {"type": "string", "description": "Phone number to call"},
                "purpose": {"type": "string", "description": "Purpose of the call, naming who is called (e.g. 'Request availability from interviewer')"},
                "details": {"type": "string", "description": "Optional talking points"}
            },
            "required": ["contact_name", "phone_number", "purpose"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let args: CallContactArgs = serde_json::from_value(args)?;
        let role = Role::from_purpose(&args.purpose);
        let request = ContactRequest {
            participant: Participant::new(
                args.contact_name,
                role,
                "",
                args.phone_number,
                "",
                "",
            ),
            purpose: args.purpose,
            details: args.details,
        };

        let attempt = actions::call(ctx.responder.as_ref(), &request, Domain::Contact).await?;
        let result = build_result(&attempt);
        let success = attempt.derived_status.is_positive();
        Ok(serde_json::to_string_pretty(&json!({
            "status": attempt.derived_status,
            "contact_name": attempt.participant.name,
            "contact_role": result.actor_role.to_string(),
            "phone_number": attempt.participant.phone,
            "discussion_summary": attempt.raw_outcome_text,
            "duration_minutes": if success { 5 } else { 0 },
            "next_steps": result.next_step_hint,
        }))?)
    }
}
