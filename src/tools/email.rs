//! `send_email` tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolContext};
use crate::actions;
use crate::coordination::{NotifyRequest, Participant, Role};

pub struct SendEmail;

#[derive(Debug, Deserialize)]
struct SendEmailArgs {
    recipient_email: String,
    subject: String,
    message_type: String,
    #[serde(default)]
    additional_details: String,
}

#[async_trait]
impl Tool for SendEmail {
    fn name(&self) -> &str {
        "send_email"
    }

    fn description(&self) -> &str {
        "Send an e-mail and report delivery, the recipient's reply and how long the reply took."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "recipient_email": {"type": "string"},
                "subject": {"type": "string"},
                "message_type": {"type": "string", "description": "Kind of message, e.g. 'interviewer_availability_request', 'candidate_confirmation'"},
                "additional_details": {"type": "string"}
            },
            "required": ["recipient_email", "subject", "message_type"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let args: SendEmailArgs = serde_json::from_value(args)?;
        if !args.recipient_email.contains('@') {
            anyhow::bail!("recipient_email '{}' is not an e-mail address", args.recipient_email);
        }
        let role = Role::from_message(&args.message_type, &args.subject);
        let request = NotifyRequest {
            recipient: Participant::new(
                args.recipient_email.clone(),
                role,
                "",
                "",
                args.recipient_email,
                "",
            ),
            subject: args.subject,
            message_type: args.message_type,
            details: args.additional_details,
        };

        let result = actions::notify(ctx.responder.as_ref(), &request).await?;
        Ok(serde_json::to_string_pretty(&json!({
            "status": result.status,
            "recipient_email": result.recipient.email,
            "recipient_role": result.role.to_string(),
            "subject": result.subject,
            "message_type": result.message_type,
            "delivery_confirmation": result.delivery,
            "recipient_response": result.reply_text(),
            "response_time": result.latency_text(),
            "sent_at": result.sent_at,
        }))?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::responder::ScriptedResponder;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_send_email_with_reply() {
        let ctx = ToolContext::new(Arc::new(ScriptedResponder::new([
            "delivered",
            "Thursday works",
            "2 hours",
        ])));
        let out = SendEmail
            .execute(
                json!({
                    "recipient_email": "sarah.johnson@email.com",
                    "subject": "Interview slots",
                    "message_type": "candidate_slot_preference"
                }),
                &ctx,
            )
            .await
            .unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["recipient_role"], "Candidate");
        assert_eq!(value["recipient_response"], "Thursday works");
        assert_eq!(value["response_time"], "2 hours");
    }

    #[tokio::test]
    async fn test_send_email_rejects_bad_address() {
        let ctx = ToolContext::new(Arc::new(ScriptedResponder::new(Vec::<String>::new())));
        let result = SendEmail
            .execute(
                json!({"recipient_email": "nobody", "subject": "x", "message_type": "y"}),
                &ctx,
            )
            .await;
        assert!(result.is_err());
    }
}
