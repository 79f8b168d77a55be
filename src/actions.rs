//! The channel actions: call, e-mail and calendar booking.
//!
//! Each action prints what it is about to do through the responder prompt,
//! obtains the outcome text, classifies it and returns an immutable record.
//! Actions never fail on odd outcome text; only the responder itself can fail.

use chrono::Utc;
use uuid::Uuid;

use crate::classify::{classify, classify_email_contact, Domain, Status};
use crate::coordination::{
    Channel, ContactAttempt, ContactRequest, NotifyRequest, NotifyResult, Role, ScheduleRequest,
    SchedulingProposal,
};
use crate::responder::{Prompt, PromptKind, Responder, ResponderError};

pub use crate::coordination::{NOT_DELIVERED, NO_LATENCY, NO_REPLY};

/// Place a call and classify its outcome within `domain`.
pub async fn call(
    responder: &dyn Responder,
    request: &ContactRequest,
    domain: Domain,
) -> Result<ContactAttempt, ResponderError> {
    let role = Role::from_purpose(&request.purpose);
    let mut prompt = Prompt::new(
        PromptKind::CallOutcome,
        format!("Please describe the call outcome with {}:", role),
    )
    .line(format!(
        "Simulating call to {} ({})",
        request.participant.name, role
    ))
    .line(format!("Phone: {}", request.participant.phone))
    .line(format!("Purpose: {}", request.purpose));
    if !request.details.is_empty() {
        prompt = prompt.line(format!("Details: {}", request.details));
    }

    let outcome = responder.ask(&prompt).await?;
    let status = classify(&outcome, domain);
    tracing::info!(
        participant = %request.participant.name,
        role = %role,
        status = %status,
        "call finished"
    );

    Ok(ContactAttempt {
        participant: request.participant.clone(),
        channel: Channel::Call,
        purpose: request.purpose.clone(),
        raw_outcome_text: outcome,
        derived_status: status,
        delivery: None,
        reply_latency: None,
        timestamp: Utc::now(),
    })
}

/// Send an e-mail and collect the delivery result and the recipient's reply.
///
/// The reply is only asked for after a successful delivery, and the reply
/// latency only after a non-empty reply.
pub async fn notify(
    responder: &dyn Responder,
    request: &NotifyRequest,
) -> Result<NotifyResult, ResponderError> {
    let role = Role::from_message(&request.message_type, &request.subject);
    let prompt = Prompt::new(PromptKind::EmailDelivery, "Enter email sending result:")
        .line(format!("Sending {} email", request.message_type))
        .line(format!("To: {} ({})", request.recipient.email, role))
        .line(format!("Subject: {}", request.subject))
        .line(format!("Additional Details: {}", request.details));
    let delivery = responder.ask(&prompt).await?;
    let status = classify(&delivery, Domain::Email);

    let (reply, reply_latency) = if status == Status::Success {
        let reply = responder
            .ask(&Prompt::new(
                PromptKind::EmailReply,
                format!(
                    "Simulate {}'s response to this email (empty for no response):",
                    role
                ),
            ))
            .await?;
        if reply.trim().is_empty() {
            (None, None)
        } else {
            let latency = responder
                .ask(&Prompt::new(
                    PromptKind::ReplyLatency,
                    format!(
                        "How long did {} take to respond? (e.g. '5 minutes', '2 hours')",
                        role
                    ),
                ))
                .await?;
            (Some(reply), Some(latency))
        }
    } else {
        (None, None)
    };

    if status == Status::Success {
        tracing::info!(recipient = %request.recipient.email, role = %role, "email delivered");
    } else {
        tracing::warn!(
            recipient = %request.recipient.email,
            delivery = %delivery,
            "email not delivered"
        );
    }

    Ok(NotifyResult {
        status,
        role,
        recipient: request.recipient.clone(),
        subject: request.subject.clone(),
        message_type: request.message_type.clone(),
        delivery,
        reply,
        reply_latency,
        sent_at: Utc::now(),
    })
}

/// Send an e-mail as a contact attempt and classify the reply within `reply_domain`.
///
/// A failed delivery or a missing reply counts as [`Status::NoAnswer`], even
/// though the underlying [`NotifyResult`] reports a delivered e-mail as success.
pub async fn email_contact(
    responder: &dyn Responder,
    request: &NotifyRequest,
    reply_domain: Domain,
) -> Result<(ContactAttempt, NotifyResult), ResponderError> {
    let result = notify(responder, request).await?;
    let reply = result.reply.as_deref();
    let status = classify_email_contact(&result.delivery, reply, reply_domain);

    let attempt = ContactAttempt {
        participant: request.recipient.clone(),
        channel: Channel::Email,
        purpose: format!("{} | {}", request.message_type, request.subject),
        raw_outcome_text: reply.unwrap_or_default().to_string(),
        derived_status: status,
        delivery: Some(result.delivery.clone()),
        reply_latency: Some(result.latency_text().to_string()),
        timestamp: result.sent_at,
    };
    Ok((attempt, result))
}

/// Try to book the requested slot.
pub async fn schedule(
    responder: &dyn Responder,
    request: &ScheduleRequest,
) -> Result<SchedulingProposal, ResponderError> {
    let prompt = Prompt::new(
        PromptKind::ScheduleOutcome,
        "Enter scheduling result (e.g., confirmed, conflict, alternative time):",
    )
    .line(format!(
        "Attempting to schedule: {} interview",
        request.interview_type
    ))
    .line(format!("For: {}", request.candidate))
    .line(format!(
        "Date: {} at {} ({} minutes)",
        request.slot.date, request.slot.time, request.duration_minutes
    ));

    let outcome = responder.ask(&prompt).await?;
    let status = classify(&outcome, Domain::Scheduling);
    let now = Utc::now();
    let confirmation_id = (status == Status::Success).then(|| {
        format!(
            "INT_{}_{}",
            now.format("%Y%m%d%H%M"),
            &Uuid::new_v4().simple().to_string()[..6]
        )
    });
    tracing::info!(
        candidate = %request.candidate,
        slot = %request.slot,
        status = %status,
        "scheduling attempt finished"
    );

    Ok(SchedulingProposal {
        candidate: request.candidate.clone(),
        date: request.slot.date.clone(),
        time: request.slot.time.clone(),
        duration_minutes: request.duration_minutes,
        interview_type: request.interview_type.clone(),
        status,
        confirmation_id,
        raw_outcome_text: outcome,
        timestamp: now,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordination::{Participant, ProposedSlot};
    use crate::responder::ScriptedResponder;

    fn alex() -> Participant {
        Participant::new(
            "Alex Kim",
            Role::Interviewer,
            "Senior Software Engineer",
            "+1-555-ENG01",
            "a.kim@techcorp.com",
            "TechCorp Inc.",
        )
    }

    fn availability_email() -> NotifyRequest {
        NotifyRequest {
            recipient: alex(),
            subject: "Interview availability request".to_string(),
            message_type: "interviewer_availability_request".to_string(),
            details: String::new(),
        }
    }

    #[tokio::test]
    async fn test_call_classifies_outcome() {
        let responder = ScriptedResponder::new(["no answer, voicemail left"]);
        let request = ContactRequest {
            participant: alex(),
            purpose: "Request interview availability from interviewer".to_string(),
            details: String::new(),
        };
        let attempt = call(&responder, &request, Domain::Contact).await.unwrap();
        assert_eq!(attempt.channel, Channel::Call);
        assert_eq!(attempt.derived_status, Status::NoAnswer);
        assert_eq!(attempt.raw_outcome_text, "no answer, voicemail left");
    }

    #[tokio::test]
    async fn test_notify_with_reply_asks_latency() {
        let responder = ScriptedResponder::new(["delivered", "Monday 9am", "5 minutes"]);
        let result = notify(&responder, &availability_email()).await.unwrap();
        assert_eq!(result.status, Status::Success);
        assert_eq!(result.role, Role::Interviewer);
        assert_eq!(result.reply.as_deref(), Some("Monday 9am"));
        assert_eq!(result.reply_latency.as_deref(), Some("5 minutes"));
        assert_eq!(responder.remaining().await, 0);
    }

    #[tokio::test]
    async fn test_notify_empty_reply_skips_latency() {
        let responder = ScriptedResponder::new(["delivered", ""]);
        let result = notify(&responder, &availability_email()).await.unwrap();
        assert_eq!(result.status, Status::Success);
        assert!(result.reply.is_none());
        assert_eq!(result.reply_text(), NO_REPLY);
        assert_eq!(result.latency_text(), NO_LATENCY);
        assert_eq!(
            responder.asked().await,
            vec![PromptKind::EmailDelivery, PromptKind::EmailReply]
        );
    }

    #[tokio::test]
    async fn test_notify_failed_delivery_skips_reply() {
        let responder = ScriptedResponder::new(["bounce: mailbox error"]);
        let result = notify(&responder, &availability_email()).await.unwrap();
        assert_eq!(result.status, Status::Failed);
        assert!(result.reply.is_none());
        assert_eq!(result.reply_text(), NOT_DELIVERED);
        assert_eq!(responder.asked().await, vec![PromptKind::EmailDelivery]);
    }

    #[tokio::test]
    async fn test_email_contact_empty_reply_is_no_answer() {
        let responder = ScriptedResponder::new(["delivered", ""]);
        let (attempt, result) = email_contact(&responder, &availability_email(), Domain::Contact)
            .await
            .unwrap();
        assert!(result.delivered());
        assert_eq!(attempt.derived_status, Status::NoAnswer);
        assert!(attempt.is_empty_response());
        assert_eq!(attempt.delivery.as_deref(), Some("delivered"));
    }

    #[tokio::test]
    async fn test_email_contact_placeholder_text_is_still_a_reply() {
        let responder = ScriptedResponder::new(["delivered", NO_REPLY, "1 minute"]);
        let (attempt, result) = email_contact(&responder, &availability_email(), Domain::Contact)
            .await
            .unwrap();
        assert_eq!(result.reply.as_deref(), Some(NO_REPLY));
        assert_eq!(attempt.derived_status, Status::Success);
        assert_eq!(attempt.raw_outcome_text, NO_REPLY);
    }

    #[tokio::test]
    async fn test_email_contact_reply_classified() {
        let responder = ScriptedResponder::new(["delivered", "Wednesday 11am", "1 hour"]);
        let (attempt, _) = email_contact(&responder, &availability_email(), Domain::Contact)
            .await
            .unwrap();
        assert_eq!(attempt.derived_status, Status::Success);
        assert_eq!(attempt.raw_outcome_text, "Wednesday 11am");
        assert_eq!(attempt.reply_latency.as_deref(), Some("1 hour"));
    }

    #[tokio::test]
    async fn test_schedule_confirmation_id_only_on_success() {
        let request = ScheduleRequest {
            candidate: "Sarah Johnson".to_string(),
            slot: ProposedSlot::new("Friday", "3pm"),
            duration_minutes: 60,
            interview_type: "technical".to_string(),
        };

        let responder = ScriptedResponder::new(["confirmed for Friday 3pm"]);
        let booked = schedule(&responder, &request).await.unwrap();
        assert_eq!(booked.status, Status::Success);
        assert!(booked.confirmation_id.as_deref().unwrap().starts_with("INT_"));

        let responder = ScriptedResponder::new(["conflict with another interview"]);
        let rejected = schedule(&responder, &request).await.unwrap();
        assert_eq!(rejected.status, Status::Conflict);
        assert!(rejected.confirmation_id.is_none());
    }
}
