//! Builds uniform [`ActionResult`] records from contact attempts.

use super::types::{ActionResult, Channel, ContactAttempt, Role};

/// Summary used when a positive outcome came with no text at all.
pub const NO_RESPONSE: &str = "no response received";

/// Derive the result record for an attempt.
///
/// Pure: depends only on `attempt`.
pub fn build(attempt: &ContactAttempt) -> ActionResult {
    let actor_role = match attempt.channel {
        Channel::Call => Role::from_purpose(&attempt.purpose),
        Channel::Email => Role::from_message(&attempt.purpose, &attempt.purpose),
    };

    let outcome = if attempt.is_empty_response() {
        NO_RESPONSE
    } else {
        attempt.raw_outcome_text.trim()
    };
    let verb = match attempt.channel {
        Channel::Call => "Call to",
        Channel::Email => "Email to",
    };
    let summary = format!(
        "{} {} ({}): {}",
        verb, attempt.participant.name, actor_role, outcome
    );

    ActionResult {
        status: attempt.derived_status,
        actor_role,
        summary,
        next_step_hint: next_step_hint(attempt).to_string(),
    }
}

fn next_step_hint(attempt: &ContactAttempt) -> &'static str {
    if attempt.derived_status.is_positive() {
        return "Proceed with scheduling";
    }
    match attempt.channel {
        Channel::Call => "Follow up via email",
        Channel::Email => "Escalate to HR/recruiter",
    }
}
