//! Error types for interview coordination.
//!
//! Two families live here:
//! - [`CoordinationError`]: things that stop a session from advancing
//!   (responder I/O failure, an outcome submitted for the wrong action).
//! - [`Setback`]: the recoverable outcomes of a contact, scheduling, notify or
//!   escalation step. These are never returned as `Err`; each has an explicit
//!   transition and is appended to the session log together with the text that
//!   triggered it.

use serde::{Deserialize, Serialize};

use crate::responder::ResponderError;

/// Errors that abort a coordination run.
#[derive(Debug, thiserror::Error)]
pub enum CoordinationError {
    #[error("Responder error: {0}")]
    Responder(#[from] ResponderError),

    #[error("Outcome for '{got}' does not match pending action '{expected}'")]
    OutcomeMismatch { expected: String, got: String },

    #[error("Session {0} is already finished")]
    AlreadyFinished(String),

    #[error("Invalid setup: {0}")]
    Setup(#[from] crate::setup::SetupError),

    #[error("Store error: {0}")]
    Store(#[from] crate::store::StoreError),
}

/// A classified negative outcome, recorded in the session log.
///
/// # Invariants
/// - `text` is the raw outcome text that produced the classification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Setback {
    /// A call or e-mail did not reach the participant.
    #[error("No answer from {participant}: {text}")]
    NoAnswer { participant: String, text: String },

    /// The proposed slot (or the offered slots) were rejected.
    #[error("Scheduling conflict for {participant}: {text}")]
    SchedulingConflict { participant: String, text: String },

    /// A notification was not delivered.
    #[error("Delivery failure to {participant}: {text}")]
    DeliveryFailure { participant: String, text: String },

    /// The human decision-maker terminated the workflow.
    #[error("Escalation cancelled: {text}")]
    EscalationCancelled { text: String },
}

impl Setback {
    /// Short machine-readable label for logs.
    pub fn label(&self) -> &'static str {
        match self {
            Self::NoAnswer { .. } => "no_answer",
            Self::SchedulingConflict { .. } => "scheduling_conflict",
            Self::DeliveryFailure { .. } => "delivery_failure",
            Self::EscalationCancelled { .. } => "escalation_cancelled",
        }
    }

    /// The raw text that triggered this setback.
    pub fn text(&self) -> &str {
        match self {
            Self::NoAnswer { text, .. }
            | Self::SchedulingConflict { text, .. }
            | Self::DeliveryFailure { text, .. }
            | Self::EscalationCancelled { text } => text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setback_display_keeps_trigger_text() {
        let setback = Setback::NoAnswer {
            participant: "Alex Kim".to_string(),
            text: "no answer, voicemail left".to_string(),
        };
        assert_eq!(setback.label(), "no_answer");
        assert_eq!(setback.text(), "no answer, voicemail left");
        assert_eq!(
            setback.to_string(),
            "No answer from Alex Kim: no answer, voicemail left"
        );
    }

    #[test]
    fn test_setback_serializes_with_kind_tag() {
        let setback = Setback::EscalationCancelled {
            text: "cancel it".to_string(),
        };
        let json = serde_json::to_value(&setback).unwrap();
        assert_eq!(json["kind"], "escalation_cancelled");
        assert_eq!(json["text"], "cancel it");
    }
}
