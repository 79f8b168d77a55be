//! Escalation policy.
//!
//! Decides what happens after a contact or booking attempt does not succeed,
//! and records the human decision when a step is handed over.
//!
//! # Fallback rules
//! ```text
//! call negative            -> retry the same participant by e-mail
//! e-mail negative          -> escalate (situation depends on the stage)
//! booking conflict         -> escalate (slot conflict at confirmation)
//! ```
//! There is exactly one call -> e-mail fallback per stage entry; nothing else
//! is retried automatically.

use chrono::Utc;

use crate::classify::{classify, Domain};
use crate::responder::{Prompt, PromptKind, Responder, ResponderError};

use super::machine::Stage;
use super::types::{Channel, EscalationCase, EscalationRequest, Situation};

/// Recorded when no additional instructions are given.
pub const NO_INSTRUCTIONS: &str = "None";

/// What to do after a negative outcome.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextMove {
    /// Try the same participant again by e-mail.
    RetryByEmail,
    /// Hand the step to a human decision-maker.
    Escalate(Situation),
}

/// Stateless escalation policy.
#[derive(Debug, Clone, Copy, Default)]
pub struct EscalationPolicy;

impl EscalationPolicy {
    pub fn new() -> Self {
        Self
    }

    /// Decide the follow-up for a negative outcome in `stage` over `channel`.
    ///
    /// Returns `None` for stages that have no fallback (escalated or done).
    pub fn after_setback(&self, stage: Stage, channel: Channel) -> Option<NextMove> {
        let situation = match stage {
            Stage::AwaitInterviewerSlots => Situation::InterviewerUnresponsive,
            Stage::AwaitCandidatePreference => Situation::CandidateSchedulingConflict,
            Stage::AwaitConfirmation => return Some(NextMove::Escalate(Situation::SlotConflictAtConfirmation)),
            Stage::Escalated | Stage::Done => return None,
        };
        Some(match channel {
            Channel::Call => NextMove::RetryByEmail,
            Channel::Email => NextMove::Escalate(situation),
        })
    }

    /// Default options offered to the decision-maker.
    pub fn suggested_actions(&self, situation: Situation) -> Vec<String> {
        let actions: &[&str] = match situation {
            Situation::InterviewerUnresponsive => &[
                "Assign an alternate interviewer",
                "Retry the interviewer later",
                "Cancel the interview",
            ],
            Situation::CandidateSchedulingConflict => &[
                "Offer new slots to the candidate",
                "Ask the interviewer for more availability",
                "Cancel the interview",
            ],
            Situation::SlotConflictAtConfirmation => &[
                "Propose a different slot",
                "Move the conflicting meeting",
                "Cancel the interview",
            ],
        };
        actions.iter().map(|s| s.to_string()).collect()
    }

    /// Build the request shown to the decision-maker.
    pub fn request(&self, situation: Situation, context: impl Into<String>) -> EscalationRequest {
        EscalationRequest {
            situation: situation.to_string(),
            context: context.into(),
            suggested_actions: self.suggested_actions(situation),
        }
    }

    /// Record a decision for `request`.
    ///
    /// Pure: the status is derived from `decision` alone.
    pub fn record(
        &self,
        request: &EscalationRequest,
        decision: impl Into<String>,
        instructions: Option<&str>,
    ) -> EscalationCase {
        let decision = decision.into();
        let additional_instructions = instructions
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .unwrap_or(NO_INSTRUCTIONS)
            .to_string();
        EscalationCase {
            situation: request.situation.clone(),
            context: request.context.clone(),
            suggested_actions: request.suggested_actions.clone(),
            status: classify(&decision, Domain::Escalation),
            human_decision: decision,
            additional_instructions,
            timestamp: Utc::now(),
        }
    }

    /// Present the request to a human and record exactly one decision.
    pub async fn escalate(
        &self,
        responder: &dyn Responder,
        request: &EscalationRequest,
    ) -> Result<EscalationCase, ResponderError> {
        let mut prompt = Prompt::new(PromptKind::Decision, "Please provide your decision/guidance:")
            .line("Human Intervention Needed")
            .line("=".repeat(50))
            .line(format!("Situation: {}", request.situation))
            .line(format!("Context: {}", request.context));
        if !request.suggested_actions.is_empty() {
            prompt = prompt.line(format!(
                "Suggested Actions: {}",
                request.suggested_actions.join("; ")
            ));
        }
        let decision = responder.ask(&prompt).await?;
        let instructions = responder
            .ask(&Prompt::new(
                PromptKind::Instructions,
                "Any additional instructions? (Press Enter if none)",
            ))
            .await?;

        let case = self.record(request, decision, Some(&instructions));
        tracing::info!(
            situation = %case.situation,
            status = %case.status,
            decision = %case.human_decision,
            "escalation decided"
        );
        Ok(case)
    }
}
