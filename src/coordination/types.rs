//! Core value types for interview coordination.
//!
//! Everything here is created once and never mutated afterwards. Sessions hold
//! these values in append-only logs.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::classify::Status;

use super::escalation::NO_INSTRUCTIONS;
use super::slots::ProposedSlot;

/// Unique identifier for a coordination session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Role of a participant, or the label an action result assigns to its actor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Interviewer,
    Candidate,
    #[serde(rename = "hr_recruiter")]
    HrRecruiter,
    /// Default label for a call whose purpose names no role.
    Contact,
    /// Default label for an e-mail whose subject names no role.
    Recipient,
}

impl Role {
    /// Derive the actor role from a call's stated purpose.
    pub fn from_purpose(purpose: &str) -> Self {
        let purpose = purpose.to_lowercase();
        if purpose.contains("interviewer") {
            Self::Interviewer
        } else if purpose.contains("candidate") || purpose.contains("applicant") {
            Self::Candidate
        } else if purpose.contains("hr") || purpose.contains("recruiter") {
            Self::HrRecruiter
        } else {
            Self::Contact
        }
    }

    /// Derive the actor role from an e-mail's message type and subject.
    pub fn from_message(message_type: &str, subject: &str) -> Self {
        let message_type = message_type.to_lowercase();
        let subject = subject.to_lowercase();
        let mentions = |words: &[&str]| {
            words
                .iter()
                .any(|w| message_type.contains(w) || subject.contains(w))
        };
        if mentions(&["interviewer", "interview availability"]) {
            Self::Interviewer
        } else if mentions(&["candidate", "applicant"]) {
            Self::Candidate
        } else if mentions(&["hr", "recruiter", "recruitment"]) {
            Self::HrRecruiter
        } else {
            Self::Recipient
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Interviewer => write!(f, "Interviewer"),
            Self::Candidate => write!(f, "Candidate"),
            Self::HrRecruiter => write!(f, "HR/Recruiter"),
            Self::Contact => write!(f, "Contact"),
            Self::Recipient => write!(f, "Recipient"),
        }
    }
}

/// A person taking part in an interview coordination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    pub name: String,
    pub role: Role,
    /// Job title, e.g. "Senior HR Manager".
    #[serde(default)]
    pub title: String,
    pub phone: String,
    pub email: String,
    pub organization: String,
}

impl Participant {
    pub fn new(
        name: impl Into<String>,
        role: Role,
        title: impl Into<String>,
        phone: impl Into<String>,
        email: impl Into<String>,
        organization: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            role,
            title: title.into(),
            phone: phone.into(),
            email: email.into(),
            organization: organization.into(),
        }
    }
}

impl std::fmt::Display for Participant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ({}) - {}, {} @ {}",
            self.name, self.title, self.email, self.phone, self.organization
        )
    }
}

/// Medium of a contact attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Channel {
    Call,
    Email,
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Call => write!(f, "call"),
            Self::Email => write!(f, "email"),
        }
    }
}

/// Request to reach a participant by phone.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactRequest {
    pub participant: Participant,
    pub purpose: String,
    /// Talking points shown to whoever places the call.
    #[serde(default)]
    pub details: String,
}

/// Request to send an e-mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    pub recipient: Participant,
    pub subject: String,
    pub message_type: String,
    #[serde(default)]
    pub details: String,
}

/// Request to book a calendar slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleRequest {
    pub candidate: String,
    pub slot: ProposedSlot,
    pub duration_minutes: u32,
    pub interview_type: String,
}

/// One attempt to reach a participant.
///
/// # Invariants
/// - `derived_status` was computed by the classifier from this attempt's own text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactAttempt {
    pub participant: Participant,
    pub channel: Channel,
    pub purpose: String,
    /// Call outcome, or the recipient's reply for e-mail.
    pub raw_outcome_text: String,
    pub derived_status: Status,
    /// E-mail delivery confirmation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delivery: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_latency: Option<String>,
    pub timestamp: DateTime<Utc>,
}

impl ContactAttempt {
    /// Whether the outcome text was absent.
    pub fn is_empty_response(&self) -> bool {
        self.raw_outcome_text.trim().is_empty()
    }
}

/// Uniform result record for a contact attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionResult {
    pub status: Status,
    pub actor_role: Role,
    pub summary: String,
    pub next_step_hint: String,
}

/// Shown for a delivered e-mail that got no answer.
pub const NO_REPLY: &str = "No response received";
/// Shown for an e-mail that never arrived.
pub const NOT_DELIVERED: &str = "Email not delivered";
/// Shown as latency when there is no reply.
pub const NO_LATENCY: &str = "N/A";

/// Outcome of an e-mail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyResult {
    pub status: Status,
    pub role: Role,
    pub recipient: Participant,
    pub subject: String,
    pub message_type: String,
    pub delivery: String,
    /// The recipient's answer; `None` when undelivered or unanswered.
    pub reply: Option<String>,
    /// Only present together with a reply.
    pub reply_latency: Option<String>,
    pub sent_at: DateTime<Utc>,
}

impl NotifyResult {
    pub fn delivered(&self) -> bool {
        self.status == Status::Success
    }

    /// Reply for display, with a placeholder when there is none.
    pub fn reply_text(&self) -> &str {
        match &self.reply {
            Some(reply) => reply,
            None if self.delivered() => NO_REPLY,
            None => NOT_DELIVERED,
        }
    }

    pub fn latency_text(&self) -> &str {
        self.reply_latency.as_deref().unwrap_or(NO_LATENCY)
    }
}

/// A calendar booking attempt.
///
/// Superseded, never edited: a reschedule appends a new proposal.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchedulingProposal {
    pub candidate: String,
    pub date: String,
    pub time: String,
    pub duration_minutes: u32,
    pub interview_type: String,
    pub status: Status,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confirmation_id: Option<String>,
    pub raw_outcome_text: String,
    pub timestamp: DateTime<Utc>,
}

/// Why a workflow step was handed to a human.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Situation {
    InterviewerUnresponsive,
    CandidateSchedulingConflict,
    SlotConflictAtConfirmation,
}

impl std::fmt::Display for Situation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InterviewerUnresponsive => write!(f, "interviewer unresponsive"),
            Self::CandidateSchedulingConflict => write!(f, "candidate scheduling conflict"),
            Self::SlotConflictAtConfirmation => write!(f, "slot conflict at confirmation"),
        }
    }
}

/// Request for a human decision.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationRequest {
    pub situation: String,
    pub context: String,
    pub suggested_actions: Vec<String>,
}

/// A recorded human decision.
///
/// # Invariants
/// - Exactly one decision per case; `status` is `Resolved` or `Cancelled`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EscalationCase {
    pub situation: String,
    pub context: String,
    pub suggested_actions: Vec<String>,
    pub human_decision: String,
    /// Free-text follow-up instructions; `"None"` when nothing was given.
    pub additional_instructions: String,
    pub status: Status,
    pub timestamp: DateTime<Utc>,
}

impl EscalationCase {
    /// Instructions to carry into the resumed step, if any were given.
    pub fn guidance(&self) -> Option<&str> {
        if self.additional_instructions != NO_INSTRUCTIONS && !self.additional_instructions.is_empty() {
            Some(&self.additional_instructions)
        } else if !self.human_decision.trim().is_empty() {
            Some(&self.human_decision)
        } else {
            None
        }
    }
}
