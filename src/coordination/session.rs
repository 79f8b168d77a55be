//! The coordination session aggregate.
//!
//! A session is the append-only history of one interview-scheduling task:
//! every contact attempt, scheduling proposal, escalation, confirmation e-mail,
//! setback and stage transition, in order. Entries are only ever pushed; none
//! are edited or removed, so the log can be replayed for audit.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::Setback;
use crate::notes::Notepad;
use crate::setup::InterviewSetup;

use super::machine::Stage;
use super::result;
use super::types::{
    ActionResult, Channel, ContactAttempt, EscalationCase, NotifyRequest, NotifyResult,
    SchedulingProposal, SessionId, Situation,
};

/// Overall status of a session.
///
/// # State Machine
/// ```text
/// InProgress -> Completed
///            \-> Cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    InProgress,
    Completed,
    Cancelled,
}

impl SessionStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }
}

impl std::fmt::Display for SessionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::Completed => write!(f, "completed"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// A recorded stage change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub from: Stage,
    pub to: Stage,
    pub reason: String,
    pub at: DateTime<Utc>,
}

/// Where the HR hand-over of an open escalation stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HrStep {
    Call,
    Email,
    Decision,
}

/// An escalation waiting for its decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenEscalation {
    pub situation: Situation,
    /// Stage to return to when the decision resolves the case.
    pub resume_to: Stage,
    pub step: HrStep,
    pub hr_response: Option<String>,
}

/// Working state carried between steps.
///
/// Saved with the session, so an interrupted run still shows which channel
/// was next, what HR said, and which confirmations were never sent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingStep {
    pub channel: Channel,
    pub escalation: Option<OpenEscalation>,
    /// Decision-maker guidance for the resumed stage.
    pub guidance: Option<String>,
    pub interviewer_slots: Option<String>,
    pub candidate_preference: Option<String>,
    /// Confirmation e-mails still to send after a booking.
    pub outbox: VecDeque<NotifyRequest>,
}

impl Default for PendingStep {
    fn default() -> Self {
        Self {
            channel: Channel::Call,
            escalation: None,
            guidance: None,
            interviewer_slots: None,
            candidate_preference: None,
            outbox: VecDeque::new(),
        }
    }
}

/// Aggregate root for one interview coordination.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoordinationSession {
    id: SessionId,
    setup: InterviewSetup,
    status: SessionStatus,
    stage: Stage,
    attempts: Vec<ContactAttempt>,
    proposals: Vec<SchedulingProposal>,
    escalations: Vec<EscalationCase>,
    notifications: Vec<NotifyResult>,
    setbacks: Vec<Setback>,
    transitions: Vec<TransitionRecord>,
    notes: Notepad,
    #[serde(default)]
    pending: PendingStep,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl CoordinationSession {
    pub fn new(setup: InterviewSetup) -> Self {
        let now = Utc::now();
        Self {
            id: SessionId::new(),
            setup,
            status: SessionStatus::InProgress,
            stage: Stage::AwaitInterviewerSlots,
            attempts: Vec::new(),
            proposals: Vec::new(),
            escalations: Vec::new(),
            notifications: Vec::new(),
            setbacks: Vec::new(),
            transitions: Vec::new(),
            notes: Notepad::new(),
            pending: PendingStep::default(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> SessionId {
        self.id
    }

    pub fn setup(&self) -> &InterviewSetup {
        &self.setup
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn attempts(&self) -> &[ContactAttempt] {
        &self.attempts
    }

    pub fn proposals(&self) -> &[SchedulingProposal] {
        &self.proposals
    }

    pub fn escalations(&self) -> &[EscalationCase] {
        &self.escalations
    }

    pub fn notifications(&self) -> &[NotifyResult] {
        &self.notifications
    }

    pub fn setbacks(&self) -> &[Setback] {
        &self.setbacks
    }

    pub fn transitions(&self) -> &[TransitionRecord] {
        &self.transitions
    }

    pub fn notes(&self) -> &Notepad {
        &self.notes
    }

    /// Working state for the next step; empty once the session is finished.
    pub fn pending(&self) -> &PendingStep {
        &self.pending
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// The booking that completed the session, if any.
    pub fn confirmed_proposal(&self) -> Option<&SchedulingProposal> {
        if self.status != SessionStatus::Completed {
            return None;
        }
        self.proposals.iter().rev().find(|p| p.status.is_positive())
    }

    /// Result records for every contact attempt, in order.
    pub fn results(&self) -> Vec<ActionResult> {
        self.attempts.iter().map(result::build).collect()
    }

    /// One-line terminal summary, e.g. `Done/completed`.
    pub fn final_label(&self) -> String {
        match self.status {
            SessionStatus::InProgress => format!("{:?}/in_progress", self.stage),
            status => format!("Done/{}", status),
        }
    }

    // Append-only mutation, used by the state machine.

    pub(crate) fn push_attempt(&mut self, attempt: ContactAttempt) {
        self.attempts.push(attempt);
        self.touch();
    }

    pub(crate) fn push_proposal(&mut self, proposal: SchedulingProposal) {
        self.proposals.push(proposal);
        self.touch();
    }

    pub(crate) fn push_escalation(&mut self, case: EscalationCase) {
        self.escalations.push(case);
        self.touch();
    }

    pub(crate) fn push_notification(&mut self, result: NotifyResult) {
        self.notifications.push(result);
        self.touch();
    }

    pub(crate) fn push_setback(&mut self, setback: Setback) {
        tracing::warn!(session = %self.id, kind = setback.label(), "{}", setback);
        self.notes.append(format!("[{}] {}", setback.label(), setback));
        self.setbacks.push(setback);
        self.touch();
    }

    pub(crate) fn pending_mut(&mut self) -> &mut PendingStep {
        self.touch();
        &mut self.pending
    }

    pub(crate) fn note(&mut self, text: impl Into<String>) {
        self.notes.append(text);
        self.touch();
    }

    pub(crate) fn move_to(&mut self, to: Stage, reason: impl Into<String>) {
        let from = self.stage;
        if from == to {
            return;
        }
        let reason = reason.into();
        tracing::info!(session = %self.id, from = ?from, to = ?to, reason = %reason, "stage transition");
        self.notes
            .append(format!("{:?} -> {:?}: {}", from, to, reason));
        self.transitions.push(TransitionRecord {
            from,
            to,
            reason,
            at: Utc::now(),
        });
        self.stage = to;
        self.touch();
    }

    pub(crate) fn finish(&mut self, status: SessionStatus, reason: impl Into<String>) {
        self.status = status;
        self.pending = PendingStep::default();
        self.move_to(Stage::Done, reason);
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
