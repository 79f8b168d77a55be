//! The interview coordination state machine.
//!
//! The machine is pure: it never talks to a responder. It hands out the next
//! [`ActionRequest`], and the caller performs it and feeds the resulting
//! [`ActionOutcome`] back through [`CoordinationMachine::apply`]. This keeps
//! the transition rules testable with hand-made outcomes.
//!
//! # State Machine
//! ```text
//! AwaitInterviewerSlots --success--> AwaitCandidatePreference --success--> AwaitConfirmation
//!        |  call negative: retry by e-mail     |                                 |
//!        |  e-mail negative                    | e-mail negative                 | conflict
//!        v                                     v                                 v
//!    Escalated <-------------------------------+---------------------------------+
//!        |  resolved: back to the stage that escalated
//!        |  cancelled: Done (cancelled)
//! AwaitConfirmation --booked, confirmations sent--> Done (completed)
//! ```
//!
//! # Invariants
//! - `Done` is only entered from `AwaitConfirmation` once a successful booking
//!   has sent its last confirmation, or from `Escalated` on a cancelling decision.
//! - Working state (channel, open escalation, guidance, unsent confirmations)
//!   lives in the session's pending step and is saved with it.
//! - Every transition and every setback is appended to the session log.
//! - After `Done`, no further requests are issued and outcomes are rejected.

use serde::{Deserialize, Serialize};

use crate::classify::{Domain, Status};
use crate::error::{CoordinationError, Setback};
use crate::setup::InterviewSetup;

use super::escalation::{EscalationPolicy, NextMove};
use super::result;
use super::session::{CoordinationSession, HrStep, OpenEscalation, PendingStep, SessionStatus};
use super::slots::ProposedSlot;
use super::types::{
    Channel, ContactAttempt, ContactRequest, EscalationCase, EscalationRequest, NotifyRequest,
    NotifyResult, Participant, ScheduleRequest, SchedulingProposal, Situation,
};

/// Stage of the coordination workflow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    AwaitInterviewerSlots,
    AwaitCandidatePreference,
    AwaitConfirmation,
    Escalated,
    Done,
}

impl Stage {
    /// Stages in which the workflow actively contacts or books.
    pub fn is_working(&self) -> bool {
        matches!(
            self,
            Self::AwaitInterviewerSlots | Self::AwaitCandidatePreference | Self::AwaitConfirmation
        )
    }
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AwaitInterviewerSlots => write!(f, "await_interviewer_slots"),
            Self::AwaitCandidatePreference => write!(f, "await_candidate_preference"),
            Self::AwaitConfirmation => write!(f, "await_confirmation"),
            Self::Escalated => write!(f, "escalated"),
            Self::Done => write!(f, "done"),
        }
    }
}

/// The next thing the caller must do.
#[derive(Debug, Clone)]
pub enum ActionRequest {
    /// Place a call; classify the outcome within `domain`.
    Contact {
        request: ContactRequest,
        domain: Domain,
    },
    /// Reach a participant by e-mail; classify the reply within `reply_domain`.
    FollowUpEmail {
        request: NotifyRequest,
        reply_domain: Domain,
    },
    /// Book the calendar slot.
    Schedule(ScheduleRequest),
    /// Ask the human decision-maker.
    Escalate(EscalationRequest),
    /// Send a confirmation e-mail after booking.
    Confirm(NotifyRequest),
}

impl ActionRequest {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contact { .. } => "contact",
            Self::FollowUpEmail { .. } => "follow_up_email",
            Self::Schedule(_) => "schedule",
            Self::Escalate(_) => "escalate",
            Self::Confirm(_) => "confirm",
        }
    }
}

/// The result of performing an [`ActionRequest`].
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Contacted(ContactAttempt),
    Emailed {
        attempt: ContactAttempt,
        result: NotifyResult,
    },
    Scheduled(SchedulingProposal),
    Decided(EscalationCase),
    Confirmed(NotifyResult),
}

impl ActionOutcome {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Contacted(_) => "contact",
            Self::Emailed { .. } => "follow_up_email",
            Self::Scheduled(_) => "schedule",
            Self::Decided(_) => "escalate",
            Self::Confirmed(_) => "confirm",
        }
    }
}

/// Stage change caused by one outcome. `from == to` when the stage held.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub from: Stage,
    pub to: Stage,
}

impl Transition {
    pub fn changed(&self) -> bool {
        self.from != self.to
    }
}

/// Drives one coordination session.
///
/// All working state lives in the session's [`PendingStep`], so the stored
/// record always matches what the machine would do next.
pub struct CoordinationMachine {
    session: CoordinationSession,
    policy: EscalationPolicy,
}

impl CoordinationMachine {
    /// Start a session. The setup is expected to be validated already.
    pub fn new(setup: InterviewSetup) -> Self {
        let mut session = CoordinationSession::new(setup);
        session.note(format!(
            "Session started: {} interview for {}",
            session.setup().interview_type,
            session.setup().position
        ));
        tracing::info!(
            session = %session.id(),
            position = %session.setup().position,
            candidate = %session.setup().candidate.name,
            "coordination session started"
        );
        Self {
            session,
            policy: EscalationPolicy::new(),
        }
    }

    fn pending(&self) -> &PendingStep {
        self.session.pending()
    }

    pub fn session(&self) -> &CoordinationSession {
        &self.session
    }

    pub fn into_session(self) -> CoordinationSession {
        self.session
    }

    pub fn stage(&self) -> Stage {
        self.session.stage()
    }

    pub fn is_finished(&self) -> bool {
        self.stage() == Stage::Done
    }

    /// The action the caller must perform next, or `None` once finished.
    pub fn next_request(&self) -> Option<ActionRequest> {
        if let Some(confirmation) = self.pending().outbox.front() {
            return Some(ActionRequest::Confirm(confirmation.clone()));
        }
        let request = match self.stage() {
            Stage::AwaitInterviewerSlots => match self.pending().channel {
                Channel::Call => ActionRequest::Contact {
                    request: self.interviewer_call(),
                    domain: Domain::Contact,
                },
                Channel::Email => ActionRequest::FollowUpEmail {
                    request: self.interviewer_email(),
                    reply_domain: Domain::Contact,
                },
            },
            Stage::AwaitCandidatePreference => match self.pending().channel {
                Channel::Call => ActionRequest::Contact {
                    request: self.candidate_call(),
                    domain: Domain::Preference,
                },
                Channel::Email => ActionRequest::FollowUpEmail {
                    request: self.candidate_email(),
                    reply_domain: Domain::Preference,
                },
            },
            Stage::AwaitConfirmation => ActionRequest::Schedule(self.schedule_request()),
            Stage::Escalated => {
                let escalation = self.pending().escalation.as_ref()?;
                match escalation.step {
                    HrStep::Call => ActionRequest::Contact {
                        request: self.hr_call(escalation),
                        domain: Domain::Contact,
                    },
                    HrStep::Email => ActionRequest::FollowUpEmail {
                        request: self.hr_email(escalation),
                        reply_domain: Domain::Contact,
                    },
                    HrStep::Decision => ActionRequest::Escalate(
                        self.policy
                            .request(escalation.situation, self.escalation_context(escalation)),
                    ),
                }
            }
            Stage::Done => return None,
        };
        Some(request)
    }

    /// Feed back the outcome of the pending request.
    pub fn apply(&mut self, outcome: ActionOutcome) -> Result<Transition, CoordinationError> {
        let pending = self
            .next_request()
            .ok_or_else(|| CoordinationError::AlreadyFinished(self.session.id().to_string()))?;
        if pending.label() != outcome.label() {
            return Err(CoordinationError::OutcomeMismatch {
                expected: pending.label().to_string(),
                got: outcome.label().to_string(),
            });
        }

        let from = self.stage();
        match outcome {
            ActionOutcome::Contacted(attempt) => self.on_contact(attempt),
            ActionOutcome::Emailed { attempt, result } => {
                self.session.push_notification(result);
                self.on_contact(attempt);
            }
            ActionOutcome::Scheduled(proposal) => self.on_schedule(proposal),
            ActionOutcome::Decided(case) => self.on_decision(case),
            ActionOutcome::Confirmed(result) => self.on_confirmation(result),
        }
        Ok(Transition {
            from,
            to: self.stage(),
        })
    }

    fn on_contact(&mut self, attempt: ContactAttempt) {
        let record = result::build(&attempt);
        self.session
            .note(format!("{} [{}]", record.summary, record.status));

        let channel = attempt.channel;
        let positive = attempt.derived_status.is_positive();
        let text = attempt.raw_outcome_text.trim().to_string();
        if !positive {
            self.session.push_setback(setback_for(&attempt));
        }
        self.session.push_attempt(attempt);

        let stage = self.stage();
        if stage == Stage::Escalated {
            if let Some(escalation) = self.session.pending_mut().escalation.as_mut() {
                escalation.step = if positive {
                    escalation.hr_response = Some(text);
                    HrStep::Decision
                } else {
                    match channel {
                        Channel::Call => HrStep::Email,
                        Channel::Email => HrStep::Decision,
                    }
                };
            }
            return;
        }

        if positive {
            let (next, reason) = match stage {
                Stage::AwaitInterviewerSlots => {
                    self.session.pending_mut().interviewer_slots = Some(text);
                    (Stage::AwaitCandidatePreference, "interviewer shared availability")
                }
                _ => {
                    self.session.pending_mut().candidate_preference = Some(text);
                    (Stage::AwaitConfirmation, "candidate chose a slot")
                }
            };
            let pending = self.session.pending_mut();
            pending.channel = Channel::Call;
            pending.guidance = None;
            self.session.move_to(next, reason);
            return;
        }

        match self.policy.after_setback(stage, channel) {
            Some(NextMove::RetryByEmail) => {
                self.session.pending_mut().channel = Channel::Email;
                self.session
                    .note(format!("{:?}: call failed, following up by e-mail", stage));
            }
            Some(NextMove::Escalate(situation)) => self.enter_escalation(situation),
            None => {}
        }
    }

    fn on_schedule(&mut self, proposal: SchedulingProposal) {
        let booked = proposal.status == Status::Success;
        self.session.note(format!(
            "Booking {} at {} for {}: {} [{}]",
            proposal.date, proposal.time, proposal.candidate, proposal.raw_outcome_text, proposal.status
        ));

        if booked {
            // The session completes once every confirmation has been sent.
            let outbox = self.confirmations(&proposal).into();
            self.session.pending_mut().outbox = outbox;
            self.session.push_proposal(proposal);
            return;
        }

        self.session.push_setback(Setback::SchedulingConflict {
            participant: proposal.candidate.clone(),
            text: proposal.raw_outcome_text.clone(),
        });
        self.session.push_proposal(proposal);
        if let Some(NextMove::Escalate(situation)) =
            self.policy.after_setback(Stage::AwaitConfirmation, Channel::Call)
        {
            self.enter_escalation(situation);
        }
    }

    fn on_decision(&mut self, case: EscalationCase) {
        self.session.note(format!(
            "Decision on {}: {} (instructions: {}) [{}]",
            case.situation, case.human_decision, case.additional_instructions, case.status
        ));
        let escalation = self.session.pending_mut().escalation.take();

        if case.status == Status::Cancelled {
            self.session.push_setback(Setback::EscalationCancelled {
                text: case.human_decision.clone(),
            });
            self.session.push_escalation(case);
            self.session
                .finish(SessionStatus::Cancelled, "cancelled by decision-maker");
            return;
        }

        let resume_to = escalation
            .map(|e| e.resume_to)
            .unwrap_or(Stage::AwaitInterviewerSlots);
        let pending = self.session.pending_mut();
        pending.guidance = case.guidance().map(str::to_string);
        pending.channel = Channel::Call;
        self.session.push_escalation(case);
        self.session
            .move_to(resume_to, "resolved by decision-maker, resuming");
    }

    fn on_confirmation(&mut self, result: NotifyResult) {
        let drained = {
            let outbox = &mut self.session.pending_mut().outbox;
            outbox.pop_front();
            outbox.is_empty()
        };
        self.session.note(format!(
            "Confirmation to {} ({}): {} [{}]",
            result.recipient.name, result.role, result.delivery, result.status
        ));
        if !result.delivered() {
            self.session.push_setback(Setback::DeliveryFailure {
                participant: result.recipient.name.clone(),
                text: result.delivery.clone(),
            });
        }
        self.session.push_notification(result);

        if drained {
            let reason = format!(
                "interview booked ({}), confirmations sent",
                self.session
                    .proposals()
                    .last()
                    .and_then(|p| p.confirmation_id.as_deref())
                    .unwrap_or_default()
            );
            self.session.finish(SessionStatus::Completed, reason);
        }
    }

    /// Record that the run stopped before the session finished.
    ///
    /// The session stays in progress; its pending step shows what was next.
    pub fn abort(&mut self, reason: &str) {
        let stage = self.stage();
        let unsent = self.pending().outbox.len();
        let mut line = format!("Run aborted in {}: {}", stage, reason);
        if unsent > 0 {
            line.push_str(&format!(" ({} confirmation(s) not sent)", unsent));
        }
        self.session.note(line);
    }

    fn enter_escalation(&mut self, situation: Situation) {
        let resume_to = self.stage();
        self.session.pending_mut().escalation = Some(OpenEscalation {
            situation,
            resume_to,
            step: HrStep::Call,
            hr_response: None,
        });
        self.session
            .move_to(Stage::Escalated, format!("escalated: {}", situation));
    }

    // Request builders. Purposes and message types name only the role being
    // contacted; situation text goes into `details`.

    fn setup(&self) -> &InterviewSetup {
        self.session.setup()
    }

    fn guidance_line(&self) -> String {
        match &self.pending().guidance {
            Some(g) => format!(" Guidance from HR: {}.", g),
            None => String::new(),
        }
    }

    fn interviewer_call(&self) -> ContactRequest {
        let setup = self.setup();
        ContactRequest {
            participant: setup.interviewer.clone(),
            purpose: "Request interview availability from interviewer".to_string(),
            details: format!(
                "Need {}-minute {} interview slots for {} ({}).{}",
                setup.duration_minutes,
                setup.interview_type,
                setup.candidate.name,
                setup.position,
                self.guidance_line()
            ),
        }
    }

    fn interviewer_email(&self) -> NotifyRequest {
        let setup = self.setup();
        NotifyRequest {
            recipient: setup.interviewer.clone(),
            subject: format!("Interview availability request: {}", setup.position),
            message_type: "interviewer_availability_request".to_string(),
            details: self.interviewer_call().details,
        }
    }

    fn candidate_call(&self) -> ContactRequest {
        let setup = self.setup();
        ContactRequest {
            participant: setup.candidate.clone(),
            purpose: "Offer interview slots to candidate".to_string(),
            details: format!(
                "{} interview for {} with {}. Available slots: {}.{}",
                setup.interview_type,
                setup.position,
                setup.interviewer.name,
                self.pending().interviewer_slots.as_deref().unwrap_or("to be confirmed"),
                self.guidance_line()
            ),
        }
    }

    fn candidate_email(&self) -> NotifyRequest {
        let setup = self.setup();
        NotifyRequest {
            recipient: setup.candidate.clone(),
            subject: format!("Interview slots for {}", setup.position),
            message_type: "candidate_slot_preference".to_string(),
            details: self.candidate_call().details,
        }
    }

    fn schedule_request(&self) -> ScheduleRequest {
        let setup = self.setup();
        let preference = self.pending().candidate_preference.as_deref().unwrap_or_default();
        let slot = self
            .pending()
            .guidance
            .as_deref()
            .and_then(ProposedSlot::find)
            .unwrap_or_else(|| ProposedSlot::from_text(preference));
        ScheduleRequest {
            candidate: setup.candidate.name.clone(),
            slot,
            duration_minutes: setup.duration_minutes,
            interview_type: setup.interview_type.clone(),
        }
    }

    fn hr_call(&self, escalation: &OpenEscalation) -> ContactRequest {
        ContactRequest {
            participant: self.setup().hr.clone(),
            purpose: "Escalate to HR/recruiter for guidance".to_string(),
            details: format!(
                "Situation: {}. {}",
                escalation.situation,
                self.recent_activity()
            ),
        }
    }

    fn hr_email(&self, escalation: &OpenEscalation) -> NotifyRequest {
        NotifyRequest {
            recipient: self.setup().hr.clone(),
            subject: "Escalation: recruiter guidance needed".to_string(),
            message_type: "hr_escalation".to_string(),
            details: self.hr_call(escalation).details,
        }
    }

    fn escalation_context(&self, escalation: &OpenEscalation) -> String {
        let setup = self.setup();
        let mut context = format!(
            "Position: {}. Candidate: {}. Interviewer: {}. {}",
            setup.position,
            setup.candidate.name,
            setup.interviewer.name,
            self.recent_activity()
        );
        if escalation.situation == Situation::SlotConflictAtConfirmation {
            if let Some(p) = self.session.proposals().last() {
                context.push_str(&format!(
                    " Rejected slot: {} at {} ({}).",
                    p.date, p.time, p.raw_outcome_text
                ));
            }
        }
        if let Some(response) = &escalation.hr_response {
            context.push_str(&format!(" HR response: {}.", response));
        }
        context
    }

    fn recent_activity(&self) -> String {
        let attempts = self.session.attempts();
        let recent: Vec<String> = attempts
            .iter()
            .skip(attempts.len().saturating_sub(3))
            .map(|a| result::build(a).summary)
            .collect();
        if recent.is_empty() {
            "No contact attempts yet.".to_string()
        } else {
            format!("Recent attempts: {}.", recent.join("; "))
        }
    }

    fn confirmations(&self, proposal: &SchedulingProposal) -> Vec<NotifyRequest> {
        let setup = self.setup();
        let subject = format!(
            "Interview confirmed: {} on {} at {}",
            setup.position, proposal.date, proposal.time
        );
        let details = format!(
            "Confirmation {}: {}-minute {} interview with {} and {}.",
            proposal.confirmation_id.as_deref().unwrap_or_default(),
            proposal.duration_minutes,
            proposal.interview_type,
            setup.interviewer.name,
            setup.candidate.name
        );
        let to = |recipient: &Participant, message_type: &str| NotifyRequest {
            recipient: recipient.clone(),
            subject: subject.clone(),
            message_type: message_type.to_string(),
            details: details.clone(),
        };
        vec![
            to(&setup.interviewer, "interviewer_confirmation"),
            to(&setup.candidate, "candidate_confirmation"),
            to(&setup.hr, "hr_confirmation"),
        ]
    }
}

fn setback_for(attempt: &ContactAttempt) -> Setback {
    let participant = attempt.participant.name.clone();
    let undelivered = attempt
        .delivery
        .as_deref()
        .map(|d| crate::classify::classify(d, Domain::Email) != Status::Success)
        .unwrap_or(false);
    if undelivered {
        return Setback::DeliveryFailure {
            participant,
            text: attempt.delivery.clone().unwrap_or_default(),
        };
    }
    let text = if attempt.is_empty_response() {
        result::NO_RESPONSE.to_string()
    } else {
        attempt.raw_outcome_text.clone()
    };
    match attempt.derived_status {
        Status::Conflict => Setback::SchedulingConflict { participant, text },
        _ => Setback::NoAnswer { participant, text },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, classify_email_contact};
    use crate::setup::Directory;
    use chrono::Utc;

    fn machine() -> CoordinationMachine {
        CoordinationMachine::new(Directory::builtin().sample_setup().unwrap())
    }

    fn contacted(m: &CoordinationMachine, text: &str) -> ActionOutcome {
        match m.next_request() {
            Some(ActionRequest::Contact { request, domain }) => {
                ActionOutcome::Contacted(ContactAttempt {
                    participant: request.participant,
                    channel: Channel::Call,
                    purpose: request.purpose,
                    raw_outcome_text: text.to_string(),
                    derived_status: classify(text, domain),
                    delivery: None,
                    reply_latency: None,
                    timestamp: Utc::now(),
                })
            }
            other => panic!("expected contact request, got {:?}", other),
        }
    }

    fn emailed(m: &CoordinationMachine, delivery: &str, reply: &str) -> ActionOutcome {
        match m.next_request() {
            Some(ActionRequest::FollowUpEmail {
                request,
                reply_domain,
            }) => {
                let reply_opt = (!reply.is_empty()).then_some(reply);
                let status = classify_email_contact(delivery, reply_opt, reply_domain);
                ActionOutcome::Emailed {
                    attempt: ContactAttempt {
                        participant: request.recipient.clone(),
                        channel: Channel::Email,
                        purpose: format!("{} | {}", request.message_type, request.subject),
                        raw_outcome_text: reply.to_string(),
                        derived_status: status,
                        delivery: Some(delivery.to_string()),
                        reply_latency: Some("N/A".to_string()),
                        timestamp: Utc::now(),
                    },
                    result: notify_result(&request, delivery),
                }
            }
            other => panic!("expected e-mail request, got {:?}", other),
        }
    }

    fn notify_result(request: &NotifyRequest, delivery: &str) -> NotifyResult {
        NotifyResult {
            status: classify(delivery, Domain::Email),
            role: crate::coordination::Role::from_message(&request.message_type, &request.subject),
            recipient: request.recipient.clone(),
            subject: request.subject.clone(),
            message_type: request.message_type.clone(),
            delivery: delivery.to_string(),
            reply: None,
            reply_latency: None,
            sent_at: Utc::now(),
        }
    }

    fn scheduled(m: &CoordinationMachine, text: &str) -> ActionOutcome {
        match m.next_request() {
            Some(ActionRequest::Schedule(request)) => {
                let status = classify(text, Domain::Scheduling);
                ActionOutcome::Scheduled(SchedulingProposal {
                    candidate: request.candidate,
                    date: request.slot.date,
                    time: request.slot.time,
                    duration_minutes: request.duration_minutes,
                    interview_type: request.interview_type,
                    status,
                    confirmation_id: (status == Status::Success)
                        .then(|| "INT_202601011200_abc123".to_string()),
                    raw_outcome_text: text.to_string(),
                    timestamp: Utc::now(),
                })
            }
            other => panic!("expected schedule request, got {:?}", other),
        }
    }

    fn decided(m: &CoordinationMachine, decision: &str, instructions: &str) -> ActionOutcome {
        match m.next_request() {
            Some(ActionRequest::Escalate(request)) => ActionOutcome::Decided(
                EscalationPolicy::new().record(&request, decision, Some(instructions)),
            ),
            other => panic!("expected escalation request, got {:?}", other),
        }
    }

    fn confirm_all(m: &mut CoordinationMachine) {
        while let Some(ActionRequest::Confirm(request)) = m.next_request() {
            m.apply(ActionOutcome::Confirmed(notify_result(&request, "delivered")))
                .unwrap();
        }
    }

    #[test]
    fn test_happy_path() {
        let mut m = machine();
        let o = contacted(&m, "Available Tuesday 2pm and Thursday 10am");
        let t = m.apply(o).unwrap();
        assert_eq!(t.to, Stage::AwaitCandidatePreference);

        let o = contacted(&m, "I prefer Thursday 10am");
        m.apply(o).unwrap();
        assert_eq!(m.stage(), Stage::AwaitConfirmation);

        match m.next_request() {
            Some(ActionRequest::Schedule(r)) => {
                assert_eq!(r.slot.date, "Thursday");
                assert_eq!(r.slot.time, "10am");
                assert_eq!(r.duration_minutes, 90);
            }
            other => panic!("unexpected {:?}", other),
        }
        let o = scheduled(&m, "Confirmed");
        m.apply(o).unwrap();
        assert_eq!(m.stage(), Stage::AwaitConfirmation);
        assert_eq!(m.session().status(), SessionStatus::InProgress);
        assert_eq!(m.session().pending().outbox.len(), 3);
        assert!(!m.is_finished());

        confirm_all(&mut m);
        assert!(m.is_finished());
        assert!(m.next_request().is_none());

        let s = m.session();
        assert_eq!(s.status(), SessionStatus::Completed);
        assert_eq!(s.attempts().len(), 2);
        assert_eq!(s.notifications().len(), 3);
        assert!(s.setbacks().is_empty());
        assert!(s.confirmed_proposal().unwrap().confirmation_id.is_some());
        assert_eq!(s.transitions().len(), 3);
    }

    #[test]
    fn test_call_fails_email_succeeds() {
        let mut m = machine();
        let o = contacted(&m, "no answer, voicemail left");
        let t = m.apply(o).unwrap();
        assert!(!t.changed());
        assert!(matches!(
            m.next_request(),
            Some(ActionRequest::FollowUpEmail { .. })
        ));

        let o = emailed(&m, "delivered", "Wednesday 11am works");
        m.apply(o).unwrap();
        assert_eq!(m.stage(), Stage::AwaitCandidatePreference);
        assert!(m.session().escalations().is_empty());
        assert_eq!(m.session().setbacks().len(), 1);
        assert!(matches!(
            m.next_request(),
            Some(ActionRequest::Contact { .. })
        ));
    }

    #[test]
    fn test_two_negatives_escalate_then_resume() {
        let mut m = machine();
        let o = contacted(&m, "no answer");
        m.apply(o).unwrap();
        let o = emailed(&m, "delivered", "");
        let t = m.apply(o).unwrap();
        assert_eq!(t.to, Stage::Escalated);

        let o = contacted(&m, "Will advise shortly");
        m.apply(o).unwrap();
        let request = match m.next_request() {
            Some(ActionRequest::Escalate(r)) => r,
            other => panic!("unexpected {:?}", other),
        };
        assert_eq!(request.situation, "interviewer unresponsive");
        assert!(request.context.contains("HR response: Will advise shortly"));

        let o = decided(&m, "Use Maria Garcia instead", "");
        m.apply(o).unwrap();
        assert_eq!(m.stage(), Stage::AwaitInterviewerSlots);
        match m.next_request() {
            Some(ActionRequest::Contact { request, .. }) => {
                assert!(request.details.contains("Use Maria Garcia instead"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(m.session().escalations().len(), 1);
    }

    #[test]
    fn test_unreachable_hr_still_reaches_decision() {
        let mut m = machine();
        let o = contacted(&m, "no answer");
        m.apply(o).unwrap();
        let o = emailed(&m, "delivered", "");
        m.apply(o).unwrap();
        let o = contacted(&m, "no answer");
        m.apply(o).unwrap();
        let o = emailed(&m, "bounced: delivery failed", "");
        m.apply(o).unwrap();
        assert!(matches!(
            m.next_request(),
            Some(ActionRequest::Escalate(_))
        ));
        assert!(matches!(
            m.session().setbacks().last(),
            Some(Setback::DeliveryFailure { .. })
        ));
    }

    #[test]
    fn test_candidate_conflict_escalates() {
        let mut m = machine();
        let o = contacted(&m, "Available Tuesday 2pm");
        m.apply(o).unwrap();
        let o = contacted(&m, "conflict, none of those work");
        m.apply(o).unwrap();
        assert_eq!(m.stage(), Stage::AwaitCandidatePreference);
        let o = emailed(&m, "delivered", "still a conflict");
        m.apply(o).unwrap();
        assert_eq!(m.stage(), Stage::Escalated);
        assert!(matches!(
            m.session().setbacks().last(),
            Some(Setback::SchedulingConflict { .. })
        ));
    }

    #[test]
    fn test_booking_conflict_escalates_and_guidance_sets_slot() {
        let mut m = machine();
        let o = contacted(&m, "Available Friday 3pm");
        m.apply(o).unwrap();
        let o = contacted(&m, "Friday 3pm please");
        m.apply(o).unwrap();
        let o = scheduled(&m, "conflict with another interview");
        let t = m.apply(o).unwrap();
        assert_eq!(t.to, Stage::Escalated);
        assert_eq!(m.session().proposals().len(), 1);

        let o = contacted(&m, "ok");
        m.apply(o).unwrap();
        let o = decided(&m, "Use Monday 10am instead", "");
        m.apply(o).unwrap();
        assert_eq!(m.stage(), Stage::AwaitConfirmation);
        match m.next_request() {
            Some(ActionRequest::Schedule(r)) => {
                assert_eq!(r.slot.date, "Monday");
                assert_eq!(r.slot.time, "10am");
            }
            other => panic!("unexpected {:?}", other),
        }
        let o = scheduled(&m, "confirmed");
        m.apply(o).unwrap();
        confirm_all(&mut m);
        assert_eq!(m.session().status(), SessionStatus::Completed);
        assert_eq!(m.session().proposals().len(), 2);
    }

    #[test]
    fn test_cancel_decision_ends_session() {
        let mut m = machine();
        let o = contacted(&m, "no answer");
        m.apply(o).unwrap();
        let o = emailed(&m, "delivered", "");
        m.apply(o).unwrap();
        let o = contacted(&m, "ok");
        m.apply(o).unwrap();
        let o = decided(&m, "Cancel the interview, candidate withdrew", "");
        m.apply(o).unwrap();

        assert!(m.is_finished());
        assert_eq!(m.session().status(), SessionStatus::Cancelled);
        assert!(matches!(
            m.session().setbacks().last(),
            Some(Setback::EscalationCancelled { .. })
        ));
        assert!(m.session().confirmed_proposal().is_none());
    }

    #[test]
    fn test_rejects_outcomes_after_done() {
        let mut m = machine();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = scheduled(&m, "confirmed");
        m.apply(o.clone()).unwrap();
        confirm_all(&mut m);
        assert!(matches!(
            m.apply(o),
            Err(CoordinationError::AlreadyFinished(_))
        ));
    }

    #[test]
    fn test_completes_only_after_last_confirmation() {
        let mut m = machine();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = scheduled(&m, "confirmed");
        m.apply(o).unwrap();

        for remaining in [2, 1] {
            let request = match m.next_request() {
                Some(ActionRequest::Confirm(r)) => r,
                other => panic!("unexpected {:?}", other),
            };
            let t = m
                .apply(ActionOutcome::Confirmed(notify_result(&request, "delivered")))
                .unwrap();
            assert!(!t.changed());
            assert_eq!(m.session().pending().outbox.len(), remaining);
            assert_eq!(m.session().status(), SessionStatus::InProgress);
            assert!(m.session().confirmed_proposal().is_none());
        }

        let request = match m.next_request() {
            Some(ActionRequest::Confirm(r)) => r,
            other => panic!("unexpected {:?}", other),
        };
        let t = m
            .apply(ActionOutcome::Confirmed(notify_result(&request, "delivered")))
            .unwrap();
        assert_eq!(t.to, Stage::Done);
        assert_eq!(m.session().status(), SessionStatus::Completed);
        assert!(m.session().pending().outbox.is_empty());
    }

    #[test]
    fn test_pending_step_tracks_working_state() {
        let mut m = machine();
        assert_eq!(m.session().pending().channel, Channel::Call);
        let o = contacted(&m, "no answer");
        m.apply(o).unwrap();
        assert_eq!(m.session().pending().channel, Channel::Email);

        let o = emailed(&m, "delivered", "");
        m.apply(o).unwrap();
        let open = m.session().pending().escalation.clone().unwrap();
        assert_eq!(open.situation, Situation::InterviewerUnresponsive);
        assert_eq!(open.resume_to, Stage::AwaitInterviewerSlots);
        assert_eq!(open.step, HrStep::Call);

        let o = contacted(&m, "Try again Monday 9am");
        m.apply(o).unwrap();
        let open = m.session().pending().escalation.clone().unwrap();
        assert_eq!(open.step, HrStep::Decision);
        assert_eq!(open.hr_response.as_deref(), Some("Try again Monday 9am"));

        let o = decided(&m, "Call again Monday 9am", "");
        m.apply(o).unwrap();
        let pending = m.session().pending();
        assert!(pending.escalation.is_none());
        assert_eq!(pending.guidance.as_deref(), Some("Call again Monday 9am"));
        assert_eq!(pending.channel, Channel::Call);

        // The stored copy carries the same working state.
        let json = serde_json::to_string(m.session()).unwrap();
        let restored: CoordinationSession = serde_json::from_str(&json).unwrap();
        assert_eq!(
            restored.pending().guidance.as_deref(),
            Some("Call again Monday 9am")
        );
    }

    #[test]
    fn test_abort_is_noted_and_keeps_session_open() {
        let mut m = machine();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = scheduled(&m, "confirmed");
        m.apply(o).unwrap();
        m.abort("input closed");

        let s = m.session();
        assert_eq!(s.status(), SessionStatus::InProgress);
        assert!(s
            .notes()
            .read()
            .contains("Run aborted in await_confirmation: input closed (3 confirmation(s) not sent)"));
    }

    #[test]
    fn test_rejects_mismatched_outcome() {
        let mut m = machine();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let wrong = scheduled_unchecked();
        let err = m.apply(wrong).unwrap_err();
        assert!(matches!(err, CoordinationError::OutcomeMismatch { .. }));
        assert_eq!(m.stage(), Stage::AwaitCandidatePreference);
    }

    fn scheduled_unchecked() -> ActionOutcome {
        ActionOutcome::Scheduled(SchedulingProposal {
            candidate: "Sarah Johnson".to_string(),
            date: "Friday".to_string(),
            time: "3pm".to_string(),
            duration_minutes: 60,
            interview_type: "technical".to_string(),
            status: Status::Success,
            confirmation_id: None,
            raw_outcome_text: "confirmed".to_string(),
            timestamp: Utc::now(),
        })
    }

    #[test]
    fn test_never_done_from_contact_stages() {
        let mut m = machine();
        for text in ["no answer", "failed", "no answer"] {
            if m.stage() == Stage::Escalated {
                break;
            }
            let o = match m.next_request() {
                Some(ActionRequest::Contact { .. }) => contacted(&m, text),
                Some(ActionRequest::FollowUpEmail { .. }) => emailed(&m, "delivered", ""),
                other => panic!("unexpected {:?}", other),
            };
            let t = m.apply(o).unwrap();
            assert_ne!(t.to, Stage::Done);
        }
        assert_eq!(m.stage(), Stage::Escalated);
        assert!(m
            .session()
            .transitions()
            .iter()
            .all(|t| t.to != Stage::Done));
    }

    #[test]
    fn test_failed_confirmation_is_recorded_not_retried() {
        let mut m = machine();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let o = scheduled(&m, "confirmed");
        m.apply(o).unwrap();

        let first = match m.next_request() {
            Some(ActionRequest::Confirm(r)) => r,
            other => panic!("unexpected {:?}", other),
        };
        m.apply(ActionOutcome::Confirmed(notify_result(&first, "bounce error")))
            .unwrap();
        confirm_all(&mut m);

        let s = m.session();
        assert_eq!(s.notifications().len(), 3);
        assert_eq!(s.status(), SessionStatus::Completed);
        assert!(matches!(
            s.setbacks().last(),
            Some(Setback::DeliveryFailure { .. })
        ));
    }

    #[test]
    fn test_notes_follow_transitions() {
        let mut m = machine();
        let o = contacted(&m, "Tuesday 2pm");
        m.apply(o).unwrap();
        let notes = m.session().notes().read();
        assert!(notes.contains("AwaitInterviewerSlots -> AwaitCandidatePreference"));
    }
}
