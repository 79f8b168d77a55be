//! Interview coordination: data model, state machine and driver.

mod coordinator;
mod escalation;
mod machine;
mod result;
mod session;
mod slots;
mod types;

pub use coordinator::{run_many, Coordinator};
pub use escalation::{EscalationPolicy, NextMove, NO_INSTRUCTIONS};
pub use machine::{ActionOutcome, ActionRequest, CoordinationMachine, Stage, Transition};
pub use result::{build as build_result, NO_RESPONSE};
pub use session::{
    CoordinationSession, HrStep, OpenEscalation, PendingStep, SessionStatus, TransitionRecord,
};
pub use slots::{ProposedSlot, TIME_TBD};
pub use types::{
    ActionResult, Channel, ContactAttempt, ContactRequest, EscalationCase, EscalationRequest,
    NotifyRequest, NotifyResult, Participant, Role, ScheduleRequest, SchedulingProposal,
    SessionId, Situation, NOT_DELIVERED, NO_LATENCY, NO_REPLY,
};
