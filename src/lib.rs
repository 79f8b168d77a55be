//! # Interview Scheduler
//!
//! Coordinates a single interview between an interviewer, a candidate and an
//! HR/recruiter escalation contact. Every action (call, e-mail, calendar
//! booking, human decision) gets its outcome as free text from a pluggable
//! [`responder::Responder`]; the text is classified into a status and drives a
//! small state machine.
//!
//! ## Workflow
//!
//! ```text
//!   AwaitInterviewerSlots ──► AwaitCandidatePreference ──► AwaitConfirmation ──► Done
//!            │                          │                          │              ▲
//!            └──────────────┬───────────┴──────────────────────────┘              │
//!                           ▼                                                     │
//!                       Escalated ──── resolved: resume ── cancelled ─────────────┘
//! ```
//!
//! ## Modules
//! - `classify`: keyword rules turning outcome text into a status
//! - `coordination`: data model, state machine, escalation policy, driver
//! - `actions`: call, e-mail and booking actions performed against a responder
//! - `responder`: console, scripted and timeout responders
//! - `setup`: participants, mock directory, YAML setups
//! - `store`: session persistence (memory, JSON file, SQLite)
//! - `tools`: the actions exposed as JSON tools for agent runtimes

pub mod actions;
pub mod classify;
pub mod config;
pub mod coordination;
pub mod error;
pub mod notes;
pub mod responder;
pub mod setup;
pub mod store;
pub mod tools;

pub use config::Config;
pub use coordination::{run_many, Coordinator, CoordinationSession};
pub use error::{CoordinationError, Setback};
