//! Responders supply the outcome text of every requested action.
//!
//! The coordination logic never talks to a phone line, calendar or mailbox
//! directly. Each action asks a [`Responder`] one question at a time and
//! receives a single opaque string back. Swapping the responder swaps the
//! integration:
//! - [`ConsoleResponder`]: a human operator types simulated outcomes
//! - [`ScriptedResponder`]: canned replies, for tests and replays
//! - [`TimeoutResponder`]: wraps another responder and converts a missed
//!   deadline into the prompt's "no answer" equivalent

mod console;
mod scripted;
mod timeout;

pub use console::ConsoleResponder;
pub use scripted::ScriptedResponder;
pub use timeout::TimeoutResponder;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// What a prompt is asking for. Used for routing and timeout fallbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PromptKind {
    CallOutcome,
    EmailDelivery,
    EmailReply,
    ReplyLatency,
    ScheduleOutcome,
    Decision,
    Instructions,
    SqlOutcome,
    SqlResults,
    SqlMetrics,
}

impl PromptKind {
    /// Text substituted when no answer arrives before the deadline.
    ///
    /// `None` means there is no safe substitute and the prompt must fail.
    pub fn timeout_fallback(&self) -> Option<&'static str> {
        match self {
            Self::CallOutcome => Some("no answer (timed out)"),
            Self::EmailDelivery => Some("delivery failed: timed out"),
            Self::EmailReply | Self::Instructions => Some(""),
            Self::ReplyLatency => Some("N/A"),
            Self::ScheduleOutcome => Some("failed: no confirmation before timeout"),
            Self::SqlOutcome => Some("error: timed out waiting for database"),
            Self::SqlResults | Self::SqlMetrics => Some(""),
            Self::Decision => None,
        }
    }
}

/// A single question put to a responder.
#[derive(Debug, Clone)]
pub struct Prompt {
    pub kind: PromptKind,
    /// Context lines shown before the question (who, what, when).
    pub context: Vec<String>,
    /// The question itself.
    pub question: String,
}

impl Prompt {
    pub fn new(kind: PromptKind, question: impl Into<String>) -> Self {
        Self {
            kind,
            context: Vec::new(),
            question: question.into(),
        }
    }

    /// Add a context line.
    pub fn line(mut self, line: impl Into<String>) -> Self {
        self.context.push(line.into());
        self
    }
}

/// Errors raised while obtaining an answer.
#[derive(Debug, thiserror::Error)]
pub enum ResponderError {
    #[error("Input closed while waiting for {0:?}")]
    InputClosed(PromptKind),

    #[error("No scripted reply left for {0:?}")]
    ScriptExhausted(PromptKind),

    #[error("Timed out after {secs}s waiting for {kind:?}")]
    TimedOut { kind: PromptKind, secs: u64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of outcome text for requested actions.
#[async_trait]
pub trait Responder: Send + Sync {
    /// Answer one prompt with free text.
    async fn ask(&self, prompt: &Prompt) -> Result<String, ResponderError>;
}

#[async_trait]
impl<R: Responder + ?Sized> Responder for std::sync::Arc<R> {
    async fn ask(&self, prompt: &Prompt) -> Result<String, ResponderError> {
        (**self).ask(prompt).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{classify, Domain, Status};

    #[test]
    fn test_timeout_fallbacks_classify_as_negative() {
        let call = PromptKind::CallOutcome.timeout_fallback().unwrap();
        assert_eq!(classify(call, Domain::Contact), Status::NoAnswer);

        let delivery = PromptKind::EmailDelivery.timeout_fallback().unwrap();
        assert_eq!(classify(delivery, Domain::Email), Status::Failed);

        let schedule = PromptKind::ScheduleOutcome.timeout_fallback().unwrap();
        assert_eq!(classify(schedule, Domain::Scheduling), Status::Conflict);

        assert!(PromptKind::Decision.timeout_fallback().is_none());
    }

    #[test]
    fn test_prompt_builder() {
        let prompt = Prompt::new(PromptKind::CallOutcome, "Describe the call")
            .line("To: Alex")
            .line("Phone: 555");
        assert_eq!(prompt.context.len(), 2);
        assert_eq!(prompt.question, "Describe the call");
    }
}
