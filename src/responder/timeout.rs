//! Deadline wrapper for responders.

use std::time::Duration;

use async_trait::async_trait;

use super::{Prompt, Responder, ResponderError};

/// Bounds how long any single prompt may block.
///
/// On expiry the prompt's [`timeout_fallback`](super::PromptKind::timeout_fallback)
/// text is returned, which classifies as the negative outcome of its domain.
/// Prompts without a fallback (human decisions) fail with
/// [`ResponderError::TimedOut`].
pub struct TimeoutResponder<R> {
    inner: R,
    limit: Duration,
}

impl<R: Responder> TimeoutResponder<R> {
    pub fn new(inner: R, limit: Duration) -> Self {
        Self { inner, limit }
    }
}

#[async_trait]
impl<R: Responder> Responder for TimeoutResponder<R> {
    async fn ask(&self, prompt: &Prompt) -> Result<String, ResponderError> {
        match tokio::time::timeout(self.limit, self.inner.ask(prompt)).await {
            Ok(answer) => answer,
            Err(_) => {
                tracing::warn!(
                    kind = ?prompt.kind,
                    secs = self.limit.as_secs(),
                    "responder timed out"
                );
                prompt
                    .kind
                    .timeout_fallback()
                    .map(str::to_string)
                    .ok_or(ResponderError::TimedOut {
                        kind: prompt.kind,
                        secs: self.limit.as_secs(),
                    })
            }
        }
    }
}
