//! Scripted responder: replays a fixed list of answers in order.

use std::collections::VecDeque;
use std::path::Path;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::{Prompt, PromptKind, Responder, ResponderError};

/// Answers prompts from a queue, one entry per prompt.
///
/// Every prompt consumes exactly one entry, including secondary prompts
/// (e-mail reply, reply latency, additional instructions).
pub struct ScriptedResponder {
    replies: Mutex<VecDeque<String>>,
    asked: Mutex<Vec<PromptKind>>,
}

impl ScriptedResponder {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
            asked: Mutex::new(Vec::new()),
        }
    }

    /// Load replies from a YAML list of strings.
    pub async fn from_yaml_file(path: &Path) -> anyhow::Result<Self> {
        let content = tokio::fs::read_to_string(path).await?;
        let replies: Vec<String> = serde_yaml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("Invalid script {}: {}", path.display(), e))?;
        Ok(Self::new(replies))
    }

    /// Number of replies not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }

    /// Prompt kinds asked so far, in order.
    pub async fn asked(&self) -> Vec<PromptKind> {
        self.asked.lock().await.clone()
    }
}

#[async_trait]
impl Responder for ScriptedResponder {
    async fn ask(&self, prompt: &Prompt) -> Result<String, ResponderError> {
        self.asked.lock().await.push(prompt.kind);
        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .ok_or(ResponderError::ScriptExhausted(prompt.kind))?;
        tracing::debug!(kind = ?prompt.kind, reply = %reply, "scripted answer");
        Ok(reply)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replies_in_order_then_exhausted() {
        tokio_test::block_on(async {
            let responder = ScriptedResponder::new(["first", "second"]);
            let prompt = Prompt::new(PromptKind::CallOutcome, "?");
            assert_eq!(responder.ask(&prompt).await.unwrap(), "first");
            assert_eq!(responder.remaining().await, 1);
            assert_eq!(responder.ask(&prompt).await.unwrap(), "second");
            assert!(matches!(
                responder.ask(&prompt).await,
                Err(ResponderError::ScriptExhausted(PromptKind::CallOutcome))
            ));
            assert_eq!(responder.asked().await.len(), 3);
        });
    }

    #[tokio::test]
    async fn test_from_yaml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("script.yaml");
        tokio::fs::write(&path, "- Available Tuesday 2pm\n- \"\"\n")
            .await
            .unwrap();
        let responder = ScriptedResponder::from_yaml_file(&path).await.unwrap();
        assert_eq!(responder.remaining().await, 2);
    }
}
