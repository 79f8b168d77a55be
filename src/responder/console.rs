//! Console responder: a human operator types the simulated outcome.

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Stdin};
use tokio::sync::Mutex;

use super::{Prompt, PromptKind, Responder, ResponderError};

/// Prompts on stdout and reads one line per answer from stdin.
pub struct ConsoleResponder {
    input: Mutex<BufReader<Stdin>>,
}

impl ConsoleResponder {
    pub fn new() -> Self {
        Self {
            input: Mutex::new(BufReader::new(tokio::io::stdin())),
        }
    }
}

impl Default for ConsoleResponder {
    fn default() -> Self {
        Self::new()
    }
}

fn icon(kind: PromptKind) -> &'static str {
    match kind {
        PromptKind::CallOutcome => "📞",
        PromptKind::EmailDelivery | PromptKind::EmailReply | PromptKind::ReplyLatency => "📧",
        PromptKind::ScheduleOutcome => "📅",
        PromptKind::Decision | PromptKind::Instructions => "🤝",
        PromptKind::SqlOutcome | PromptKind::SqlResults | PromptKind::SqlMetrics => "🔍",
    }
}

#[async_trait]
impl Responder for ConsoleResponder {
    async fn ask(&self, prompt: &Prompt) -> Result<String, ResponderError> {
        let mut out = tokio::io::stdout();
        let mut text = String::from("\n");
        for (i, line) in prompt.context.iter().enumerate() {
            if i == 0 {
                text.push_str(&format!("{} {}\n", icon(prompt.kind), line));
            } else {
                text.push_str(&format!("{}\n", line));
            }
        }
        text.push_str(&format!("\n{}\n> ", prompt.question));
        out.write_all(text.as_bytes()).await?;
        out.flush().await?;

        let mut line = String::new();
        let read = self.input.lock().await.read_line(&mut line).await?;
        if read == 0 {
            return Err(ResponderError::InputClosed(prompt.kind));
        }
        let answer = line.trim_end_matches(&['\r', '\n'][..]).to_string();
        tracing::debug!(kind = ?prompt.kind, answer = %answer, "console answer");
        Ok(answer)
    }
}
