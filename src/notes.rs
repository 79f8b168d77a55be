//! Session-scoped notepad.
//!
//! Each coordination session (and each tool context) owns its own notepad;
//! there is no process-wide note store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line written to the notepad.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteEntry {
    pub text: String,
    pub at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Notepad {
    entries: Vec<NoteEntry>,
}

impl Notepad {
    pub fn new() -> Self {
        Self::default()
    }

    /// Full notepad content, one entry per line.
    pub fn read(&self) -> String {
        self.entries
            .iter()
            .map(|e| e.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Replace all content.
    pub fn write(&mut self, content: impl Into<String>) {
        self.entries.clear();
        self.append(content);
    }

    /// Add a line.
    pub fn append(&mut self, content: impl Into<String>) {
        let text = content.into();
        if text.is_empty() {
            return;
        }
        self.entries.push(NoteEntry {
            text,
            at: Utc::now(),
        });
    }

    pub fn entries(&self) -> &[NoteEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
