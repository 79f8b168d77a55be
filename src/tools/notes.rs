//! `manage_notes` tool backed by the context's notepad.

use async_trait::async_trait;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolContext};

pub struct ManageNotes;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "lowercase")]
enum NotesAction {
    Read,
    Write,
    Append,
}

#[derive(Debug, Deserialize)]
struct ManageNotesArgs {
    action: NotesAction,
    #[serde(default)]
    content: String,
}

#[async_trait]
impl Tool for ManageNotes {
    fn name(&self) -> &str {
        "manage_notes"
    }

    fn description(&self) -> &str {
        "Read, overwrite or append to the coordination notepad."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "action": {"type": "string", "enum": ["read", "write", "append"]},
                "content": {"type": "string", "description": "Text to write or append"}
            },
            "required": ["action"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let args: ManageNotesArgs = serde_json::from_value(args)?;
        let timestamp = Utc::now();

        let value = match args.action {
            NotesAction::Read => {
                let notes = ctx.notes.read().await;
                json!({
                    "status": "success",
                    "action": "read",
                    "current_notes": notes.read(),
                    "timestamp": timestamp,
                })
            }
            NotesAction::Write | NotesAction::Append => {
                let mut notes = ctx.notes.write().await;
                let action = match args.action {
                    NotesAction::Write => {
                        notes.write(args.content.clone());
                        "write"
                    }
                    _ => {
                        notes.append(args.content.clone());
                        "append"
                    }
                };
                json!({
                    "status": "success",
                    "action": action,
                    "content": args.content,
                    "timestamp": timestamp,
                })
            }
        };
        Ok(serde_json::to_string_pretty(&value)?)
    }
}
