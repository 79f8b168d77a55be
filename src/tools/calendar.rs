//! `schedule_calendar` tool.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};

use super::{Tool, ToolContext};
use crate::actions;
use crate::coordination::{ProposedSlot, ScheduleRequest};

pub struct ScheduleCalendar;

#[derive(Debug, Deserialize)]
struct ScheduleCalendarArgs {
    candidate_name: String,
    date: String,
    time: String,
    #[serde(default = "default_duration")]
    duration_minutes: u32,
    #[serde(default = "default_interview_type")]
    interview_type: String,
}

fn default_duration() -> u32 {
    60
}

fn default_interview_type() -> String {
    "technical".to_string()
}

#[async_trait]
impl Tool for ScheduleCalendar {
    fn name(&self) -> &str {
        "schedule_calendar"
    }

    fn description(&self) -> &str {
        "Book an interview slot on the calendar. Returns a meeting id on success or the conflict description."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "candidate_name": {"type": "string"},
                "date": {"type": "string", "description": "Interview date (e.g. 'Tuesday', '2025-03-14')"},
                "time": {"type": "string", "description": "Interview time (e.g. '2pm', '14:00')"},
                "duration_minutes": {"type": "integer", "default": 60},
                "interview_type": {"type": "string", "default": "technical"}
            },
            "required": ["candidate_name", "date", "time"]
        })
    }

    async fn execute(&self, args: Value, ctx: &ToolContext) -> anyhow::Result<String> {
        let args: ScheduleCalendarArgs = serde_json::from_value(args)?;
        if args.duration_minutes == 0 {
            anyhow::bail!("duration_minutes must be greater than zero");
        }
        let request = ScheduleRequest {
            candidate: args.candidate_name,
            slot: ProposedSlot::new(args.date, args.time),
            duration_minutes: args.duration_minutes,
            interview_type: args.interview_type,
        };

        let proposal = actions::schedule(ctx.responder.as_ref(), &request).await?;
        Ok(serde_json::to_string_pretty(&json!({
            "status": proposal.status,
            "candidate_name": proposal.candidate,
            "scheduled_date": proposal.date,
            "scheduled_time": proposal.time,
            "duration_minutes": proposal.duration_minutes,
            "interview_type": proposal.interview_type,
            "confirmation": proposal.raw_outcome_text,
            "meeting_id": proposal.confirmation_id,
        }))?)
    }
}
