//! Extraction of a proposed interview slot from free text.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Placeholder time when the text names none.
pub const TIME_TBD: &str = "TBD";

/// Date and time to put on the calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProposedSlot {
    pub date: String,
    pub time: String,
}

fn date_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?i)\b(\d{4}-\d{2}-\d{2}|\d{1,2}/\d{1,2}(?:/\d{2,4})?|(?:next\s+)?(?:monday|tuesday|wednesday|thursday|friday|saturday|sunday)|tomorrow|today)\b",
        )
        .expect("date pattern is valid")
    })
}

fn time_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i)\b(\d{1,2}(?::[0-5]\d)?\s*(?:am|pm)|(?:[01]?\d|2[0-3]):[0-5]\d)\b")
            .expect("time pattern is valid")
    })
}

impl ProposedSlot {
    pub fn new(date: impl Into<String>, time: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            time: time.into(),
        }
    }

    /// Find the first date and/or time mentioned in `text`.
    ///
    /// Returns `None` when the text names neither.
    pub fn find(text: &str) -> Option<Self> {
        let date = date_pattern().find(text).map(|m| m.as_str().to_string());
        let time = time_pattern().find(text).map(|m| m.as_str().to_string());
        if date.is_none() && time.is_none() {
            return None;
        }
        Some(Self {
            date: date.unwrap_or_else(|| TIME_TBD.to_string()),
            time: time.unwrap_or_else(|| TIME_TBD.to_string()),
        })
    }

    /// Like [`find`](Self::find), but falls back to the raw text as the date.
    pub fn from_text(text: &str) -> Self {
        Self::find(text).unwrap_or_else(|| Self {
            date: text.trim().to_string(),
            time: TIME_TBD.to_string(),
        })
    }
}

impl std::fmt::Display for ProposedSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} at {}", self.date, self.time)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weekday_and_meridiem_time() {
        let slot = ProposedSlot::find("Tuesday 2pm works best for me").unwrap();
        assert_eq!(slot, ProposedSlot::new("Tuesday", "2pm"));
    }

    #[test]
    fn test_iso_date_and_clock_time() {
        let slot = ProposedSlot::find("Let's do 2025-03-14 at 14:30").unwrap();
        assert_eq!(slot, ProposedSlot::new("2025-03-14", "14:30"));
    }

    #[test]
    fn test_first_mention_wins() {
        let slot = ProposedSlot::find("Thursday 10:00 am, or Friday 3 pm").unwrap();
        assert_eq!(slot.date, "Thursday");
        assert_eq!(slot.time, "10:00 am");
    }

    #[test]
    fn test_partial_matches() {
        let slot = ProposedSlot::find("next Monday works").unwrap();
        assert_eq!(slot, ProposedSlot::new("next Monday", TIME_TBD));
        let slot = ProposedSlot::find("any day at 9am").unwrap();
        assert_eq!(slot, ProposedSlot::new(TIME_TBD, "9am"));
    }

    #[test]
    fn test_time_must_end_at_word_boundary() {
        assert!(ProposedSlot::find("around 2pmish").is_none());
        let slot = ProposedSlot::find("Friday, 10amx").unwrap();
        assert_eq!(slot, ProposedSlot::new("Friday", TIME_TBD));
    }

    #[test]
    fn test_fallback_to_raw_text() {
        assert!(ProposedSlot::find("whenever suits").is_none());
        let slot = ProposedSlot::from_text("  whenever suits ");
        assert_eq!(slot, ProposedSlot::new("whenever suits", TIME_TBD));
    }
}
