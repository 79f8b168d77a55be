//! Outcome classification.
//!
//! Turns free-text outcome descriptions into a [`Status`] using an ordered rule
//! table per [`Domain`]. Matching is a case-insensitive substring check; every
//! negative rule of a domain is tried before the domain's positive default, so
//! text that matches no keyword (including empty or garbled text) always maps
//! to the positive status.
//!
//! # Properties
//! - `classify` is pure: the same `(text, domain)` always yields the same status.
//! - No input is rejected; classification never fails.

use serde::{Deserialize, Serialize};

/// Derived status of an attempted action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Success,
    NoAnswer,
    Conflict,
    Failed,
    Resolved,
    Cancelled,
}

impl Status {
    /// Whether this status lets the workflow move forward without intervention.
    pub fn is_positive(&self) -> bool {
        matches!(self, Self::Success | Self::Resolved)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Success => write!(f, "success"),
            Self::NoAnswer => write!(f, "no_answer"),
            Self::Conflict => write!(f, "conflict"),
            Self::Failed => write!(f, "failed"),
            Self::Resolved => write!(f, "resolved"),
            Self::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Which rule set applies to a piece of outcome text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Domain {
    /// Outcome of a phone call.
    Contact,
    /// Candidate's answer to offered slots (call outcome that may also reject the slots).
    Preference,
    /// Outcome of a calendar booking.
    Scheduling,
    /// Delivery confirmation of an e-mail.
    Email,
    /// Human decision on an escalation.
    Escalation,
}

/// One negative rule: any keyword present yields `status`.
#[derive(Debug, Clone, Copy)]
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub status: Status,
}

/// The ordered rules of one domain.
#[derive(Debug, Clone, Copy)]
pub struct RuleSet {
    pub domain: Domain,
    pub negative: &'static [Rule],
    pub positive: Status,
}

/// The full rule table, one entry per domain.
pub const RULES: &[RuleSet] = &[
    RuleSet {
        domain: Domain::Contact,
        negative: &[Rule {
            keywords: &["no answer", "failed"],
            status: Status::NoAnswer,
        }],
        positive: Status::Success,
    },
    RuleSet {
        domain: Domain::Preference,
        negative: &[
            Rule {
                keywords: &["no answer", "failed"],
                status: Status::NoAnswer,
            },
            Rule {
                keywords: &["conflict"],
                status: Status::Conflict,
            },
        ],
        positive: Status::Success,
    },
    RuleSet {
        domain: Domain::Scheduling,
        negative: &[Rule {
            keywords: &["conflict", "fail"],
            status: Status::Conflict,
        }],
        positive: Status::Success,
    },
    RuleSet {
        domain: Domain::Email,
        negative: &[Rule {
            keywords: &["fail", "error"],
            status: Status::Failed,
        }],
        positive: Status::Success,
    },
    RuleSet {
        domain: Domain::Escalation,
        negative: &[Rule {
            keywords: &["cancel"],
            status: Status::Cancelled,
        }],
        positive: Status::Resolved,
    },
];

/// Look up the rule set for a domain.
pub fn rules_for(domain: Domain) -> &'static RuleSet {
    RULES
        .iter()
        .find(|set| set.domain == domain)
        .unwrap_or(&RULES[0])
}

/// Classify outcome text within a domain.
pub fn classify(text: &str, domain: Domain) -> Status {
    let lowered = text.to_lowercase();
    let set = rules_for(domain);
    set.negative
        .iter()
        .find(|rule| rule.keywords.iter().any(|kw| lowered.contains(kw)))
        .map(|rule| rule.status)
        .unwrap_or(set.positive)
}

/// Classify an e-mail sent as a contact attempt.
///
/// A failed delivery or an empty reply means the participant was not reached.
/// Otherwise the reply is classified with `reply_domain`.
pub fn classify_email_contact(delivery: &str, reply: Option<&str>, reply_domain: Domain) -> Status {
    if classify(delivery, Domain::Email) == Status::Failed {
        return Status::NoAnswer;
    }
    match reply.map(str::trim) {
        Some(text) if !text.is_empty() => classify(text, reply_domain),
        _ => Status::NoAnswer,
    }
}
