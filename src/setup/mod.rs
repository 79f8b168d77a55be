//! Interview setup: who takes part and what is being scheduled.
//!
//! Setups come from the built-in [`Directory`] or from a YAML file:
//!
//! ```yaml
//! company: TechCorp Inc.
//! position: Senior Frontend Developer
//! interview_type: technical      # optional
//! duration_minutes: 60           # optional
//! hr:
//!   name: Jennifer Martinez
//!   title: Senior HR Manager
//!   phone: +1-555-HR01
//!   email: j.martinez@techcorp.com
//! interviewer: { name: Alex Kim, phone: +1-555-ENG01, email: a.kim@techcorp.com }
//! candidate: { name: Sarah Johnson, phone: +1-555-0123, email: sarah.johnson@email.com }
//! ```

mod directory;
mod prompted;

pub use directory::Directory;
pub use prompted::read_setup;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::coordination::{Participant, Role};

/// Errors raised before a session can start.
#[derive(Debug, Error)]
pub enum SetupError {
    #[error("Failed to read setup file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid setup YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid HR contact index {index} (expected 1..={count})")]
    InvalidHrIndex { index: usize, count: usize },

    #[error("{0} name must not be empty")]
    EmptyName(Role),

    #[error("{role} e-mail '{email}' is not a valid address")]
    InvalidEmail { role: Role, email: String },

    #[error("{0} phone must not be empty")]
    EmptyPhone(Role),

    #[error("Position must not be empty")]
    EmptyPosition,

    #[error("Interview duration must be greater than zero")]
    ZeroDuration,

    #[error("Directory has no {0}")]
    EmptyDirectory(&'static str),

    #[error("Failed to read setup from the console: {0}")]
    Console(#[from] std::io::Error),

    #[error("Input closed while asking for {0}")]
    InputClosed(String),
}

/// Values used when a setup leaves type or duration out.
#[derive(Debug, Clone)]
pub struct SetupDefaults {
    pub duration_minutes: u32,
    pub interview_type: String,
}

impl Default for SetupDefaults {
    fn default() -> Self {
        Self {
            duration_minutes: 60,
            interview_type: "technical".to_string(),
        }
    }
}

/// Complete interview setup with all participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterviewSetup {
    pub company: String,
    pub position: String,
    pub interview_type: String,
    pub duration_minutes: u32,
    pub hr: Participant,
    pub interviewer: Participant,
    pub candidate: Participant,
}

#[derive(Debug, Deserialize)]
struct ContactFile {
    name: String,
    #[serde(default)]
    title: Option<String>,
    phone: String,
    email: String,
    #[serde(default)]
    organization: Option<String>,
}

impl ContactFile {
    fn into_participant(self, role: Role, title: &str, organization: &str) -> Participant {
        Participant::new(
            self.name,
            role,
            self.title.unwrap_or_else(|| title.to_string()),
            self.phone,
            self.email,
            self.organization.unwrap_or_else(|| organization.to_string()),
        )
    }
}

#[derive(Debug, Deserialize)]
struct SetupFile {
    company: String,
    position: String,
    #[serde(default)]
    interview_type: Option<String>,
    #[serde(default)]
    duration_minutes: Option<u32>,
    hr: ContactFile,
    interviewer: ContactFile,
    candidate: ContactFile,
}

impl InterviewSetup {
    /// Parse a YAML setup, filling gaps from `defaults`. The result is validated.
    pub fn from_yaml_str(text: &str, defaults: &SetupDefaults) -> Result<Self, SetupError> {
        let file: SetupFile = serde_yaml::from_str(text)?;
        Self::from_setup_file(file, defaults)
    }

    fn from_setup_file(file: SetupFile, defaults: &SetupDefaults) -> Result<Self, SetupError> {
        let company = file.company;
        let setup = Self {
            position: file.position,
            interview_type: file
                .interview_type
                .unwrap_or_else(|| defaults.interview_type.clone()),
            duration_minutes: file.duration_minutes.unwrap_or(defaults.duration_minutes),
            hr: file.hr.into_participant(Role::HrRecruiter, "HR Manager", &company),
            interviewer: file
                .interviewer
                .into_participant(Role::Interviewer, "Interviewer", &company),
            candidate: file
                .candidate
                .into_participant(Role::Candidate, "Candidate", "External"),
            company,
        };
        setup.validate()?;
        Ok(setup)
    }

    pub fn from_yaml_file(path: &Path, defaults: &SetupDefaults) -> Result<Self, SetupError> {
        let text = std::fs::read_to_string(path).map_err(|source| SetupError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&text, defaults)
    }

    /// Reject setups that would make every contact attempt meaningless.
    pub fn validate(&self) -> Result<(), SetupError> {
        if self.position.trim().is_empty() {
            return Err(SetupError::EmptyPosition);
        }
        if self.duration_minutes == 0 {
            return Err(SetupError::ZeroDuration);
        }
        for person in [&self.hr, &self.interviewer, &self.candidate] {
            if person.name.trim().is_empty() {
                return Err(SetupError::EmptyName(person.role));
            }
            if !person.email.contains('@') {
                return Err(SetupError::InvalidEmail {
                    role: person.role,
                    email: person.email.clone(),
                });
            }
            if person.phone.trim().is_empty() {
                return Err(SetupError::EmptyPhone(person.role));
            }
        }
        Ok(())
    }

    /// The setup block shown at the start of a session.
    pub fn initialization_context(&self) -> String {
        let mut out = String::new();
        out.push_str("INTERVIEW COORDINATION SETUP:\n");
        out.push_str(&"=".repeat(33));
        out.push_str("\n\n");
        out.push_str(&format!("Company: {}\n", self.company));
        out.push_str(&format!("Position: {}\n", self.position));
        out.push_str(&format!("Interview Type: {}\n", self.interview_type));
        out.push_str(&format!("Duration: {} minutes\n", self.duration_minutes));
        for (heading, person) in [("HR CONTACT", &self.hr), ("INTERVIEWER", &self.interviewer)] {
            out.push_str(&format!("\n{}:\n", heading));
            out.push_str(&format!("- Name: {}\n", person.name));
            out.push_str(&format!("- Email: {}\n", person.email));
            out.push_str(&format!("- Phone: {}\n", person.phone));
            out.push_str(&format!("- Role: {}\n", person.title));
        }
        out.push_str("\nCANDIDATE TO SCHEDULE:\n");
        out.push_str(&format!("- Name: {}\n", self.candidate.name));
        out.push_str(&format!("- Email: {}\n", self.candidate.email));
        out.push_str(&format!("- Phone: {}\n", self.candidate.phone));
        out.push_str(&format!("- Applying for: {}\n", self.position));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const YAML: &str = r#"
company: TechCorp Inc.
position: Backend Software Engineer
hr:
  name: Jennifer Martinez
  title: Senior HR Manager
  phone: +1-555-HR01
  email: j.martinez@techcorp.com
interviewer:
  name: Alex Kim
  phone: +1-555-ENG01
  email: a.kim@techcorp.com
candidate:
  name: Carlos Mendez
  phone: +1-555-0456
  email: carlos.m@gmail.com
"#;

    #[test]
    fn test_yaml_fills_defaults() {
        let defaults = SetupDefaults {
            duration_minutes: 45,
            interview_type: "behavioral".to_string(),
        };
        let setup = InterviewSetup::from_yaml_str(YAML, &defaults).unwrap();
        assert_eq!(setup.duration_minutes, 45);
        assert_eq!(setup.interview_type, "behavioral");
        assert_eq!(setup.interviewer.role, Role::Interviewer);
        assert_eq!(setup.interviewer.organization, "TechCorp Inc.");
        assert_eq!(setup.interviewer.title, "Interviewer");
        assert_eq!(setup.candidate.organization, "External");
        assert_eq!(setup.hr.title, "Senior HR Manager");
    }

    #[test]
    fn test_yaml_rejects_bad_email() {
        let yaml = YAML.replace("carlos.m@gmail.com", "carlos.m.gmail.com");
        let err = InterviewSetup::from_yaml_str(&yaml, &SetupDefaults::default()).unwrap_err();
        assert!(matches!(
            err,
            SetupError::InvalidEmail {
                role: Role::Candidate,
                ..
            }
        ));
    }

    #[test]
    fn test_yaml_file_missing() {
        let err = InterviewSetup::from_yaml_file(
            Path::new("/nonexistent/setup.yaml"),
            &SetupDefaults::default(),
        )
        .unwrap_err();
        assert!(matches!(err, SetupError::Io { .. }));
    }

    #[test]
    fn test_validate() {
        let mut setup = Directory::builtin().sample_setup().unwrap();
        setup.duration_minutes = 0;
        assert!(matches!(setup.validate(), Err(SetupError::ZeroDuration)));

        let mut setup = Directory::builtin().sample_setup().unwrap();
        setup.interviewer.name = "  ".to_string();
        assert!(matches!(
            setup.validate(),
            Err(SetupError::EmptyName(Role::Interviewer))
        ));

        let mut setup = Directory::builtin().sample_setup().unwrap();
        setup.hr.phone.clear();
        assert!(matches!(
            setup.validate(),
            Err(SetupError::EmptyPhone(Role::HrRecruiter))
        ));
    }

    #[test]
    fn test_initialization_context() {
        let context = Directory::builtin().sample_setup().unwrap().initialization_context();
        assert!(context.starts_with("INTERVIEW COORDINATION SETUP:"));
        assert!(context.contains("Duration: 90 minutes"));
        assert!(context.contains("- Role: Senior Software Engineer"));
        assert!(context.contains("- Applying for: Senior Frontend Developer"));
    }
}
