//! Mock contact directory used by the CLI harness and tests.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::coordination::{Participant, Role};

use super::{InterviewSetup, SetupDefaults, SetupError};

const HR_CONTACTS: &[(&str, &str, &str, &str, &str)] = &[
    ("Jennifer Martinez", "Senior HR Manager", "+1-555-HR01", "j.martinez@techcorp.com", "TechCorp Inc."),
    ("Michael Thompson", "Talent Acquisition Lead", "+1-555-HR02", "m.thompson@innovatesoft.com", "InnovateSoft Solutions"),
    ("Sarah Chen", "HR Business Partner", "+1-555-HR03", "s.chen@datatech.io", "DataTech Analytics"),
    ("David Rodriguez", "Recruitment Manager", "+1-555-HR04", "d.rodriguez@cloudnext.com", "CloudNext Technologies"),
    ("Emily Johnson", "People Operations Manager", "+1-555-HR05", "e.johnson@fintech.pro", "FinTech Pro"),
];

const INTERVIEWERS: &[(&str, &str, &str, &str, &str)] = &[
    ("Alex Kim", "Senior Software Engineer", "+1-555-ENG01", "a.kim@techcorp.com", "TechCorp Inc."),
    ("Lisa Wang", "Tech Lead", "+1-555-ENG02", "l.wang@innovatesoft.com", "InnovateSoft Solutions"),
    ("Robert Brown", "Principal Engineer", "+1-555-ENG03", "r.brown@datatech.io", "DataTech Analytics"),
    ("Maria Garcia", "Engineering Manager", "+1-555-ENG04", "m.garcia@cloudnext.com", "CloudNext Technologies"),
    ("James Wilson", "Staff Software Engineer", "+1-555-ENG05", "j.wilson@fintech.pro", "FinTech Pro"),
];

const CANDIDATES: &[(&str, &str, &str, &str, &str)] = &[
    ("Sarah Johnson", "Frontend Developer Candidate", "+1-555-0123", "sarah.johnson@email.com", "External"),
    ("Carlos Mendez", "Backend Developer Candidate", "+1-555-0456", "carlos.m@gmail.com", "External"),
    ("Priya Patel", "Full Stack Developer Candidate", "+1-555-0789", "priya.patel@outlook.com", "External"),
    ("Kevin O'Brien", "DevOps Engineer Candidate", "+1-555-0321", "kevin.obrien@yahoo.com", "External"),
    ("Aisha Hassan", "Data Scientist Candidate", "+1-555-0654", "aisha.hassan@protonmail.com", "External"),
];

const POSITIONS: &[&str] = &[
    "Senior Frontend Developer",
    "Backend Software Engineer",
    "Full Stack Developer",
    "DevOps Engineer",
    "Data Scientist",
    "Mobile App Developer",
    "UI/UX Designer",
    "Product Manager",
    "Engineering Manager",
    "Cloud Architect",
];

const INTERVIEW_TYPES: &[&str] = &["technical", "behavioral", "system design", "cultural fit"];
const DURATIONS: &[u32] = &[45, 60, 90, 120];

fn people(rows: &[(&str, &str, &str, &str, &str)], role: Role) -> Vec<Participant> {
    rows.iter()
        .map(|(name, title, phone, email, org)| Participant::new(*name, role, *title, *phone, *email, *org))
        .collect()
}

/// HR contacts, interviewers, candidates and open positions.
#[derive(Debug, Clone)]
pub struct Directory {
    pub hr_contacts: Vec<Participant>,
    pub interviewers: Vec<Participant>,
    pub candidates: Vec<Participant>,
    pub positions: Vec<String>,
}

impl Directory {
    /// The built-in mock directory.
    pub fn builtin() -> Self {
        Self {
            hr_contacts: people(HR_CONTACTS, Role::HrRecruiter),
            interviewers: people(INTERVIEWERS, Role::Interviewer),
            candidates: people(CANDIDATES, Role::Candidate),
            positions: POSITIONS.iter().map(|p| p.to_string()).collect(),
        }
    }

    /// Interviewers working for `organization`.
    pub fn interviewers_at(&self, organization: &str) -> Vec<&Participant> {
        self.interviewers
            .iter()
            .filter(|i| i.organization == organization)
            .collect()
    }

    /// Fixed demo setup: Jennifer Martinez, Alex Kim and Sarah Johnson for a
    /// 90-minute technical interview.
    pub fn sample_setup(&self) -> Result<InterviewSetup, SetupError> {
        let hr = first(&self.hr_contacts, "HR contacts")?.clone();
        Ok(InterviewSetup {
            company: hr.organization.clone(),
            position: first(&self.positions, "positions")?.clone(),
            interview_type: "technical".to_string(),
            duration_minutes: 90,
            hr,
            interviewer: first(&self.interviewers, "interviewers")?.clone(),
            candidate: first(&self.candidates, "candidates")?.clone(),
        })
    }

    /// Random setup; the interviewer always works at the HR contact's company.
    pub fn random_setup<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<InterviewSetup, SetupError> {
        let hr = pick(&self.hr_contacts, "HR contacts", rng)?.clone();
        let interviewer = match self.interviewers_at(&hr.organization).choose(rng) {
            Some(colleague) => (*colleague).clone(),
            None => first(&self.interviewers, "interviewers")?.clone(),
        };
        Ok(InterviewSetup {
            company: hr.organization.clone(),
            position: pick(&self.positions, "positions", rng)?.clone(),
            interview_type: INTERVIEW_TYPES.choose(rng).unwrap_or(&"technical").to_string(),
            duration_minutes: *DURATIONS.choose(rng).unwrap_or(&60),
            hr,
            interviewer,
            candidate: pick(&self.candidates, "candidates", rng)?.clone(),
        })
    }

    /// Setup for the `index`-th HR contact (1-based) with defaults for type and duration.
    pub fn setup_for_hr<R: Rng + ?Sized>(
        &self,
        index: usize,
        defaults: &SetupDefaults,
        rng: &mut R,
    ) -> Result<InterviewSetup, SetupError> {
        if index == 0 || index > self.hr_contacts.len() {
            return Err(SetupError::InvalidHrIndex {
                index,
                count: self.hr_contacts.len(),
            });
        }
        let hr = self.hr_contacts[index - 1].clone();
        let interviewer = match self.interviewers_at(&hr.organization).first() {
            Some(colleague) => (*colleague).clone(),
            None => first(&self.interviewers, "interviewers")?.clone(),
        };
        Ok(InterviewSetup {
            company: hr.organization.clone(),
            position: pick(&self.positions, "positions", rng)?.clone(),
            interview_type: defaults.interview_type.clone(),
            duration_minutes: defaults.duration_minutes,
            hr,
            interviewer,
            candidate: pick(&self.candidates, "candidates", rng)?.clone(),
        })
    }
}

fn first<'a, T>(items: &'a [T], what: &'static str) -> Result<&'a T, SetupError> {
    items.first().ok_or(SetupError::EmptyDirectory(what))
}

fn pick<'a, T, R: Rng + ?Sized>(
    items: &'a [T],
    what: &'static str,
    rng: &mut R,
) -> Result<&'a T, SetupError> {
    items.choose(rng).ok_or(SetupError::EmptyDirectory(what))
}

impl Default for Directory {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_sample_setup() {
        let setup = Directory::builtin().sample_setup().unwrap();
        assert_eq!(setup.hr.name, "Jennifer Martinez");
        assert_eq!(setup.interviewer.name, "Alex Kim");
        assert_eq!(setup.candidate.name, "Sarah Johnson");
        assert_eq!(setup.position, "Senior Frontend Developer");
        assert_eq!(setup.duration_minutes, 90);
        assert!(setup.validate().is_ok());
    }

    #[test]
    fn test_random_setup_keeps_interviewer_in_company() {
        let directory = Directory::builtin();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..20 {
            let setup = directory.random_setup(&mut rng).unwrap();
            assert_eq!(setup.interviewer.organization, setup.hr.organization);
            assert_eq!(setup.company, setup.hr.organization);
            assert!(DURATIONS.contains(&setup.duration_minutes));
            assert!(setup.validate().is_ok());
        }
    }

    #[test]
    fn test_setup_for_hr_is_one_based() {
        let directory = Directory::builtin();
        let defaults = SetupDefaults::default();
        let mut rng = StdRng::seed_from_u64(1);

        let setup = directory.setup_for_hr(4, &defaults, &mut rng).unwrap();
        assert_eq!(setup.hr.name, "David Rodriguez");
        assert_eq!(setup.interviewer.name, "Maria Garcia");
        assert_eq!(setup.duration_minutes, 60);
        assert_eq!(setup.interview_type, "technical");

        assert!(matches!(
            directory.setup_for_hr(0, &defaults, &mut rng),
            Err(SetupError::InvalidHrIndex { index: 0, count: 5 })
        ));
        assert!(directory.setup_for_hr(6, &defaults, &mut rng).is_err());
    }

    #[test]
    fn test_empty_directory_is_an_error() {
        let empty = Directory {
            hr_contacts: Vec::new(),
            interviewers: Vec::new(),
            candidates: Vec::new(),
            positions: Vec::new(),
        };
        let mut rng = StdRng::seed_from_u64(3);
        assert!(matches!(
            empty.sample_setup(),
            Err(SetupError::EmptyDirectory("HR contacts"))
        ));
        assert!(empty.random_setup(&mut rng).is_err());
        assert!(empty
            .setup_for_hr(1, &SetupDefaults::default(), &mut rng)
            .is_err());

        // HR present, but nobody else to pick from.
        let hr_only = Directory {
            hr_contacts: Directory::builtin().hr_contacts,
            ..empty
        };
        assert!(matches!(
            hr_only.random_setup(&mut rng),
            Err(SetupError::EmptyDirectory("interviewers"))
        ));
        assert!(matches!(
            hr_only.sample_setup(),
            Err(SetupError::EmptyDirectory("positions"))
        ));
    }
}
