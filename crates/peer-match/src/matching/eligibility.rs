use super::case::Case;
use super::domain::{Profile, TargetRole, Volunteer};

/// Eligibility class of a volunteer, derived from the volunteer's own flow flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VolunteerClass {
    Patient,
    Caregiver,
    Unclassified,
}

impl VolunteerClass {
    pub fn of(profile: &Profile) -> Self {
        if profile.caring_for_someone == Some(true) {
            VolunteerClass::Caregiver
        } else if profile.has_blood_cancer == Some(true) {
            VolunteerClass::Patient
        } else {
            VolunteerClass::Unclassified
        }
    }
}

/// Restricts the volunteer pool according to the participant's case and target role.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateFilter {
    case: Case,
    target_role: TargetRole,
}

impl CandidateFilter {
    pub fn new(case: Case, target_role: TargetRole) -> Self {
        Self { case, target_role }
    }

    pub fn case(&self) -> Case {
        self.case
    }

    pub fn target_role(&self) -> TargetRole {
        self.target_role
    }

    /// The class of volunteer this participant may be matched with, if any.
    pub fn wanted_class(&self) -> Option<VolunteerClass> {
        match (self.target_role, self.case.is_caregiver()) {
            (TargetRole::Patient, _) => Some(VolunteerClass::Patient),
            (TargetRole::Caregiver, true) => Some(VolunteerClass::Caregiver),
            (TargetRole::Caregiver, false) => None,
        }
    }

    /// A caregiver looking for a patient-volunteer compares against the volunteer's own data.
    pub fn forces_volunteer_self_scope(&self) -> bool {
        self.case.is_caregiver() && self.target_role == TargetRole::Patient
    }

    pub fn is_eligible(&self, volunteer: &Profile) -> bool {
        match self.wanted_class() {
            Some(wanted) => VolunteerClass::of(volunteer) == wanted,
            None => false,
        }
    }

    pub fn eligible_pool<'a>(&self, volunteers: &'a [Volunteer]) -> Vec<&'a Volunteer> {
        volunteers
            .iter()
            .filter(|volunteer| self.is_eligible(&volunteer.profile))
            .collect()
    }
}
