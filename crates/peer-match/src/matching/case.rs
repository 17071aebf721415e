use serde::{Deserialize, Serialize};

/// Participant state derived from the two intake flow flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Case {
    Patient,
    CaregiverWithCancer,
    CaregiverWithoutCancer,
}

impl Case {
    /// Unset flags read as "no", so every flag combination yields a case.
    pub fn classify(has_blood_cancer: Option<bool>, caring_for_someone: Option<bool>) -> Self {
        let has_blood_cancer = has_blood_cancer.unwrap_or(false);
        if caring_for_someone.unwrap_or(false) {
            if has_blood_cancer {
                Case::CaregiverWithCancer
            } else {
                Case::CaregiverWithoutCancer
            }
        } else {
            Case::Patient
        }
    }

    pub const fn is_caregiver(self) -> bool {
        matches!(self, Case::CaregiverWithCancer | Case::CaregiverWithoutCancer)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Case::Patient => "patient",
            Case::CaregiverWithCancer => "caregiver_with_cancer",
            Case::CaregiverWithoutCancer => "caregiver_without_cancer",
        }
    }
}
