use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::case::Case;

/// Identifier wrapper for participant, volunteer, and admin accounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub i64);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Participant,
    Volunteer,
    Admin,
}

/// Account record owned by the profile store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: UserId,
    pub role: UserRole,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub language: String,
    pub active: bool,
    pub approved: bool,
}

/// Reference to a catalog treatment. Custom entries get fresh ids from the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TreatmentRef {
    pub id: i64,
    pub name: String,
}

/// Reference to a catalog experience.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExperienceRef {
    pub id: i64,
    pub name: String,
}

/// Catalog quality row. Slugs are stable; labels are display text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quality {
    pub id: i64,
    pub slug: String,
    pub label: String,
}

/// Quality comparators the scoring engine understands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QualitySlug {
    SameAge,
    SameGenderIdentity,
    SameDiagnosis,
    SameMaritalStatus,
    SameParentalStatus,
    SameEthnicOrCulturalGroup,
}

impl QualitySlug {
    pub const ALL: [QualitySlug; 6] = [
        QualitySlug::SameAge,
        QualitySlug::SameGenderIdentity,
        QualitySlug::SameDiagnosis,
        QualitySlug::SameMaritalStatus,
        QualitySlug::SameParentalStatus,
        QualitySlug::SameEthnicOrCulturalGroup,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            QualitySlug::SameAge => "same_age",
            QualitySlug::SameGenderIdentity => "same_gender_identity",
            QualitySlug::SameDiagnosis => "same_diagnosis",
            QualitySlug::SameMaritalStatus => "same_marital_status",
            QualitySlug::SameParentalStatus => "same_parental_status",
            QualitySlug::SameEthnicOrCulturalGroup => "same_ethnic_or_cultural_group",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        Self::ALL.into_iter().find(|slug| slug.as_str() == raw)
    }
}

/// Which half of a profile a preference reads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Scope {
    #[serde(rename = "self")]
    Own,
    #[serde(rename = "loved_one")]
    LovedOne,
}

impl Scope {
    pub const fn as_str(self) -> &'static str {
        match self {
            Scope::Own => "self",
            Scope::LovedOne => "loved_one",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "self" => Some(Scope::Own),
            "loved_one" => Some(Scope::LovedOne),
            _ => None,
        }
    }
}

/// The type of volunteer a preference list is built for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetRole {
    Patient,
    Caregiver,
}

impl TargetRole {
    pub const fn as_str(self) -> &'static str {
        match self {
            TargetRole::Patient => "patient",
            TargetRole::Caregiver => "caregiver",
        }
    }
}

/// Comparison family of a preference, without the referenced item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PreferenceKind {
    Quality,
    Treatment,
    Experience,
}

impl PreferenceKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            PreferenceKind::Quality => "quality",
            PreferenceKind::Treatment => "treatment",
            PreferenceKind::Experience => "experience",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim() {
            "quality" => Some(PreferenceKind::Quality),
            "treatment" => Some(PreferenceKind::Treatment),
            "experience" => Some(PreferenceKind::Experience),
            _ => None,
        }
    }
}

/// One half of a profile. The own half carries `date_of_birth`; the loved-one
/// half carries a free-text `age` captured at intake.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    #[serde(default)]
    pub gender_identity: Option<String>,
    #[serde(default)]
    pub diagnosis: Option<String>,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
    #[serde(default)]
    pub age: Option<String>,
    #[serde(default)]
    pub marital_status: Option<String>,
    #[serde(default)]
    pub has_kids: Option<bool>,
    #[serde(default)]
    pub ethnic_groups: Vec<String>,
    #[serde(default)]
    pub treatments: Vec<TreatmentRef>,
    #[serde(default)]
    pub experiences: Vec<ExperienceRef>,
}

/// Intake record for a participant or volunteer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    #[serde(default)]
    pub has_blood_cancer: Option<bool>,
    #[serde(default)]
    pub caring_for_someone: Option<bool>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub province: Option<String>,
    #[serde(default)]
    pub timezone: Option<String>,
    #[serde(default)]
    pub person: Attributes,
    #[serde(default)]
    pub loved_one: Option<Attributes>,
}

impl Profile {
    pub fn case(&self) -> Case {
        Case::classify(self.has_blood_cancer, self.caring_for_someone)
    }

    /// Attributes for the requested half, if that half was captured.
    pub fn attributes(&self, scope: Scope) -> Option<&Attributes> {
        match scope {
            Scope::Own => Some(&self.person),
            Scope::LovedOne => self.loved_one.as_ref(),
        }
    }
}

/// Volunteer account joined with its intake profile, as loaded by the pool query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Volunteer {
    pub account: UserAccount,
    pub profile: Profile,
}

impl Volunteer {
    pub fn id(&self) -> UserId {
        self.account.id
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct QualityRef {
    pub id: i64,
    pub slug: String,
}

/// The referenced catalog item of a preference.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PreferenceItem {
    Quality(QualityRef),
    Treatment(TreatmentRef),
    Experience(ExperienceRef),
}

impl PreferenceItem {
    pub fn kind(&self) -> PreferenceKind {
        match self {
            PreferenceItem::Quality(_) => PreferenceKind::Quality,
            PreferenceItem::Treatment(_) => PreferenceKind::Treatment,
            PreferenceItem::Experience(_) => PreferenceKind::Experience,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            PreferenceItem::Quality(quality) => &quality.slug,
            PreferenceItem::Treatment(treatment) => &treatment.name,
            PreferenceItem::Experience(experience) => &experience.name,
        }
    }
}

/// Active preference as stored by the profile store, prior to catalog resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceRow {
    pub owner_id: UserId,
    pub target_role: TargetRole,
    pub kind: PreferenceKind,
    pub item_id: i64,
    pub scope: Scope,
    pub rank: u8,
}

/// Active preference with its catalog item resolved, consumed by scoring.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preference {
    pub target_role: TargetRole,
    pub item: PreferenceItem,
    pub scope: Scope,
    pub rank: u8,
}

impl Preference {
    /// Rank 1 carries the heaviest weight.
    pub fn weight(&self) -> f64 {
        if self.rank == 0 {
            return 0.0;
        }
        1.0 / f64::from(self.rank)
    }
}

/// Read-only view of the reference data used to resolve stored preferences.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceCatalog {
    pub qualities: Vec<Quality>,
    pub treatments: Vec<TreatmentRef>,
    pub experiences: Vec<ExperienceRef>,
}

impl ReferenceCatalog {
    /// Returns `None` when the referenced catalog row no longer exists.
    pub fn resolve(&self, row: &PreferenceRow) -> Option<Preference> {
        let item = match row.kind {
            PreferenceKind::Quality => self
                .qualities
                .iter()
                .find(|quality| quality.id == row.item_id)
                .map(|quality| {
                    PreferenceItem::Quality(QualityRef {
                        id: quality.id,
                        slug: quality.slug.clone(),
                    })
                })?,
            PreferenceKind::Treatment => self
                .treatments
                .iter()
                .find(|treatment| treatment.id == row.item_id)
                .cloned()
                .map(PreferenceItem::Treatment)?,
            PreferenceKind::Experience => self
                .experiences
                .iter()
                .find(|experience| experience.id == row.item_id)
                .cloned()
                .map(PreferenceItem::Experience)?,
        };

        Some(Preference {
            target_role: row.target_role,
            item,
            scope: row.scope,
            rank: row.rank,
        })
    }
}
