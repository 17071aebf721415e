use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use axum::response::Response;
use chrono::NaiveDate;
use serde_json::{json, Value};

use crate::config::MatchingConfig;
use crate::matching::domain::{
    Attributes, ExperienceRef, Preference, PreferenceItem, PreferenceKind, PreferenceRow, Profile,
    Quality, QualityRef, QualitySlug, ReferenceCatalog, Scope, TargetRole, TreatmentRef,
    UserAccount, UserId, UserRole, Volunteer,
};
use crate::matching::repository::{
    MatchStore, PendingSubmission, PoolFilter, ProfileStore, RepositoryError, SubmissionStore,
};
use crate::matching::scoring::ScoringEngine;
use crate::matching::service::MatchingService;
use crate::matching::validation::RawPreference;

pub(super) const PATIENT_PARTICIPANT: UserId = UserId(1);
pub(super) const CAREGIVER_PARTICIPANT: UserId = UserId(2);
pub(super) const PARTICIPANT_WITHOUT_INTAKE: UserId = UserId(3);
pub(super) const PARTICIPANT_WITHOUT_PREFERENCES: UserId = UserId(4);
pub(super) const ADMIN: UserId = UserId(5);

pub(super) const VOLUNTEER_X: UserId = UserId(100);
pub(super) const VOLUNTEER_Y: UserId = UserId(101);
pub(super) const VOLUNTEER_Z: UserId = UserId(102);
pub(super) const FRENCH_VOLUNTEER: UserId = UserId(103);
pub(super) const CAREGIVER_VOLUNTEER: UserId = UserId(104);

pub(super) const AML: &str = "Acute myeloid leukemia";

pub(super) fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).expect("valid date")
}

pub(super) fn born(year: i32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, 3, 15)
}

pub(super) fn engine() -> ScoringEngine {
    ScoringEngine::new(today())
}

pub(super) fn quality(slug: QualitySlug) -> Quality {
    let id = QualitySlug::ALL
        .iter()
        .position(|candidate| *candidate == slug)
        .expect("known slug") as i64
        + 1;
    Quality {
        id,
        slug: slug.as_str().to_string(),
        label: slug.as_str().replace('_', " "),
    }
}

pub(super) fn chemotherapy() -> TreatmentRef {
    TreatmentRef {
        id: 10,
        name: "Chemotherapy".to_string(),
    }
}

pub(super) fn stem_cell_transplant() -> TreatmentRef {
    TreatmentRef {
        id: 11,
        name: "Stem cell transplant".to_string(),
    }
}

pub(super) fn radiation() -> TreatmentRef {
    TreatmentRef {
        id: 12,
        name: "Radiation".to_string(),
    }
}

pub(super) fn fatigue() -> ExperienceRef {
    ExperienceRef {
        id: 20,
        name: "Fatigue".to_string(),
    }
}

pub(super) fn anxiety() -> ExperienceRef {
    ExperienceRef {
        id: 21,
        name: "Anxiety".to_string(),
    }
}

pub(super) fn catalog() -> ReferenceCatalog {
    ReferenceCatalog {
        qualities: QualitySlug::ALL.into_iter().map(quality).collect(),
        treatments: vec![chemotherapy(), stem_cell_transplant(), radiation()],
        experiences: vec![fatigue(), anxiety()],
    }
}

pub(super) fn account(id: UserId, role: UserRole) -> UserAccount {
    UserAccount {
        id,
        role,
        first_name: format!("First{}", id.0),
        last_name: format!("Last{}", id.0),
        email: format!("user{}@example.org", id.0),
        language: "en".to_string(),
        active: true,
        approved: true,
    }
}

pub(super) fn patient_profile(id: UserId) -> Profile {
    Profile {
        user_id: id,
        has_blood_cancer: Some(true),
        caring_for_someone: Some(false),
        city: Some("Calgary".to_string()),
        province: Some("AB".to_string()),
        timezone: Some("America/Edmonton".to_string()),
        person: Attributes {
            gender_identity: Some("Woman".to_string()),
            diagnosis: Some(AML.to_string()),
            date_of_birth: born(1985),
            age: None,
            marital_status: Some("Married".to_string()),
            has_kids: Some(true),
            ethnic_groups: vec!["South Asian".to_string()],
            treatments: vec![chemotherapy()],
            experiences: vec![fatigue()],
        },
        loved_one: None,
    }
}

pub(super) fn caregiver_profile(id: UserId, has_blood_cancer: bool) -> Profile {
    let mut person = Attributes {
        gender_identity: Some("Man".to_string()),
        date_of_birth: born(1970),
        marital_status: Some("Married".to_string()),
        has_kids: Some(false),
        ethnic_groups: vec!["Filipino".to_string()],
        ..Attributes::default()
    };
    if has_blood_cancer {
        person.diagnosis = Some("Hodgkin lymphoma".to_string());
        person.treatments = vec![radiation()];
        person.experiences = vec![fatigue()];
    }

    Profile {
        user_id: id,
        has_blood_cancer: Some(has_blood_cancer),
        caring_for_someone: Some(true),
        city: Some("Halifax".to_string()),
        province: Some("NS".to_string()),
        timezone: Some("America/Halifax".to_string()),
        person,
        loved_one: Some(Attributes {
            gender_identity: Some("Woman".to_string()),
            diagnosis: Some("Multiple myeloma".to_string()),
            age: Some("68".to_string()),
            treatments: vec![stem_cell_transplant(), chemotherapy()],
            experiences: vec![anxiety()],
            ..Attributes::default()
        }),
    }
}

pub(super) fn volunteer(id: UserId, profile: Profile) -> Volunteer {
    Volunteer {
        account: account(id, UserRole::Volunteer),
        profile,
    }
}

/// Patient-volunteer with the participant's diagnosis, two years younger.
pub(super) fn volunteer_x() -> Volunteer {
    let mut profile = patient_profile(VOLUNTEER_X);
    profile.person.date_of_birth = born(1987);
    volunteer(VOLUNTEER_X, profile)
}

/// Caregiver-volunteer sharing the participant's diagnosis.
pub(super) fn volunteer_y() -> Volunteer {
    let mut profile = caregiver_profile(VOLUNTEER_Y, true);
    profile.person.diagnosis = Some(AML.to_string());
    volunteer(VOLUNTEER_Y, profile)
}

/// Patient-volunteer with another diagnosis, same birth year.
pub(super) fn volunteer_z() -> Volunteer {
    let mut profile = patient_profile(VOLUNTEER_Z);
    profile.person.diagnosis = Some("Chronic lymphocytic leukemia".to_string());
    volunteer(VOLUNTEER_Z, profile)
}

pub(super) fn french_volunteer() -> Volunteer {
    let mut volunteer = volunteer(FRENCH_VOLUNTEER, patient_profile(FRENCH_VOLUNTEER));
    volunteer.account.language = "fr".to_string();
    volunteer
}

pub(super) fn caregiver_volunteer() -> Volunteer {
    let mut profile = caregiver_profile(CAREGIVER_VOLUNTEER, false);
    profile.person.marital_status = Some(" married ".to_string());
    volunteer(CAREGIVER_VOLUNTEER, profile)
}

pub(super) fn quality_preference(
    slug: QualitySlug,
    scope: Scope,
    rank: u8,
    target_role: TargetRole,
) -> Preference {
    let quality = quality(slug);
    Preference {
        target_role,
        item: PreferenceItem::Quality(QualityRef {
            id: quality.id,
            slug: quality.slug,
        }),
        scope,
        rank,
    }
}

pub(super) fn treatment_preference(
    treatment: TreatmentRef,
    scope: Scope,
    rank: u8,
    target_role: TargetRole,
) -> Preference {
    Preference {
        target_role,
        item: PreferenceItem::Treatment(treatment),
        scope,
        rank,
    }
}

pub(super) fn experience_preference(
    experience: ExperienceRef,
    scope: Scope,
    rank: u8,
    target_role: TargetRole,
) -> Preference {
    Preference {
        target_role,
        item: PreferenceItem::Experience(experience),
        scope,
        rank,
    }
}

/// Preferences of the patient participant: diagnosis first, age second.
pub(super) fn scenario_a_preferences() -> Vec<Preference> {
    vec![
        quality_preference(QualitySlug::SameDiagnosis, Scope::Own, 1, TargetRole::Patient),
        quality_preference(QualitySlug::SameAge, Scope::Own, 2, TargetRole::Patient),
    ]
}

pub(super) fn row(
    owner_id: UserId,
    target_role: TargetRole,
    kind: PreferenceKind,
    item_id: i64,
    scope: Scope,
    rank: u8,
) -> PreferenceRow {
    PreferenceRow {
        owner_id,
        target_role,
        kind,
        item_id,
        scope,
        rank,
    }
}

pub(super) fn raw(kind: &str, item_id: Value, scope: &str, rank: i64) -> RawPreference {
    RawPreference {
        kind: kind.to_string(),
        item_id,
        scope: scope.to_string(),
        rank,
    }
}

pub(super) fn raw_quality(item_id: i64, rank: i64) -> RawPreference {
    raw("quality", json!(item_id), "self", rank)
}

#[derive(Default, Clone)]
pub(super) struct MemoryProfiles {
    users: HashMap<UserId, UserAccount>,
    profiles: HashMap<UserId, Profile>,
    preferences: HashMap<UserId, Vec<PreferenceRow>>,
    catalog: ReferenceCatalog,
}

impl MemoryProfiles {
    pub(super) fn with_catalog(mut self, catalog: ReferenceCatalog) -> Self {
        self.catalog = catalog;
        self
    }

    pub(super) fn with_account(mut self, account: UserAccount) -> Self {
        self.users.insert(account.id, account);
        self
    }

    pub(super) fn with_participant(mut self, profile: Profile) -> Self {
        self.users.insert(
            profile.user_id,
            account(profile.user_id, UserRole::Participant),
        );
        self.profiles.insert(profile.user_id, profile);
        self
    }

    pub(super) fn with_volunteer(mut self, volunteer: Volunteer) -> Self {
        self.profiles
            .insert(volunteer.account.id, volunteer.profile.clone());
        self.users.insert(volunteer.account.id, volunteer.account);
        self
    }

    pub(super) fn with_preferences(mut self, owner: UserId, rows: Vec<PreferenceRow>) -> Self {
        self.preferences.insert(owner, rows);
        self
    }
}

impl ProfileStore for MemoryProfiles {
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Ok(self.users.get(&id).cloned())
    }

    fn profile(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        Ok(self.profiles.get(&id).cloned())
    }

    fn volunteer_pool(&self, filter: &PoolFilter) -> Result<Vec<Volunteer>, RepositoryError> {
        let mut pool: Vec<Volunteer> = self
            .users
            .values()
            .filter(|account| filter.admits(account))
            .filter_map(|account| {
                self.profiles.get(&account.id).map(|profile| Volunteer {
                    account: account.clone(),
                    profile: profile.clone(),
                })
            })
            .collect();
        pool.sort_by_key(|volunteer| volunteer.id());
        Ok(pool)
    }

    fn preferences(&self, owner: UserId) -> Result<Vec<PreferenceRow>, RepositoryError> {
        Ok(self.preferences.get(&owner).cloned().unwrap_or_default())
    }

    fn catalog(&self) -> Result<ReferenceCatalog, RepositoryError> {
        Ok(self.catalog.clone())
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryMatches {
    counts: HashMap<UserId, u32>,
}

impl MemoryMatches {
    pub(super) fn with_count(mut self, volunteer: UserId, count: u32) -> Self {
        self.counts.insert(volunteer, count);
        self
    }
}

impl MatchStore for MemoryMatches {
    fn count_active_matches(&self, volunteer: UserId) -> Result<u32, RepositoryError> {
        Ok(self.counts.get(&volunteer).copied().unwrap_or(0))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemorySubmissions {
    submissions: Arc<Mutex<Vec<PendingSubmission>>>,
}

impl MemorySubmissions {
    pub(super) fn submitted(&self) -> Vec<PendingSubmission> {
        self.submissions
            .lock()
            .expect("submission mutex poisoned")
            .clone()
    }
}

impl SubmissionStore for MemorySubmissions {
    fn submit(&self, submission: PendingSubmission) -> Result<PendingSubmission, RepositoryError> {
        self.submissions
            .lock()
            .expect("submission mutex poisoned")
            .push(submission.clone());
        Ok(submission)
    }
}

pub(super) struct UnavailableProfiles;

impl ProfileStore for UnavailableProfiles {
    fn user(&self, _id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn profile(&self, _id: UserId) -> Result<Option<Profile>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn volunteer_pool(&self, _filter: &PoolFilter) -> Result<Vec<Volunteer>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn preferences(&self, _owner: UserId) -> Result<Vec<PreferenceRow>, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }

    fn catalog(&self) -> Result<ReferenceCatalog, RepositoryError> {
        Err(RepositoryError::Unavailable("database offline".to_string()))
    }
}

/// Store seeded with the patient and caregiver scenarios.
pub(super) fn seeded_profiles() -> MemoryProfiles {
    MemoryProfiles::default()
        .with_catalog(catalog())
        .with_participant(patient_profile(PATIENT_PARTICIPANT))
        .with_participant(caregiver_profile(CAREGIVER_PARTICIPANT, false))
        .with_participant(patient_profile(PARTICIPANT_WITHOUT_PREFERENCES))
        .with_account(account(PARTICIPANT_WITHOUT_INTAKE, UserRole::Participant))
        .with_account(account(ADMIN, UserRole::Admin))
        .with_volunteer(volunteer_x())
        .with_volunteer(volunteer_y())
        .with_volunteer(volunteer_z())
        .with_volunteer(french_volunteer())
        .with_volunteer(caregiver_volunteer())
        .with_preferences(
            PATIENT_PARTICIPANT,
            vec![
                row(
                    PATIENT_PARTICIPANT,
                    TargetRole::Patient,
                    PreferenceKind::Quality,
                    quality(QualitySlug::SameAge).id,
                    Scope::Own,
                    2,
                ),
                row(
                    PATIENT_PARTICIPANT,
                    TargetRole::Patient,
                    PreferenceKind::Quality,
                    quality(QualitySlug::SameDiagnosis).id,
                    Scope::Own,
                    1,
                ),
            ],
        )
        .with_preferences(
            CAREGIVER_PARTICIPANT,
            vec![row(
                CAREGIVER_PARTICIPANT,
                TargetRole::Caregiver,
                PreferenceKind::Quality,
                quality(QualitySlug::SameMaritalStatus).id,
                Scope::Own,
                1,
            )],
        )
}

pub(super) type TestService = MatchingService<MemoryProfiles, MemoryMatches, MemorySubmissions>;

pub(super) fn service_with(profiles: MemoryProfiles) -> (TestService, Arc<MemorySubmissions>) {
    let submissions = Arc::new(MemorySubmissions::default());
    let matches = MemoryMatches::default().with_count(VOLUNTEER_X, 2);
    let service = MatchingService::new(
        Arc::new(profiles),
        Arc::new(matches),
        submissions.clone(),
        MatchingConfig::default(),
    )
    .with_reference_date(today());
    (service, submissions)
}

pub(super) fn build_service() -> (TestService, Arc<MemorySubmissions>) {
    service_with(seeded_profiles())
}

pub(super) fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 64 * 1024)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}
