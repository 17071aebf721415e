use chrono::NaiveDate;
use metrics_exporter_prometheus::PrometheusHandle;
use peer_match::config::MatchingConfig;
use peer_match::matching::{
    Attributes, ExperienceRef, MatchStore, MatchingService, PendingSubmission, PoolFilter,
    PreferenceKind, PreferenceRow, Profile, ProfileStore, Quality, QualitySlug, ReferenceCatalog,
    RepositoryError, Scope, SubmissionStore, TargetRole, TreatmentRef, UserAccount, UserId,
    UserRole, Volunteer,
};
use std::collections::HashMap;
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

pub(crate) type DirectoryService =
    MatchingService<InMemoryProfileStore, InMemoryMatchStore, InMemorySubmissionStore>;

pub(crate) const DEMO_PATIENT: UserId = UserId(1);
pub(crate) const DEMO_CAREGIVER: UserId = UserId(2);
pub(crate) const DEMO_CAREGIVER_WITH_CANCER: UserId = UserId(3);

/// Seeded directory of accounts, intake profiles, and approved preferences.
#[derive(Default, Clone)]
pub(crate) struct InMemoryProfileStore {
    accounts: Arc<Mutex<HashMap<UserId, UserAccount>>>,
    profiles: Arc<Mutex<HashMap<UserId, Profile>>>,
    preferences: Arc<Mutex<HashMap<UserId, Vec<PreferenceRow>>>>,
    catalog: ReferenceCatalog,
}

impl InMemoryProfileStore {
    fn insert(&self, account: UserAccount, profile: Profile) {
        self.profiles
            .lock()
            .expect("profile mutex poisoned")
            .insert(account.id, profile);
        self.accounts
            .lock()
            .expect("account mutex poisoned")
            .insert(account.id, account);
    }

    fn rank(&self, owner: UserId, rows: &[(TargetRole, PreferenceKind, i64, Scope)]) {
        let rows = rows
            .iter()
            .enumerate()
            .map(|(index, (target_role, kind, item_id, scope))| PreferenceRow {
                owner_id: owner,
                target_role: *target_role,
                kind: *kind,
                item_id: *item_id,
                scope: *scope,
                rank: index as u8 + 1,
            })
            .collect();
        self.preferences
            .lock()
            .expect("preference mutex poisoned")
            .insert(owner, rows);
    }
}

impl ProfileStore for InMemoryProfileStore {
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError> {
        let guard = self.accounts.lock().expect("account mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn profile(&self, id: UserId) -> Result<Option<Profile>, RepositoryError> {
        let guard = self.profiles.lock().expect("profile mutex poisoned");
        Ok(guard.get(&id).cloned())
    }

    fn volunteer_pool(&self, filter: &PoolFilter) -> Result<Vec<Volunteer>, RepositoryError> {
        let accounts = self.accounts.lock().expect("account mutex poisoned");
        let profiles = self.profiles.lock().expect("profile mutex poisoned");
        let mut pool: Vec<Volunteer> = accounts
            .values()
            .filter(|account| filter.admits(account))
            .filter_map(|account| {
                profiles.get(&account.id).map(|profile| Volunteer {
                    account: account.clone(),
                    profile: profile.clone(),
                })
            })
            .collect();
        pool.sort_by_key(Volunteer::id);
        Ok(pool)
    }

    fn preferences(&self, owner: UserId) -> Result<Vec<PreferenceRow>, RepositoryError> {
        let guard = self.preferences.lock().expect("preference mutex poisoned");
        Ok(guard.get(&owner).cloned().unwrap_or_default())
    }

    fn catalog(&self) -> Result<ReferenceCatalog, RepositoryError> {
        Ok(self.catalog.clone())
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryMatchStore {
    active: Arc<Mutex<HashMap<UserId, u32>>>,
}

impl MatchStore for InMemoryMatchStore {
    fn count_active_matches(&self, volunteer: UserId) -> Result<u32, RepositoryError> {
        let guard = self.active.lock().expect("match mutex poisoned");
        Ok(guard.get(&volunteer).copied().unwrap_or(0))
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemorySubmissionStore {
    pending: Arc<Mutex<Vec<PendingSubmission>>>,
}

impl SubmissionStore for InMemorySubmissionStore {
    fn submit(&self, submission: PendingSubmission) -> Result<PendingSubmission, RepositoryError> {
        let mut guard = self.pending.lock().expect("submission mutex poisoned");
        // A newer submission supersedes the one still awaiting review.
        guard.retain(|existing| {
            existing.owner_id != submission.owner_id
                || existing.target_role != submission.target_role
                || existing.status != submission.status
        });
        guard.push(submission.clone());
        Ok(submission)
    }
}

impl InMemorySubmissionStore {
    pub(crate) fn pending(&self) -> Vec<PendingSubmission> {
        self.pending
            .lock()
            .expect("submission mutex poisoned")
            .clone()
    }
}

/// Service over the seeded stores. `reference_date` pins age derivation.
pub(crate) fn matching_service(
    config: MatchingConfig,
    reference_date: Option<NaiveDate>,
) -> (Arc<DirectoryService>, InMemorySubmissionStore) {
    let submissions = InMemorySubmissionStore::default();
    let mut service = MatchingService::new(
        Arc::new(seeded_profiles()),
        Arc::new(seeded_matches()),
        Arc::new(submissions.clone()),
        config,
    );
    if let Some(reference_date) = reference_date {
        service = service.with_reference_date(reference_date);
    }
    (Arc::new(service), submissions)
}

fn treatment(id: i64, name: &str) -> TreatmentRef {
    TreatmentRef {
        id,
        name: name.to_string(),
    }
}

fn experience(id: i64, name: &str) -> ExperienceRef {
    ExperienceRef {
        id,
        name: name.to_string(),
    }
}

fn demo_catalog() -> ReferenceCatalog {
    ReferenceCatalog {
        qualities: QualitySlug::ALL
            .iter()
            .enumerate()
            .map(|(index, slug)| Quality {
                id: quality_id(*slug),
                slug: slug.as_str().to_string(),
                label: QUALITY_LABELS[index].to_string(),
            })
            .collect(),
        treatments: vec![
            treatment(1, "Chemotherapy"),
            treatment(2, "Stem cell transplant"),
            treatment(3, "Radiation"),
            treatment(4, "Immunotherapy"),
        ],
        experiences: vec![
            experience(1, "Fatigue"),
            experience(2, "Anxiety"),
            experience(3, "Returning to work"),
        ],
    }
}

const QUALITY_LABELS: [&str; 6] = [
    "Same age",
    "Same gender identity",
    "Same diagnosis",
    "Same marital status",
    "Same parental status",
    "Same ethnic or cultural group",
];

fn quality_id(slug: QualitySlug) -> i64 {
    QualitySlug::ALL
        .iter()
        .position(|candidate| *candidate == slug)
        .map_or(0, |index| index as i64 + 1)
}

fn account(id: i64, role: UserRole, first_name: &str, last_name: &str) -> UserAccount {
    UserAccount {
        id: UserId(id),
        role,
        first_name: first_name.to_string(),
        last_name: last_name.to_string(),
        email: format!(
            "{}.{}@example.org",
            first_name.to_lowercase(),
            last_name.to_lowercase()
        ),
        language: "en".to_string(),
        active: true,
        approved: true,
    }
}

fn born(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year, month, day)
}

struct Seed {
    id: i64,
    has_blood_cancer: bool,
    caring: bool,
    city: &'static str,
    province: &'static str,
    timezone: &'static str,
    person: Attributes,
    loved_one: Option<Attributes>,
}

impl Seed {
    fn profile(self) -> Profile {
        Profile {
            user_id: UserId(self.id),
            has_blood_cancer: Some(self.has_blood_cancer),
            caring_for_someone: Some(self.caring),
            city: Some(self.city.to_string()),
            province: Some(self.province.to_string()),
            timezone: Some(self.timezone.to_string()),
            person: self.person,
            loved_one: self.loved_one,
        }
    }
}

fn person(
    gender: &str,
    diagnosis: Option<&str>,
    date_of_birth: Option<NaiveDate>,
    marital_status: &str,
    has_kids: bool,
) -> Attributes {
    Attributes {
        gender_identity: Some(gender.to_string()),
        diagnosis: diagnosis.map(str::to_string),
        date_of_birth,
        marital_status: Some(marital_status.to_string()),
        has_kids: Some(has_kids),
        ..Attributes::default()
    }
}

fn loved_one(diagnosis: &str, age: &str, treatments: Vec<TreatmentRef>) -> Attributes {
    Attributes {
        diagnosis: Some(diagnosis.to_string()),
        age: Some(age.to_string()),
        treatments,
        ..Attributes::default()
    }
}

pub(crate) fn seeded_profiles() -> InMemoryProfileStore {
    let store = InMemoryProfileStore {
        catalog: demo_catalog(),
        ..InMemoryProfileStore::default()
    };

    let mut amira = person(
        "Woman",
        Some("Acute myeloid leukemia"),
        born(1984, 4, 2),
        "Married",
        true,
    );
    amira.ethnic_groups = vec!["Arab".to_string()];
    amira.treatments = vec![treatment(1, "Chemotherapy")];
    amira.experiences = vec![experience(1, "Fatigue")];
    store.insert(
        account(1, UserRole::Participant, "Amira", "Haddad"),
        Seed {
            id: 1,
            has_blood_cancer: true,
            caring: false,
            city: "Ottawa",
            province: "ON",
            timezone: "America/Toronto",
            person: amira,
            loved_one: None,
        }
        .profile(),
    );

    store.insert(
        account(2, UserRole::Participant, "Daniel", "Okafor"),
        Seed {
            id: 2,
            has_blood_cancer: false,
            caring: true,
            city: "Regina",
            province: "SK",
            timezone: "America/Regina",
            person: person("Man", None, born(1961, 9, 17), "Married", true),
            loved_one: Some(loved_one(
                "Multiple myeloma",
                "63",
                vec![treatment(2, "Stem cell transplant")],
            )),
        }
        .profile(),
    );

    let mut priya = person(
        "Woman",
        Some("Chronic lymphocytic leukemia"),
        born(1972, 1, 8),
        "Divorced",
        true,
    );
    priya.treatments = vec![treatment(4, "Immunotherapy")];
    store.insert(
        account(3, UserRole::Participant, "Priya", "Raman"),
        Seed {
            id: 3,
            has_blood_cancer: true,
            caring: true,
            city: "Surrey",
            province: "BC",
            timezone: "America/Vancouver",
            person: priya,
            loved_one: Some(loved_one(
                "Hodgkin lymphoma",
                "19",
                vec![treatment(3, "Radiation")],
            )),
        }
        .profile(),
    );

    let mut lena = person(
        "Woman",
        Some("Acute myeloid leukemia"),
        born(1981, 6, 30),
        "Married",
        true,
    );
    lena.treatments = vec![
        treatment(1, "Chemotherapy"),
        treatment(2, "Stem cell transplant"),
    ];
    lena.experiences = vec![experience(3, "Returning to work")];
    store.insert(
        account(101, UserRole::Volunteer, "Lena", "Fischer"),
        Seed {
            id: 101,
            has_blood_cancer: true,
            caring: false,
            city: "Toronto",
            province: "ON",
            timezone: "America/Toronto",
            person: lena,
            loved_one: None,
        }
        .profile(),
    );

    let mut marc = person(
        "Man",
        Some("Chronic lymphocytic leukemia"),
        born(1969, 11, 3),
        "Single",
        false,
    );
    marc.treatments = vec![treatment(4, "Immunotherapy")];
    store.insert(
        account(102, UserRole::Volunteer, "Marc", "Tremblay"),
        Seed {
            id: 102,
            has_blood_cancer: true,
            caring: false,
            city: "Montreal",
            province: "QC",
            timezone: "America/Toronto",
            person: marc,
            loved_one: None,
        }
        .profile(),
    );

    let mut sofia = person("Woman", Some("Hodgkin lymphoma"), born(1990, 2, 14), "Married", false);
    sofia.treatments = vec![treatment(1, "Chemotherapy"), treatment(3, "Radiation")];
    sofia.experiences = vec![experience(1, "Fatigue"), experience(2, "Anxiety")];
    store.insert(
        account(103, UserRole::Volunteer, "Sofia", "Alvarez"),
        Seed {
            id: 103,
            has_blood_cancer: true,
            caring: false,
            city: "Calgary",
            province: "AB",
            timezone: "America/Edmonton",
            person: sofia,
            loved_one: None,
        }
        .profile(),
    );

    store.insert(
        account(104, UserRole::Volunteer, "Grace", "Lee"),
        Seed {
            id: 104,
            has_blood_cancer: false,
            caring: true,
            city: "Saskatoon",
            province: "SK",
            timezone: "America/Regina",
            person: person("Woman", None, born(1958, 5, 21), "Married", true),
            loved_one: Some(loved_one(
                "Multiple myeloma",
                "66",
                vec![treatment(2, "Stem cell transplant")],
            )),
        }
        .profile(),
    );

    store.insert(
        account(105, UserRole::Volunteer, "Tom", "Nguyen"),
        Seed {
            id: 105,
            has_blood_cancer: false,
            caring: true,
            city: "Halifax",
            province: "NS",
            timezone: "America/Halifax",
            person: person("Man", None, born(1975, 8, 9), "Widowed", true),
            loved_one: Some(loved_one(
                "Acute lymphoblastic leukemia",
                "12",
                vec![treatment(1, "Chemotherapy")],
            )),
        }
        .profile(),
    );

    let mut inactive = account(106, UserRole::Volunteer, "Inez", "Moreau");
    inactive.active = false;
    store.insert(
        inactive,
        Seed {
            id: 106,
            has_blood_cancer: true,
            caring: false,
            city: "Winnipeg",
            province: "MB",
            timezone: "America/Winnipeg",
            person: person(
                "Woman",
                Some("Acute myeloid leukemia"),
                born(1984, 1, 1),
                "Married",
                true,
            ),
            loved_one: None,
        }
        .profile(),
    );

    let quality = |slug| (PreferenceKind::Quality, quality_id(slug));
    let ranked = |entries: &[((PreferenceKind, i64), Scope)], target_role: TargetRole| {
        entries
            .iter()
            .map(|((kind, item_id), scope)| (target_role, *kind, *item_id, *scope))
            .collect::<Vec<_>>()
    };

    store.rank(
        DEMO_PATIENT,
        &ranked(
            &[
                (quality(QualitySlug::SameDiagnosis), Scope::Own),
                (quality(QualitySlug::SameAge), Scope::Own),
                ((PreferenceKind::Treatment, 1), Scope::Own),
                ((PreferenceKind::Experience, 1), Scope::Own),
            ],
            TargetRole::Patient,
        ),
    );
    store.rank(
        DEMO_CAREGIVER,
        &ranked(
            &[
                (quality(QualitySlug::SameDiagnosis), Scope::LovedOne),
                ((PreferenceKind::Treatment, 2), Scope::LovedOne),
                (quality(QualitySlug::SameMaritalStatus), Scope::Own),
            ],
            TargetRole::Caregiver,
        ),
    );
    store.rank(
        DEMO_CAREGIVER_WITH_CANCER,
        &ranked(
            &[
                (quality(QualitySlug::SameDiagnosis), Scope::LovedOne),
                ((PreferenceKind::Treatment, 3), Scope::LovedOne),
                (quality(QualitySlug::SameGenderIdentity), Scope::Own),
            ],
            TargetRole::Patient,
        ),
    );

    store
}

pub(crate) fn seeded_matches() -> InMemoryMatchStore {
    let store = InMemoryMatchStore::default();
    {
        let mut guard = store.active.lock().expect("match mutex poisoned");
        guard.insert(UserId(101), 3);
        guard.insert(UserId(104), 1);
    }
    store
}

pub(crate) fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .map_err(|err| format!("failed to parse '{raw}' as YYYY-MM-DD ({err})"))
}

pub(crate) fn parse_user_id(raw: &str) -> Result<UserId, String> {
    raw.trim()
        .parse::<i64>()
        .map(UserId)
        .map_err(|err| format!("failed to parse '{raw}' as a user id ({err})"))
}
