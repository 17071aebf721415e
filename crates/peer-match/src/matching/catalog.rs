use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::case::Case;
use super::domain::{PreferenceKind, Profile, Quality, QualitySlug, Scope, TargetRole};
use super::scoring::is_supported;

/// Selectable quality with the scopes the participant may currently pick for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualityOption {
    pub id: i64,
    pub slug: String,
    pub label: String,
    pub allowed_scopes: Vec<Scope>,
}

/// Treatment or experience drawn from the participant's own intake data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DynamicOption {
    pub kind: PreferenceKind,
    pub id: i64,
    pub name: String,
    pub scope: Scope,
}

/// Everything the preference editor may offer for one target role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceOptions {
    pub target_role: TargetRole,
    pub case: Option<Case>,
    pub static_qualities: Vec<QualityOption>,
    pub dynamic_options: Vec<DynamicOption>,
}

/// Builds the option catalog for a participant. A missing intake profile yields
/// every quality with no selectable scope and no dynamic options.
pub fn build_options(
    profile: Option<&Profile>,
    qualities: &[Quality],
    target_role: TargetRole,
) -> PreferenceOptions {
    let static_qualities = qualities
        .iter()
        .map(|quality| QualityOption {
            id: quality.id,
            slug: quality.slug.clone(),
            label: quality.label.clone(),
            allowed_scopes: profile
                .map(|profile| allowed_scopes(profile, &quality.slug))
                .unwrap_or_default(),
        })
        .collect();

    let dynamic_options = profile.map(collect_dynamic_options).unwrap_or_default();

    PreferenceOptions {
        target_role,
        case: profile.map(Profile::case),
        static_qualities,
        dynamic_options,
    }
}

fn allowed_scopes(profile: &Profile, slug: &str) -> Vec<Scope> {
    let Some(slug) = QualitySlug::parse(slug) else {
        return Vec::new();
    };

    [Scope::Own, Scope::LovedOne]
        .into_iter()
        .filter(|scope| is_supported(slug, *scope) && scope_available(profile, slug, *scope))
        .collect()
}

fn scope_available(profile: &Profile, slug: QualitySlug, scope: Scope) -> bool {
    match (slug, scope) {
        (QualitySlug::SameDiagnosis, Scope::Own) => {
            profile.has_blood_cancer == Some(true) && has_text(&profile.person.diagnosis)
        }
        (QualitySlug::SameDiagnosis, Scope::LovedOne) => profile
            .loved_one
            .as_ref()
            .is_some_and(|loved_one| has_text(&loved_one.diagnosis)),
        (_, Scope::Own) => true,
        (_, Scope::LovedOne) => profile.case().is_caregiver() && profile.loved_one.is_some(),
    }
}

fn has_text(value: &Option<String>) -> bool {
    value
        .as_deref()
        .is_some_and(|value| !value.trim().is_empty())
}

fn dynamic_scopes(case: Case) -> &'static [Scope] {
    match case {
        Case::Patient => &[Scope::Own],
        Case::CaregiverWithoutCancer => &[Scope::LovedOne],
        Case::CaregiverWithCancer => &[Scope::Own, Scope::LovedOne],
    }
}

fn collect_dynamic_options(profile: &Profile) -> Vec<DynamicOption> {
    let mut seen = HashSet::new();
    let mut options = Vec::new();

    for scope in dynamic_scopes(profile.case()) {
        let Some(attributes) = profile.attributes(*scope) else {
            continue;
        };

        let treatments = attributes.treatments.iter().map(|treatment| DynamicOption {
            kind: PreferenceKind::Treatment,
            id: treatment.id,
            name: treatment.name.clone(),
            scope: *scope,
        });
        let experiences = attributes.experiences.iter().map(|experience| DynamicOption {
            kind: PreferenceKind::Experience,
            id: experience.id,
            name: experience.name.clone(),
            scope: *scope,
        });

        for option in treatments.chain(experiences) {
            if seen.insert((option.kind, option.id, option.scope)) {
                options.push(option);
            }
        }
    }

    options.sort_by_cached_key(|option| {
        (
            option.scope.as_str(),
            option.kind.as_str(),
            option.name.to_lowercase(),
        )
    });
    options
}
