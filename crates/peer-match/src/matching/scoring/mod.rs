mod accessors;
mod comparators;

pub(crate) use accessors::is_supported;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::domain::{
    Preference, PreferenceItem, PreferenceKind, Profile, QualitySlug, Scope, TargetRole,
};
use super::eligibility::CandidateFilter;

/// Stateless comparator scoring one participant/volunteer pair against a preference list.
///
/// `reference_date` anchors age derivation so repeated calls with the same inputs agree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScoringEngine {
    reference_date: NaiveDate,
}

impl ScoringEngine {
    pub fn new(reference_date: NaiveDate) -> Self {
        Self { reference_date }
    }

    pub fn reference_date(&self) -> NaiveDate {
        self.reference_date
    }

    /// Normalized compatibility in `[0, 1]`.
    pub fn score(
        &self,
        participant: &Profile,
        volunteer: &Profile,
        target_role: TargetRole,
        preferences: &[Preference],
    ) -> f64 {
        self.evaluate(participant, volunteer, target_role, preferences).score
    }

    /// Preferences stored for another target role are ignored. An eligible volunteer
    /// with nothing left to compare scores zero.
    pub fn evaluate(
        &self,
        participant: &Profile,
        volunteer: &Profile,
        target_role: TargetRole,
        preferences: &[Preference],
    ) -> MatchEvaluation {
        let filter = CandidateFilter::new(participant.case(), target_role);
        if !filter.is_eligible(volunteer) {
            return MatchEvaluation::excluded();
        }

        let mut components = Vec::with_capacity(preferences.len());
        let mut total = 0.0;
        let mut max_total = 0.0;

        for preference in preferences
            .iter()
            .filter(|preference| preference.target_role == target_role)
        {
            let weight = preference.weight();
            let volunteer_scope = if filter.forces_volunteer_self_scope() {
                Scope::Own
            } else {
                preference.scope
            };
            let value = self.criterion_value(participant, volunteer, preference, volunteer_scope);

            total += weight * value;
            max_total += weight;
            components.push(CriterionScore {
                kind: preference.item.kind(),
                item: preference.item.label().to_string(),
                participant_scope: preference.scope,
                volunteer_scope,
                rank: preference.rank,
                weight,
                value,
            });
        }

        let score = if max_total > 0.0 {
            total / max_total
        } else {
            0.0
        };

        MatchEvaluation {
            eligible: true,
            score,
            total,
            max_total,
            components,
        }
    }

    fn criterion_value(
        &self,
        participant: &Profile,
        volunteer: &Profile,
        preference: &Preference,
        volunteer_scope: Scope,
    ) -> f64 {
        match &preference.item {
            PreferenceItem::Quality(quality) => {
                let Some(slug) = QualitySlug::parse(&quality.slug) else {
                    return 0.0;
                };
                let ours =
                    accessors::resolve(participant, slug, preference.scope, self.reference_date);
                let theirs =
                    accessors::resolve(volunteer, slug, volunteer_scope, self.reference_date);
                comparators::quality_match(ours, theirs)
            }
            PreferenceItem::Treatment(treatment) => volunteer
                .attributes(volunteer_scope)
                .map(|attributes| comparators::has_treatment(attributes, treatment))
                .map(comparators::indicator)
                .unwrap_or(0.0),
            PreferenceItem::Experience(experience) => volunteer
                .attributes(volunteer_scope)
                .map(|attributes| comparators::has_experience(attributes, experience))
                .map(comparators::indicator)
                .unwrap_or(0.0),
        }
    }
}

/// Per-preference contribution, kept for audits of a computed score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CriterionScore {
    pub kind: PreferenceKind,
    pub item: String,
    pub participant_scope: Scope,
    pub volunteer_scope: Scope,
    pub rank: u8,
    pub weight: f64,
    pub value: f64,
}

/// Outcome of scoring a single volunteer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvaluation {
    pub eligible: bool,
    pub score: f64,
    pub total: f64,
    pub max_total: f64,
    pub components: Vec<CriterionScore>,
}

impl MatchEvaluation {
    fn excluded() -> Self {
        Self {
            eligible: false,
            score: 0.0,
            total: 0.0,
            max_total: 0.0,
            components: Vec::new(),
        }
    }
}
