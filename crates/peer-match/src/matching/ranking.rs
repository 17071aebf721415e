use std::cmp::Ordering;
use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::domain::{Attributes, Preference, Profile, TargetRole, UserId, Volunteer};
use super::eligibility::CandidateFilter;
use super::scoring::ScoringEngine;

pub const DEFAULT_RESULT_LIMIT: usize = 5;

/// Participant-facing view of a volunteer; contact details stay out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VolunteerSummary {
    pub id: UserId,
    pub first_name: String,
    pub city: Option<String>,
    pub province: Option<String>,
    pub timezone: Option<String>,
    pub diagnosis: Option<String>,
}

impl VolunteerSummary {
    fn from_volunteer(volunteer: &Volunteer) -> Self {
        Self {
            id: volunteer.id(),
            first_name: volunteer.account.first_name.clone(),
            city: volunteer.profile.city.clone(),
            province: volunteer.profile.province.clone(),
            timezone: volunteer.profile.timezone.clone(),
            diagnosis: volunteer.profile.person.diagnosis.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedVolunteer {
    pub volunteer: VolunteerSummary,
    pub score: f64,
}

/// Denormalized candidate record for the admin matching screen.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdminCandidateView {
    pub volunteer_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub language: String,
    pub has_blood_cancer: Option<bool>,
    pub caring_for_someone: Option<bool>,
    pub city: Option<String>,
    pub province: Option<String>,
    pub timezone: Option<String>,
    pub person: Attributes,
    pub loved_one: Option<Attributes>,
    /// Score scaled to 0-100, two decimals.
    pub match_score: f64,
    pub active_match_count: u32,
}

/// Orders candidate volunteers by score, best first. Ties fall back to volunteer id.
#[derive(Debug, Clone, Copy)]
pub struct Ranker {
    engine: ScoringEngine,
}

impl Ranker {
    pub fn new(engine: ScoringEngine) -> Self {
        Self { engine }
    }

    pub fn engine(&self) -> &ScoringEngine {
        &self.engine
    }

    pub fn rank(
        &self,
        participant: &Profile,
        target_role: TargetRole,
        pool: &[Volunteer],
        preferences: &[Preference],
        limit: usize,
    ) -> Vec<RankedVolunteer> {
        self.scored(participant, target_role, pool, preferences)
            .into_iter()
            .take(limit)
            .map(|(volunteer, score)| RankedVolunteer {
                volunteer: VolunteerSummary::from_volunteer(volunteer),
                score,
            })
            .collect()
    }

    /// `active_counts` is informational; volunteers missing from it show zero.
    pub fn rank_admin(
        &self,
        participant: &Profile,
        target_role: TargetRole,
        pool: &[Volunteer],
        preferences: &[Preference],
        active_counts: &HashMap<UserId, u32>,
    ) -> Vec<AdminCandidateView> {
        self.scored(participant, target_role, pool, preferences)
            .into_iter()
            .map(|(volunteer, score)| AdminCandidateView {
                volunteer_id: volunteer.id(),
                first_name: volunteer.account.first_name.clone(),
                last_name: volunteer.account.last_name.clone(),
                email: volunteer.account.email.clone(),
                language: volunteer.account.language.clone(),
                has_blood_cancer: volunteer.profile.has_blood_cancer,
                caring_for_someone: volunteer.profile.caring_for_someone,
                city: volunteer.profile.city.clone(),
                province: volunteer.profile.province.clone(),
                timezone: volunteer.profile.timezone.clone(),
                person: volunteer.profile.person.clone(),
                loved_one: volunteer.profile.loved_one.clone(),
                match_score: percentage(score),
                active_match_count: active_counts.get(&volunteer.id()).copied().unwrap_or(0),
            })
            .collect()
    }

    /// Eligible volunteers with their scores, sorted best first. With no usable
    /// preferences every eligible volunteer is kept at zero.
    pub fn scored<'a>(
        &self,
        participant: &Profile,
        target_role: TargetRole,
        pool: &'a [Volunteer],
        preferences: &[Preference],
    ) -> Vec<(&'a Volunteer, f64)> {
        let filter = CandidateFilter::new(participant.case(), target_role);
        let mut scored: Vec<_> = filter
            .eligible_pool(pool)
            .into_iter()
            .map(|volunteer| {
                let score = self.engine.score(
                    participant,
                    &volunteer.profile,
                    target_role,
                    preferences,
                );
                (volunteer, score)
            })
            .collect();

        scored.sort_by(|(left, left_score), (right, right_score)| {
            match right_score.total_cmp(left_score) {
                Ordering::Equal => left.id().cmp(&right.id()),
                other => other,
            }
        });
        scored
    }
}

fn percentage(score: f64) -> f64 {
    (score * 100.0 * 100.0).round() / 100.0
}
