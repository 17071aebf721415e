use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Local, NaiveDate};
use tracing::{debug, info, warn};

use crate::config::MatchingConfig;

use super::case::Case;
use super::catalog::{build_options, PreferenceOptions};
use super::domain::{
    Preference, PreferenceRow, Profile, TargetRole, UserAccount, UserId, UserRole, Volunteer,
};
use super::eligibility::CandidateFilter;
use super::ranking::{AdminCandidateView, RankedVolunteer, Ranker};
use super::repository::{
    MatchStore, PendingSubmission, PoolFilter, ProfileStore, RepositoryError, SubmissionStatus,
    SubmissionStore,
};
use super::scoring::ScoringEngine;
use super::validation::{PreferenceValidationError, PreferenceValidator, RawPreference};

/// Service composing the profile, match, and submission stores with the scoring core.
pub struct MatchingService<P, M, S> {
    profiles: Arc<P>,
    matches: Arc<M>,
    submissions: Arc<S>,
    validator: PreferenceValidator,
    config: MatchingConfig,
    reference_date: Option<NaiveDate>,
}

/// Inputs shared by both discovery views, loaded before any scoring starts.
struct Discovery {
    profile: Profile,
    target_role: TargetRole,
    preferences: Vec<Preference>,
    pool: Vec<Volunteer>,
}

impl<P, M, S> MatchingService<P, M, S>
where
    P: ProfileStore + 'static,
    M: MatchStore + 'static,
    S: SubmissionStore + 'static,
{
    pub fn new(
        profiles: Arc<P>,
        matches: Arc<M>,
        submissions: Arc<S>,
        config: MatchingConfig,
    ) -> Self {
        Self {
            profiles,
            matches,
            submissions,
            validator: PreferenceValidator::new(),
            config,
            reference_date: None,
        }
    }

    /// Pin the date used for age derivation instead of reading the local clock.
    pub fn with_reference_date(mut self, reference_date: NaiveDate) -> Self {
        self.reference_date = Some(reference_date);
        self
    }

    fn ranker(&self) -> Ranker {
        let today = self
            .reference_date
            .unwrap_or_else(|| Local::now().date_naive());
        Ranker::new(ScoringEngine::new(today))
    }

    /// Participant-facing discovery: best volunteers first, truncated to `limit`.
    pub fn find_matches(
        &self,
        participant_id: UserId,
        target_role: Option<TargetRole>,
        limit: Option<usize>,
    ) -> Result<Vec<RankedVolunteer>, MatchingServiceError> {
        let discovery = self.discover(participant_id, target_role)?;
        let limit = limit.unwrap_or(self.config.result_limit);

        let ranked = self.ranker().rank(
            &discovery.profile,
            discovery.target_role,
            &discovery.pool,
            &discovery.preferences,
            limit,
        );

        info!(
            participant = %participant_id,
            target_role = discovery.target_role.as_str(),
            pool = discovery.pool.len(),
            returned = ranked.len(),
            "ranked volunteer matches"
        );
        Ok(ranked)
    }

    /// Admin discovery: every eligible volunteer with full fields and active match counts.
    pub fn admin_matches(
        &self,
        participant_id: UserId,
        target_role: Option<TargetRole>,
    ) -> Result<Vec<AdminCandidateView>, MatchingServiceError> {
        let discovery = self.discover(participant_id, target_role)?;

        let filter = CandidateFilter::new(discovery.profile.case(), discovery.target_role);
        let mut active_counts = HashMap::new();
        for volunteer in filter.eligible_pool(&discovery.pool) {
            let count = self.matches.count_active_matches(volunteer.id())?;
            active_counts.insert(volunteer.id(), count);
        }

        let candidates = self.ranker().rank_admin(
            &discovery.profile,
            discovery.target_role,
            &discovery.pool,
            &discovery.preferences,
            &active_counts,
        );

        info!(
            participant = %participant_id,
            target_role = discovery.target_role.as_str(),
            candidates = candidates.len(),
            "built admin match view"
        );
        Ok(candidates)
    }

    /// Options the preference editor may offer. Never fails for a missing intake profile.
    pub fn preference_options(
        &self,
        participant_id: UserId,
        target_role: TargetRole,
    ) -> Result<PreferenceOptions, MatchingServiceError> {
        self.participant(participant_id)?;
        let profile = self.profiles.profile(participant_id)?;
        let catalog = self.profiles.catalog()?;

        Ok(build_options(
            profile.as_ref(),
            &catalog.qualities,
            target_role,
        ))
    }

    /// Validate a preference list and hand it to the pending-approval store.
    pub fn submit_preferences(
        &self,
        participant_id: UserId,
        target_role: TargetRole,
        items: &[RawPreference],
    ) -> Result<PendingSubmission, MatchingServiceError> {
        self.participant(participant_id)?;
        let validated = self.validator.validate(items)?;

        let stored = self.submissions.submit(PendingSubmission {
            owner_id: participant_id,
            target_role,
            items: validated.items,
            status: SubmissionStatus::PendingApproval,
        })?;

        info!(
            participant = %participant_id,
            target_role = target_role.as_str(),
            items = stored.items.len(),
            "preference submission awaiting approval"
        );
        Ok(stored)
    }

    fn participant(&self, participant_id: UserId) -> Result<UserAccount, MatchingServiceError> {
        let account = self
            .profiles
            .user(participant_id)?
            .ok_or(MatchingServiceError::ParticipantNotFound(participant_id))?;

        if account.role != UserRole::Participant {
            return Err(MatchingServiceError::NotAParticipant(participant_id));
        }
        Ok(account)
    }

    fn discover(
        &self,
        participant_id: UserId,
        requested_role: Option<TargetRole>,
    ) -> Result<Discovery, MatchingServiceError> {
        let account = self.participant(participant_id)?;
        let profile = self
            .profiles
            .profile(participant_id)?
            .ok_or(MatchingServiceError::MissingIntakeProfile(participant_id))?;

        let rows = self.profiles.preferences(participant_id)?;
        let target_role = select_target_role(&rows, requested_role, profile.case())
            .ok_or(MatchingServiceError::NoRankingPreferences(participant_id))?;
        let mut rows: Vec<PreferenceRow> = rows
            .into_iter()
            .filter(|row| row.target_role == target_role)
            .collect();
        if rows.is_empty() {
            return Err(MatchingServiceError::NoRankingPreferences(participant_id));
        }
        rows.sort_by_key(|row| row.rank);

        let catalog = self.profiles.catalog()?;
        let preferences: Vec<Preference> = rows
            .iter()
            .filter_map(|row| {
                let resolved = catalog.resolve(row);
                if resolved.is_none() {
                    warn!(
                        participant = %participant_id,
                        kind = row.kind.as_str(),
                        item_id = row.item_id,
                        "preference references a missing catalog item; skipping"
                    );
                }
                resolved
            })
            .collect();

        let pool = self
            .profiles
            .volunteer_pool(&PoolFilter::for_participant(&account))?;
        debug!(
            participant = %participant_id,
            pool = pool.len(),
            "loaded volunteer pool"
        );

        Ok(Discovery {
            profile,
            target_role,
            preferences,
            pool,
        })
    }
}

/// An explicit request wins; otherwise the group matching the participant's own
/// case, falling back to whichever group is stored.
fn select_target_role(
    rows: &[PreferenceRow],
    requested: Option<TargetRole>,
    case: Case,
) -> Option<TargetRole> {
    if requested.is_some() {
        return requested;
    }

    let preferred = if case.is_caregiver() {
        TargetRole::Caregiver
    } else {
        TargetRole::Patient
    };

    if rows.iter().any(|row| row.target_role == preferred) {
        Some(preferred)
    } else {
        rows.first().map(|row| row.target_role)
    }
}

/// Error raised by the matching service. Domain variants are checked before any scoring.
#[derive(Debug, thiserror::Error)]
pub enum MatchingServiceError {
    #[error("participant {0} not found")]
    ParticipantNotFound(UserId),
    #[error("user {0} is not a participant")]
    NotAParticipant(UserId),
    #[error("participant {0} has no intake profile")]
    MissingIntakeProfile(UserId),
    #[error("participant {0} has no ranking preferences")]
    NoRankingPreferences(UserId),
    #[error(transparent)]
    Validation(#[from] PreferenceValidationError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

impl MatchingServiceError {
    pub const fn code(&self) -> &'static str {
        match self {
            MatchingServiceError::ParticipantNotFound(_) => "participant_not_found",
            MatchingServiceError::NotAParticipant(_) => "not_a_participant",
            MatchingServiceError::MissingIntakeProfile(_) => "missing_intake_profile",
            MatchingServiceError::NoRankingPreferences(_) => "no_ranking_preferences",
            MatchingServiceError::Validation(_) => "invalid_preferences",
            MatchingServiceError::Repository(_) => "repository_error",
        }
    }
}
