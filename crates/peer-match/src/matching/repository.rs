use serde::{Deserialize, Serialize};

use super::domain::{
    PreferenceRow, Profile, ReferenceCatalog, TargetRole, UserAccount, UserId, UserRole, Volunteer,
};
use super::validation::PreferenceEntry;

/// Criteria for the batch volunteer-pool query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolFilter {
    pub role: UserRole,
    pub active: bool,
    pub approved: bool,
    pub language: String,
}

impl PoolFilter {
    /// Active, approved volunteers who speak the participant's language.
    pub fn for_participant(participant: &UserAccount) -> Self {
        Self {
            role: UserRole::Volunteer,
            active: true,
            approved: true,
            language: participant.language.clone(),
        }
    }

    pub fn admits(&self, account: &UserAccount) -> bool {
        account.role == self.role
            && account.active == self.active
            && account.approved == self.approved
            && account.language.eq_ignore_ascii_case(&self.language)
    }
}

/// Read access to accounts, intake profiles, stored preferences, and reference data.
pub trait ProfileStore: Send + Sync {
    fn user(&self, id: UserId) -> Result<Option<UserAccount>, RepositoryError>;
    fn profile(&self, id: UserId) -> Result<Option<Profile>, RepositoryError>;
    /// Loads the pool with nested treatments and experiences in a single call.
    fn volunteer_pool(&self, filter: &PoolFilter) -> Result<Vec<Volunteer>, RepositoryError>;
    fn preferences(&self, owner: UserId) -> Result<Vec<PreferenceRow>, RepositoryError>;
    fn catalog(&self) -> Result<ReferenceCatalog, RepositoryError>;
}

/// Read access to existing participant/volunteer matches.
pub trait MatchStore: Send + Sync {
    /// Matches referencing the volunteer that are not in a terminal status.
    fn count_active_matches(&self, volunteer: UserId) -> Result<u32, RepositoryError>;
}

/// Destination for validated preference lists awaiting admin approval.
pub trait SubmissionStore: Send + Sync {
    fn submit(&self, submission: PendingSubmission) -> Result<PendingSubmission, RepositoryError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubmissionStatus {
    PendingApproval,
}

impl SubmissionStatus {
    pub const fn label(self) -> &'static str {
        match self {
            SubmissionStatus::PendingApproval => "pending_approval",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingSubmission {
    pub owner_id: UserId,
    pub target_role: TargetRole,
    pub items: Vec<PreferenceEntry>,
    pub status: SubmissionStatus,
}

/// Error enumeration for store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
