//! Preference-weighted matching of participants to support volunteers.
//!
//! Submission time runs the options catalog and the preference validator;
//! discovery time runs the candidate filter, the scoring engine, and the ranker
//! over stores supplied by the caller.

pub mod case;
pub mod catalog;
pub mod domain;
pub mod eligibility;
pub mod ranking;
pub mod repository;
pub mod router;
pub mod scoring;
pub mod service;
pub mod validation;

#[cfg(test)]
mod tests;

pub use case::Case;
pub use catalog::{build_options, DynamicOption, PreferenceOptions, QualityOption};
pub use domain::{
    Attributes, ExperienceRef, Preference, PreferenceItem, PreferenceKind, PreferenceRow, Profile,
    Quality, QualityRef, QualitySlug, ReferenceCatalog, Scope, TargetRole, TreatmentRef,
    UserAccount, UserId, UserRole, Volunteer,
};
pub use eligibility::{CandidateFilter, VolunteerClass};
pub use ranking::{
    AdminCandidateView, RankedVolunteer, Ranker, VolunteerSummary, DEFAULT_RESULT_LIMIT,
};
pub use repository::{
    MatchStore, PendingSubmission, PoolFilter, ProfileStore, RepositoryError, SubmissionStatus,
    SubmissionStore,
};
pub use router::matching_router;
pub use scoring::{CriterionScore, MatchEvaluation, ScoringEngine};
pub use service::{MatchingService, MatchingServiceError};
pub use validation::{
    PreferenceEntry, PreferenceValidationError, PreferenceValidator, RawPreference,
    ValidatedPreferences, MAX_PREFERENCES, MAX_RANK,
};
