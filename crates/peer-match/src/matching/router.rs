use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::domain::{TargetRole, UserId};
use super::repository::{MatchStore, ProfileStore, SubmissionStore};
use super::service::{MatchingService, MatchingServiceError};
use super::validation::RawPreference;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MatchQuery {
    #[serde(default)]
    pub target_role: Option<TargetRole>,
    #[serde(default)]
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct OptionsQuery {
    pub target_role: TargetRole,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreferenceSubmissionRequest {
    pub target_role: TargetRole,
    pub items: Vec<RawPreference>,
}

/// Router builder exposing discovery, option, and submission endpoints.
pub fn matching_router<P, M, S>(service: Arc<MatchingService<P, M, S>>) -> Router
where
    P: ProfileStore + 'static,
    M: MatchStore + 'static,
    S: SubmissionStore + 'static,
{
    Router::new()
        .route(
            "/api/v1/participants/:participant_id/matches",
            get(matches_handler::<P, M, S>),
        )
        .route(
            "/api/v1/admin/participants/:participant_id/matches",
            get(admin_matches_handler::<P, M, S>),
        )
        .route(
            "/api/v1/participants/:participant_id/preference-options",
            get(options_handler::<P, M, S>),
        )
        .route(
            "/api/v1/participants/:participant_id/preferences",
            post(submit_handler::<P, M, S>),
        )
        .with_state(service)
}

pub(crate) async fn matches_handler<P, M, S>(
    State(service): State<Arc<MatchingService<P, M, S>>>,
    Path(participant_id): Path<i64>,
    Query(query): Query<MatchQuery>,
) -> Response
where
    P: ProfileStore + 'static,
    M: MatchStore + 'static,
    S: SubmissionStore + 'static,
{
    match service.find_matches(UserId(participant_id), query.target_role, query.limit) {
        Ok(ranked) => (StatusCode::OK, axum::Json(ranked)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn admin_matches_handler<P, M, S>(
    State(service): State<Arc<MatchingService<P, M, S>>>,
    Path(participant_id): Path<i64>,
    Query(query): Query<MatchQuery>,
) -> Response
where
    P: ProfileStore + 'static,
    M: MatchStore + 'static,
    S: SubmissionStore + 'static,
{
    match service.admin_matches(UserId(participant_id), query.target_role) {
        Ok(candidates) => (StatusCode::OK, axum::Json(candidates)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn options_handler<P, M, S>(
    State(service): State<Arc<MatchingService<P, M, S>>>,
    Path(participant_id): Path<i64>,
    Query(query): Query<OptionsQuery>,
) -> Response
where
    P: ProfileStore + 'static,
    M: MatchStore + 'static,
    S: SubmissionStore + 'static,
{
    match service.preference_options(UserId(participant_id), query.target_role) {
        Ok(options) => (StatusCode::OK, axum::Json(options)).into_response(),
        Err(error) => error_response(error),
    }
}

pub(crate) async fn submit_handler<P, M, S>(
    State(service): State<Arc<MatchingService<P, M, S>>>,
    Path(participant_id): Path<i64>,
    axum::Json(request): axum::Json<PreferenceSubmissionRequest>,
) -> Response
where
    P: ProfileStore + 'static,
    M: MatchStore + 'static,
    S: SubmissionStore + 'static,
{
    match service.submit_preferences(UserId(participant_id), request.target_role, &request.items)
    {
        Ok(submission) => (StatusCode::ACCEPTED, axum::Json(submission)).into_response(),
        Err(error) => error_response(error),
    }
}

fn error_response(error: MatchingServiceError) -> Response {
    let status = match &error {
        MatchingServiceError::ParticipantNotFound(_) => StatusCode::NOT_FOUND,
        MatchingServiceError::NotAParticipant(_)
        | MatchingServiceError::MissingIntakeProfile(_)
        | MatchingServiceError::NoRankingPreferences(_) => StatusCode::BAD_REQUEST,
        MatchingServiceError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        MatchingServiceError::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    let payload = json!({
        "error": error.to_string(),
        "code": error.code(),
    });
    (status, axum::Json(payload)).into_response()
}
