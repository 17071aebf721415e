use crate::infra::AppState;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::{Extension, Json, Router};
use peer_match::matching::{
    matching_router, MatchStore, MatchingService, ProfileStore, SubmissionStore,
};
use serde_json::json;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Matching endpoints plus the operational probes served next to them.
pub(crate) fn with_matching_routes<P, M, S>(service: Arc<MatchingService<P, M, S>>) -> Router
where
    P: ProfileStore + 'static,
    M: MatchStore + 'static,
    S: SubmissionStore + 'static,
{
    matching_router(service)
        .route("/health", axum::routing::get(healthcheck))
        .route("/ready", axum::routing::get(readiness_endpoint))
        .route("/metrics", axum::routing::get(metrics_endpoint))
}

pub(crate) async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

pub(crate) async fn readiness_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    if state.readiness.load(Ordering::Relaxed) {
        (StatusCode::OK, Json(json!({ "status": "ready" })))
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({ "status": "initializing" })),
        )
    }
}

pub(crate) async fn metrics_endpoint(Extension(state): Extension<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
