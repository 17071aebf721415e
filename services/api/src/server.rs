use crate::cli::ServeArgs;
use crate::infra::{matching_service, AppState};
use crate::routes::with_matching_routes;
use axum::Extension;
use axum_prometheus::PrometheusMetricLayer;
use peer_match::config::AppConfig;
use peer_match::error::AppError;
use peer_match::telemetry;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

pub(crate) async fn run(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let app_state = AppState {
        readiness: readiness_flag.clone(),
        metrics: Arc::new(prometheus_handle),
    };

    let (service, _submissions) = matching_service(config.matching, None);
    let app = with_matching_routes(service)
        .layer(Extension(app_state))
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(
        ?config.environment,
        %addr,
        result_limit = config.matching.result_limit,
        "peer matching service ready"
    );

    axum::serve(listener, app).await?;
    Ok(())
}
