pub mod monitoring;
pub mod tasks;
pub mod users;

use axum::{
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;
use utoipa::OpenApi;

use common::types::HEALTH_UP;

use crate::observability;
use crate::openapi::ApiDoc;
use crate::state::AppState;

#[utoipa::path(
    get, path = "/health", tag = "health",
    responses((status = 200, description = "Literal UP", body = String))
)]
pub async fn health() -> &'static str {
    HEALTH_UP
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

/// Build the full application router.
pub fn build_router(state: AppState, cors: CorsLayer) -> Router {
    let public = Router::new()
        .route("/health", get(health))
        .route("/metrics", get(observability::metrics_handler))
        .route("/api-docs/openapi.json", get(openapi_json));

    let tasks = Router::new()
        .route("/api/tasks", get(tasks::list).post(tasks::create))
        .route("/api/tasks/:id", get(tasks::get).put(tasks::update).delete(tasks::delete));

    let users = Router::new()
        .route("/api/users", get(users::list).post(users::create))
        .route("/api/users/:id", get(users::get).put(users::update).delete(users::delete));

    let monitoring = Router::new()
        .route("/api/ai/detect-anomaly", post(monitoring::detect_anomaly))
        .route("/api/ai/assess-build-risk", post(monitoring::assess_build_risk))
        .route("/api/monitoring/metrics", post(monitoring::submit_metric))
        .route("/api/monitoring/incidents", get(monitoring::incidents));

    public
        .merge(tasks)
        .merge(users)
        .merge(monitoring)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO).include_headers(false))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO).include_headers(false))
                // 5xx and friends
                .on_failure(DefaultOnFailure::new().level(Level::ERROR)),
        )
}

