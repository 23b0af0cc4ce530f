use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use secnews_digest::DigestPipeline;
use serde::Serialize;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::middleware::{request_id, require_bearer_auth, AuthState, RequestId};

/// Acknowledgement body for `/test-run`, sent whatever the run outcome.
pub const TEST_RUN_ACK: &str = "Test run executed!";

#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<DigestPipeline>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

impl ResponseMeta {
    fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
}

fn trigger_router(auth: AuthState) -> Router<AppState> {
    Router::new()
        .route("/test-run", get(test_run).post(test_run))
        .route_layer(axum::middleware::from_fn_with_state(auth, require_bearer_auth))
}

pub fn build_app(state: AppState, auth: AuthState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(trigger_router(auth))
        .fallback(fallback)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

async fn health(Extension(req_id): Extension<RequestId>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(ApiResponse {
            data: HealthData { status: "ok" },
            meta: ResponseMeta::new(req_id.0),
        }),
    )
}

/// Runs one digest to completion before acknowledging.
async fn test_run(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> &'static str {
    tracing::info!(request_id = %req_id.0, "manual digest run triggered");
    let outcome = state.pipeline.run().await;
    tracing::info!(request_id = %req_id.0, outcome = %outcome, "manual digest run finished");
    TEST_RUN_ACK
}

async fn fallback() -> &'static str {
    "OK"
}
