//! Health check handlers

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
}

#[derive(Serialize)]
pub struct ReadyResponse {
    pub status: String,
    pub checks: HealthChecks,
}

#[derive(Serialize)]
pub struct HealthChecks {
    pub engine: CheckResult,
}

#[derive(Serialize)]
pub struct CheckResult {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_size: Option<usize>,
}

/// Liveness probe - always returns healthy if server is running
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}

/// Readiness probe - ready once the recommendation engine is built
pub async fn ready(State(state): State<AppState>) -> (StatusCode, Json<ReadyResponse>) {
    let (status, engine) = match state.engine.get() {
        Some(engine) => (
            StatusCode::OK,
            CheckResult {
                status: "up".to_string(),
                catalog_size: Some(engine.catalog().len()),
            },
        ),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            CheckResult {
                status: "initializing".to_string(),
                catalog_size: None,
            },
        ),
    };

    let body = ReadyResponse {
        status: if status == StatusCode::OK { "ready" } else { "not_ready" }.to_string(),
        checks: HealthChecks { engine },
    };

    (status, Json(body))
}
