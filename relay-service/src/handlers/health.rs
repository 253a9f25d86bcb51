use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::startup::AppState;

/// Body of `GET /`.
pub const LIVENESS_MESSAGE: &str = "Master Server is Live and Running!";

/// Plain-text liveness probe on the root path.
pub async fn liveness() -> &'static str {
    LIVENESS_MESSAGE
}

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "service": "relay-service",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Readiness check: the generative provider must be configured.
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    match state.provider.health_check().await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "Provider not ready");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
