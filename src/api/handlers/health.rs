//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "checks": {
///     "store": { "status": "ok", "message": "postgres reachable" },
///     "abuse_guard": { "status": "ok", "message": "redis reachable" }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store = if state.store.health_check().await {
        CheckStatus::ok(format!("{} reachable", state.store_backend))
    } else {
        CheckStatus::error(format!("{} unreachable", state.store_backend))
    };

    let backend = state.abuse_guard.backend();
    let abuse_guard = if state.abuse_guard.health_check().await {
        CheckStatus::ok(format!("{} reachable", backend))
    } else {
        CheckStatus::error(format!("{} unreachable", backend))
    };

    let all_healthy = store.is_ok() && abuse_guard.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks { store, abuse_guard },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}
