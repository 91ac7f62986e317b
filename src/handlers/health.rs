use axum::{extract::State, http::StatusCode, Json};

use crate::handlers::AppState;
use crate::services::ServiceHealthStatus;

/// Liveness plus store reachability. 503 when the store is down.
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<ServiceHealthStatus>) {
    let status = state.services.health_check().await;
    let code = if status.is_healthy() { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };
    (code, Json(status))
}
