use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::state::AppState;

/// GET /v1/health - liveness plus a store ping
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let version = state.settings.version.as_str();

    match state.store.health_check().await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "available",
                    "version": version,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => {
            tracing::error!("Health check failed: {}", e);
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({
                    "success": false,
                    "data": {
                        "status": "degraded",
                        "version": version,
                        "database": "unavailable"
                    }
                })),
            )
        }
    }
}
