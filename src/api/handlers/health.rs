//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse, TelemetryCheck};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /api/health`
///
/// # Response Codes
///
/// - **200 OK**: Record store reachable
/// - **503 Service Unavailable**: Record store cannot be read
///
/// Telemetry is reported but never degrades health.
///
/// # Response
///
/// ```json
/// {
///   "status": "healthy",
///   "version": "0.1.0",
///   "backend": "file",
///   "checks": {
///     "store": { "status": "ok", "message": "3 live links" },
///     "telemetry": { "status": "ok", "enabled": true, "queued": 0, "capacity": 1000, "dropped": 0 }
///   }
/// }
/// ```
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let store_check = check_store(&state).await;
    let healthy = store_check.status == "ok";

    let queue = state.telemetry.status();
    let telemetry_check = TelemetryCheck {
        status: if queue.enabled { "ok" } else { "disabled" }.to_string(),
        queue,
    };

    let response = HealthResponse {
        status: if healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: state.backend,
        checks: HealthChecks {
            store: store_check,
            telemetry: telemetry_check,
        },
    };

    if healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

/// Checks the record store by listing live links.
async fn check_store(state: &AppState) -> CheckStatus {
    match state.stats_service.summarize(Utc::now()).await {
        Ok(live) => CheckStatus {
            status: "ok".to_string(),
            message: Some(format!("{} live links", live.len())),
        },
        Err(e) => CheckStatus {
            status: "error".to_string(),
            message: Some(format!("Store error: {e}")),
        },
    }
}
