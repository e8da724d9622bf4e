//! DTOs for health check endpoint.

use serde::Serialize;

use crate::infrastructure::telemetry::TelemetryStatus;

/// Health check response with component status.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub backend: &'static str,
    pub checks: HealthChecks,
}

/// Health status for each system component.
#[derive(Debug, Serialize)]
pub struct HealthChecks {
    pub store: CheckStatus,
    pub telemetry: TelemetryCheck,
}

/// Individual component health status.
#[derive(Debug, Serialize)]
pub struct CheckStatus {
    pub status: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Telemetry queue state. Shipping problems never degrade health.
#[derive(Debug, Serialize)]
pub struct TelemetryCheck {
    pub status: String,
    #[serde(flatten)]
    pub queue: TelemetryStatus,
}
