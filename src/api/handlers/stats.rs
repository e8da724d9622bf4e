//! Handler for single-link statistics.

use axum::{
    Json,
    extract::{Path, State},
};
use chrono::Utc;

use crate::domain::entities::LinkSummary;
use crate::error::AppError;
use crate::state::AppState;

/// Returns usage of one live link, including its click log.
///
/// # Endpoint
///
/// `GET /api/stats/{shortcode}`
///
/// # Errors
///
/// Returns 404 for unknown codes and 410 for expired links.
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
) -> Result<Json<LinkSummary>, AppError> {
    let summary = state
        .stats_service
        .link_summary(&shortcode, Utc::now())
        .await?;

    Ok(Json(summary))
}
