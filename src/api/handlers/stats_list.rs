//! Handler for aggregated link statistics.

use axum::{Json, extract::State};
use chrono::Utc;

use crate::api::dto::stats::StatsResponse;
use crate::error::AppError;
use crate::state::AppState;

/// Lists every live link with its usage, most recent first.
///
/// # Endpoint
///
/// `GET /api/stats`
///
/// # Response
///
/// ```json
/// {
///   "total": 1,
///   "items": [
///     {
///       "shortcode": "abcd",
///       "originalUrl": "https://example.com",
///       "createdAt": "2025-01-01T12:00:00Z",
///       "expiresAt": "2025-01-01T12:30:00Z",
///       "clickCount": 1,
///       "clickLog": [
///         { "timestamp": "2025-01-01T12:05:00Z", "source": "direct", "location": "10.0.0.1" }
///       ]
///     }
///   ]
/// }
/// ```
pub async fn stats_list_handler(
    State(state): State<AppState>,
) -> Result<Json<StatsResponse>, AppError> {
    let items = state.stats_service.summarize(Utc::now()).await?;

    Ok(Json(StatsResponse {
        total: items.len(),
        items,
    }))
}
