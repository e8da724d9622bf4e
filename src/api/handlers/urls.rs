//! Handlers for the single-link API used by remote clients.
//!
//! These endpoints speak the same wire format the remote store client
//! expects, so one instance can serve as another's backend.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use chrono::Utc;

use crate::api::dto::urls::{CreateUrlRequest, CreateUrlResponse};
use crate::domain::entities::{ClickEvent, LinkRecord, LinkSummary, ShortenRequest};
use crate::error::AppError;
use crate::state::AppState;

/// Shortens a single URL.
///
/// # Endpoint
///
/// `POST /api/urls`
///
/// # Response
///
/// `201 Created` with `{ "shortUrl", "shortcode", "expiry" }`.
///
/// # Errors
///
/// Uses the standard error body; a taken shortcode is `409 Conflict`.
pub async fn create_url_handler(
    State(state): State<AppState>,
    Json(body): Json<CreateUrlRequest>,
) -> Result<(StatusCode, Json<CreateUrlResponse>), AppError> {
    let request: ShortenRequest = body.into();
    let record = state.link_service.shorten(&request).await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateUrlResponse {
            short_url: state.short_url(&record.shortcode),
            shortcode: record.shortcode,
            expiry: record.expires_at,
        }),
    ))
}

/// Lists live links as a bare array.
///
/// # Endpoint
///
/// `GET /api/urls`
pub async fn list_urls_handler(
    State(state): State<AppState>,
) -> Result<Json<Vec<LinkSummary>>, AppError> {
    let summaries = state.stats_service.summarize(Utc::now()).await?;
    Ok(Json(summaries))
}

/// Returns the newest record for a shortcode, expired ones included.
///
/// # Endpoint
///
/// `GET /api/urls/{shortcode}`
///
/// # Errors
///
/// Returns 404 Not Found if the shortcode was never issued.
pub async fn get_url_handler(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
) -> Result<Json<LinkRecord>, AppError> {
    let record = state
        .stats_service
        .lookup(&shortcode)
        .await?
        .ok_or(AppError::NotFound { code: shortcode })?;

    Ok(Json(record))
}

/// Appends a click recorded by another instance's redirect.
///
/// # Endpoint
///
/// `POST /api/urls/{shortcode}/clicks` with a click event body:
///
/// ```json
/// { "timestamp": "2025-01-01T12:05:00Z", "source": "direct", "location": "10.0.0.1" }
/// ```
///
/// # Errors
///
/// Returns 404 Not Found if the shortcode was never issued.
pub async fn record_click_handler(
    State(state): State<AppState>,
    Path(shortcode): Path<String>,
    Json(event): Json<ClickEvent>,
) -> Result<StatusCode, AppError> {
    state.redirect_service.append_click(&shortcode, event).await?;
    Ok(StatusCode::NO_CONTENT)
}
