//! Handlers for pending-form drafts.

use axum::{Json, extract::State};
use tracing::debug;
use validator::Validate;

use crate::api::dto::drafts::DraftsPayload;
use crate::error::AppError;
use crate::state::AppState;

/// `GET /api/drafts`
pub async fn get_drafts_handler(
    State(state): State<AppState>,
) -> Result<Json<DraftsPayload>, AppError> {
    let drafts = state.drafts.load_drafts().await?;
    Ok(Json(DraftsPayload { drafts }))
}

/// Replaces the stored drafts. Rows are kept as typed, without validation.
///
/// # Endpoint
///
/// `PUT /api/drafts`
///
/// # Errors
///
/// Returns 400 Bad Request for more than five drafts.
pub async fn put_drafts_handler(
    State(state): State<AppState>,
    Json(payload): Json<DraftsPayload>,
) -> Result<Json<DraftsPayload>, AppError> {
    payload.validate()?;

    debug!(count = payload.drafts.len(), "Saving drafts");
    state.drafts.save_drafts(payload.drafts.clone()).await?;

    Ok(Json(payload))
}
