//! Handler for the batch shortening endpoint.

use axum::{Json, extract::State};
use validator::Validate;

use crate::api::dto::shorten::{
    BatchSummary, ShortenBatchRequest, ShortenResponse, ShortenResultItem,
};
use crate::application::services::BatchReport;
use crate::domain::entities::ShortenRequest;
use crate::error::AppError;
use crate::state::AppState;

/// Creates shortened URLs for one to five long URLs.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// # Batch Processing
///
/// Items are processed in order and independently. A failed item never
/// aborts its siblings; it carries its own error instead.
///
/// # Request Body
///
/// ```json
/// {
///   "urls": [
///     { "url": "https://example.com", "validity": 60, "shortcode": "abcd" },
///     { "url": "https://example.org" }
///   ]
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "summary": { "total": 2, "successful": 1, "failed": 1 },
///   "message": "some items failed",
///   "items": [
///     {
///       "originalUrl": "https://example.com",
///       "shortcode": "abcd",
///       "shortUrl": "http://localhost:3000/abcd",
///       "createdAt": "2025-01-01T12:00:00Z",
///       "expiresAt": "2025-01-01T13:00:00Z"
///     },
///     {
///       "originalUrl": "https://example.org",
///       "error": { "code": "shortcode_taken", "message": "...", "details": {} }
///     }
///   ]
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the batch is empty or has more than five items.
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenBatchRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;

    let requests: Vec<ShortenRequest> = payload.urls.into_iter().map(Into::into).collect();
    let report = state.link_service.shorten_batch(&requests).await;

    Ok(Json(into_response(&state, report)))
}

fn into_response(state: &AppState, report: BatchReport) -> ShortenResponse {
    let summary = BatchSummary {
        total: report.total(),
        successful: report.successful(),
        failed: report.failed(),
    };
    let message = report.message();

    let items = report
        .items
        .into_iter()
        .map(|item| match item.outcome {
            Ok(record) => ShortenResultItem::Success {
                short_url: state.short_url(&record.shortcode),
                original_url: record.original_url,
                shortcode: record.shortcode,
                created_at: record.created_at,
                expires_at: record.expires_at,
            },
            Err(err) => ShortenResultItem::Error {
                original_url: item.original_url,
                error: err.to_error_info(),
            },
        })
        .collect();

    ShortenResponse {
        summary,
        message,
        items,
    }
}
