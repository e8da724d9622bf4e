//! Handler for short URL redirect.

use axum::{
    extract::{ConnectInfo, Path, State},
    http::{HeaderMap, header},
    response::{IntoResponse, Redirect},
};
use chrono::Utc;
use std::net::SocketAddr;

use crate::domain::entities::ClickMetadata;
use crate::error::AppError;
use crate::state::AppState;

/// Redirects a shortcode to its original URL.
///
/// # Endpoint
///
/// `GET /{shortcode}`
///
/// # Click Tracking
///
/// A click is recorded only when the link is live:
/// - `source` is the `Referer` header, or `direct` without one
/// - `location` is the first `X-Forwarded-For` hop, or the peer address
///
/// # Errors
///
/// Returns 404 Not Found if the shortcode was never issued.
/// Returns 410 Gone if the link has expired.
pub async fn redirect_handler(
    Path(shortcode): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Result<impl IntoResponse, AppError> {
    let source = headers
        .get(header::REFERER)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .unwrap_or("direct");

    let location = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| addr.ip().to_string());

    let target = state
        .redirect_service
        .resolve(&shortcode, Utc::now(), ClickMetadata::new(Some(source), Some(location)))
        .await?;

    Ok(Redirect::temporary(&target))
}
