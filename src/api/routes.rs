//! API route configuration.

use crate::api::handlers::{
    create_url_handler, get_drafts_handler, get_url_handler, health_handler, list_urls_handler,
    put_drafts_handler, record_click_handler, shorten_handler, stats_handler,
    stats_list_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten`           - Shorten up to five URLs in one batch
/// - `POST /urls`              - Shorten one URL (remote backend wire format)
/// - `GET  /urls`              - Live links as a bare array
/// - `GET  /urls/{shortcode}`  - Newest record for a code, expired or not
/// - `POST /urls/{shortcode}/clicks` - Append a click resolved elsewhere
/// - `GET  /stats`             - Live links with usage, most recent first
/// - `GET  /stats/{shortcode}` - Usage of a single link
/// - `GET  /drafts`            - Read pending form drafts
/// - `PUT  /drafts`            - Replace pending form drafts
/// - `GET  /health`            - Store and telemetry status
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls", get(list_urls_handler).post(create_url_handler))
        .route("/urls/{shortcode}", get(get_url_handler))
        .route("/urls/{shortcode}/clicks", post(record_click_handler))
        .route("/stats", get(stats_list_handler))
        .route("/stats/{shortcode}", get(stats_handler))
        .route("/drafts", get(get_drafts_handler).put(put_drafts_handler))
        .route("/health", get(health_handler))
}
