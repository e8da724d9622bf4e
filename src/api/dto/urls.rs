//! DTOs for the single-link endpoint, in the remote backend's wire format.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::entities::ShortenRequest;

/// `POST /api/urls` body: `{ url, validity?, shortcode? }`.
#[derive(Debug, Deserialize)]
pub struct CreateUrlRequest {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub validity: Option<i64>,
    #[serde(default)]
    pub shortcode: Option<String>,
}

impl From<CreateUrlRequest> for ShortenRequest {
    fn from(body: CreateUrlRequest) -> Self {
        Self {
            original_url: body.url,
            requested_validity_minutes: body.validity,
            preferred_shortcode: body.shortcode,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUrlResponse {
    pub short_url: String,
    pub shortcode: String,
    pub expiry: Option<DateTime<Utc>>,
}
