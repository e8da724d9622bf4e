//! DTOs for the batch shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortenRequest;
use crate::error::ErrorInfo;

/// Request to shorten one or more URLs.
///
/// At most five URLs per batch, matching the rows of the shorten form.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenBatchRequest {
    #[validate(length(min = 1, max = 5, message = "Submit between 1 and 5 URLs"))]
    pub urls: Vec<UrlItem>,
}

/// One form row. Every field may be missing; the service reports per-item errors.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UrlItem {
    #[serde(default, alias = "originalUrl")]
    pub url: Option<String>,

    /// Validity in minutes (defaults to the configured value).
    #[serde(default)]
    pub validity: Option<i64>,

    #[serde(default, alias = "preferredShortcode")]
    pub shortcode: Option<String>,
}

impl From<UrlItem> for ShortenRequest {
    fn from(item: UrlItem) -> Self {
        Self {
            original_url: item.url,
            requested_validity_minutes: item.validity,
            preferred_shortcode: item.shortcode,
        }
    }
}

/// Response containing batch processing results.
#[derive(Debug, Serialize)]
pub struct ShortenResponse {
    pub summary: BatchSummary,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<&'static str>,
    pub items: Vec<ShortenResultItem>,
}

/// Individual result for a URL in the batch.
///
/// Untagged: success items carry a `shortUrl`, failed ones an `error`.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ShortenResultItem {
    #[serde(rename_all = "camelCase")]
    Success {
        original_url: String,
        shortcode: String,
        short_url: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    },
    #[serde(rename_all = "camelCase")]
    Error {
        original_url: Option<String>,
        error: ErrorInfo,
    },
}

/// Summary statistics for batch processing.
#[derive(Debug, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}
