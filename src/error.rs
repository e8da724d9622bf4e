//! Application error taxonomy and HTTP error rendering.
//!
//! Every failure a shorten, resolve or statistics operation can produce is a
//! variant of [`AppError`]. Per-request failures are attached to that item's
//! result in a batch; only [`AppError::AllocatorExhausted`] and store failures
//! are fatal to the current operation.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Value, json};

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorInfo,
}

/// Machine-readable error payload embedded in responses and batch items.
#[derive(Debug, Clone, Serialize)]
pub struct ErrorInfo {
    pub code: &'static str,
    pub message: String,
    pub details: Value,
}

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("Original URL is required")]
    MissingUrl,

    #[error("Invalid URL: {reason}")]
    InvalidUrl { reason: String },

    #[error("Invalid shortcode: {reason}")]
    InvalidShortcode { reason: String },

    #[error("Validity must be a positive number of minutes, got {minutes}")]
    InvalidValidity { minutes: i64 },

    #[error("Shortcode '{code}' is already taken")]
    ShortcodeTaken { code: String },

    #[error("Shortcode '{code}' is already bound to a live record")]
    DuplicateCode { code: String },

    #[error("Shortcode '{code}' was claimed by a concurrent request")]
    RaceLost { code: String },

    #[error("No free shortcode found after {attempts} attempts")]
    AllocatorExhausted { attempts: usize },

    #[error("Short link '{code}' not found")]
    NotFound { code: String },

    #[error("Short link '{code}' has expired")]
    Expired {
        code: String,
        expired_at: Option<DateTime<Utc>>,
    },

    #[error("Record store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Backend error: {message}")]
    BackendError {
        status: Option<u16>,
        message: String,
    },

    #[error("{message}")]
    Validation { message: String, details: Value },

    #[error("{0}")]
    Internal(String),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>, details: Value) -> Self {
        Self::Validation {
            message: message.into(),
            details,
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    /// Stable machine code used in JSON error bodies and telemetry.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingUrl => "missing_url",
            Self::InvalidUrl { .. } => "invalid_url",
            Self::InvalidShortcode { .. } => "invalid_shortcode",
            Self::InvalidValidity { .. } => "invalid_validity",
            Self::ShortcodeTaken { .. } => "shortcode_taken",
            Self::DuplicateCode { .. } => "duplicate_code",
            Self::RaceLost { .. } => "race_lost",
            Self::AllocatorExhausted { .. } => "allocator_exhausted",
            Self::NotFound { .. } => "not_found",
            Self::Expired { .. } => "expired",
            Self::StoreUnavailable(_) => "store_unavailable",
            Self::BackendError { .. } => "backend_error",
            Self::Validation { .. } => "validation_error",
            Self::Internal(_) => "internal_error",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::MissingUrl
            | Self::InvalidUrl { .. }
            | Self::InvalidShortcode { .. }
            | Self::InvalidValidity { .. }
            | Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::ShortcodeTaken { .. } | Self::DuplicateCode { .. } | Self::RaceLost { .. } => {
                StatusCode::CONFLICT
            }
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Expired { .. } => StatusCode::GONE,
            Self::StoreUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::BackendError { .. } => StatusCode::BAD_GATEWAY,
            Self::AllocatorExhausted { .. } | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// True for failures caused by the submitted input rather than the system.
    pub fn is_client_error(&self) -> bool {
        self.status().is_client_error()
    }

    fn details(&self) -> Value {
        match self {
            Self::InvalidShortcode { .. } | Self::InvalidUrl { .. } | Self::MissingUrl => json!({}),
            Self::InvalidValidity { minutes } => json!({ "minutes": minutes }),
            Self::ShortcodeTaken { code }
            | Self::DuplicateCode { code }
            | Self::RaceLost { code }
            | Self::NotFound { code } => json!({ "shortcode": code }),
            Self::Expired { code, expired_at } => {
                json!({ "shortcode": code, "expiredAt": expired_at })
            }
            Self::AllocatorExhausted { attempts } => json!({ "attempts": attempts }),
            Self::BackendError { status, .. } => json!({ "status": status }),
            Self::Validation { details, .. } => details.clone(),
            Self::StoreUnavailable(_) | Self::Internal(_) => json!({}),
        }
    }

    pub fn to_error_info(&self) -> ErrorInfo {
        ErrorInfo {
            code: self.code(),
            message: self.to_string(),
            details: self.details(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "{}", self);
        }

        let body = ErrorBody {
            error: self.to_error_info(),
        };

        (status, Json(body)).into_response()
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(errors: validator::ValidationErrors) -> Self {
        AppError::bad_request(
            "Request validation failed",
            serde_json::to_value(&errors).unwrap_or_default(),
        )
    }
}
