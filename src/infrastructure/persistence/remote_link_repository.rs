//! Remote HTTP backend implementation of the link repository.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use reqwest::header::ACCEPT;
use reqwest::{Client, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::entities::{ClickEvent, LinkRecord};
use crate::domain::repositories::{LinkRepository, sort_most_recent_first};
use crate::error::AppError;

/// Request body for `POST {base}/urls`.
#[derive(Debug, Serialize)]
struct CreateBody<'a> {
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    validity: Option<i64>,
    shortcode: &'a str,
}

/// Success body for `POST {base}/urls`.
#[derive(Debug, Deserialize)]
struct CreateReply {
    #[serde(rename = "shortUrl", alias = "shortenedUrl")]
    short_url: String,
}

/// Store backed by a remote shortening service.
///
/// The remote service owns uniqueness; a 409 reply means another writer
/// holds the code.
///
/// | Operation      | Request                                |
/// |----------------|----------------------------------------|
/// | `create`       | `POST {base}/urls`                     |
/// | `find`         | `GET {base}/urls/{shortcode}`          |
/// | `list_live`    | `GET {base}/urls`                      |
/// | `record_click` | `POST {base}/urls/{shortcode}/clicks`  |
pub struct RemoteLinkRepository {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl RemoteLinkRepository {
    /// Creates a client for `base_url` (e.g. `http://host:3000/api`).
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] if `base_url` is not an absolute
    /// http(s) URL or the HTTP client cannot be built.
    pub fn new(
        base_url: impl AsRef<str>,
        token: Option<String>,
        timeout: Duration,
    ) -> Result<Self, AppError> {
        let base_url = Url::parse(base_url.as_ref())
            .map_err(|e| AppError::internal(format!("invalid backend URL: {e}")))?;
        if base_url.cannot_be_a_base() {
            return Err(AppError::internal(format!(
                "backend URL cannot carry a path: {base_url}"
            )));
        }

        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url,
            token,
        })
    }

    /// `{base}/seg/seg..`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn get(&self, url: Url) -> Result<Response, AppError> {
        self.authorize(self.client.get(url))
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(describe_transport_error(&e)))
    }
}

fn describe_transport_error(err: &reqwest::Error) -> String {
    if err.is_timeout() {
        "backend request timed out".to_string()
    } else if err.is_connect() {
        format!("cannot reach backend: {err}")
    } else {
        format!("backend request failed: {err}")
    }
}

/// Pulls a human-readable message out of an error reply.
///
/// Understands `{"error": {"message": ..}}`, `{"message": ..}` and
/// `{"error": ".."}`; anything else is returned as raw text.
async fn error_message(response: Response) -> String {
    let status = response.status();
    let text = response.text().await.unwrap_or_default();

    let parsed = serde_json::from_str::<serde_json::Value>(&text)
        .ok()
        .and_then(|body| {
            body.pointer("/error/message")
                .or_else(|| body.get("message"))
                .or_else(|| body.get("error"))
                .and_then(|v| v.as_str())
                .map(str::to_string)
        });

    match parsed {
        Some(message) => message,
        None if text.trim().is_empty() => status
            .canonical_reason()
            .unwrap_or("backend error")
            .to_string(),
        None => text,
    }
}

#[async_trait]
impl LinkRepository for RemoteLinkRepository {
    async fn create(&self, record: LinkRecord) -> Result<(), AppError> {
        let validity = record
            .expires_at
            .map(|expires_at| (expires_at - record.created_at).num_minutes());
        let body = CreateBody {
            url: &record.original_url,
            validity,
            shortcode: &record.shortcode,
        };

        let response = self
            .authorize(self.client.post(self.endpoint(&["urls"])))
            .header(ACCEPT, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| AppError::BackendError {
                status: None,
                message: describe_transport_error(&e),
            })?;

        let status = response.status();
        if status == StatusCode::CONFLICT {
            return Err(AppError::DuplicateCode {
                code: record.shortcode,
            });
        }
        if !status.is_success() {
            return Err(AppError::BackendError {
                status: Some(status.as_u16()),
                message: error_message(response).await,
            });
        }

        let reply: CreateReply = response.json().await.map_err(|e| AppError::BackendError {
            status: Some(status.as_u16()),
            message: format!("invalid create reply: {e}"),
        })?;
        debug!(shortcode = %record.shortcode, short_url = %reply.short_url, "Backend accepted link");

        Ok(())
    }

    async fn find(&self, shortcode: &str) -> Result<Option<LinkRecord>, AppError> {
        let response = self.get(self.endpoint(&["urls", shortcode])).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AppError::StoreUnavailable(format!(
                "GET /urls/{shortcode} returned {status}"
            )));
        }

        response
            .json::<LinkRecord>()
            .await
            .map(Some)
            .map_err(|e| AppError::StoreUnavailable(format!("invalid record payload: {e}")))
    }

    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<LinkRecord>, AppError> {
        let response = self.get(self.endpoint(&["urls"])).await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::StoreUnavailable(format!(
                "GET /urls returned {status}"
            )));
        }

        let mut live: Vec<LinkRecord> = response
            .json::<Vec<LinkRecord>>()
            .await
            .map_err(|e| AppError::StoreUnavailable(format!("invalid /urls payload: {e}")))?
            .into_iter()
            .filter(|record| record.is_live_at(now))
            .collect();

        sort_most_recent_first(&mut live);
        Ok(live)
    }

    async fn record_click(&self, shortcode: &str, event: ClickEvent) -> Result<(), AppError> {
        let response = self
            .authorize(self.client.post(self.endpoint(&["urls", shortcode, "clicks"])))
            .json(&event)
            .send()
            .await
            .map_err(|e| AppError::StoreUnavailable(describe_transport_error(&e)))?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(AppError::NotFound {
                code: shortcode.to_string(),
            });
        }
        if !status.is_success() {
            return Err(AppError::StoreUnavailable(format!(
                "click append for {shortcode} failed with {status}: {}",
                error_message(response).await
            )));
        }

        debug!(shortcode, "Click forwarded to backend");
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "remote"
    }
}
