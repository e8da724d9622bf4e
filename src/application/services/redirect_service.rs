//! Shortcode resolution for redirects.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use metrics::counter;
use tracing::debug;

use crate::domain::entities::{ClickEvent, ClickMetadata};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::telemetry::{LogLevel, TelemetrySink};

const COMPONENT: &str = "resolver";

/// Maps a shortcode to its target URL and records the visit.
///
/// The resolver only appends clicks. It never creates, deletes or
/// reassigns records, and it records a click only for a live link.
pub struct RedirectService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    telemetry: Arc<dyn TelemetrySink>,
}

impl<R: LinkRepository + ?Sized> RedirectService<R> {
    pub fn new(repository: Arc<R>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            repository,
            telemetry,
        }
    }

    /// Resolves `shortcode` as of `now`, returning the original URL.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if no record was ever created for the code
    /// - [`AppError::Expired`] if `now` is at or past the record's expiry
    /// - Store errors if the lookup or the click append fails
    pub async fn resolve(
        &self,
        shortcode: &str,
        now: DateTime<Utc>,
        click: ClickMetadata,
    ) -> Result<String, AppError> {
        let Some(record) = self.repository.find(shortcode).await? else {
            self.telemetry.log(
                LogLevel::Error,
                COMPONENT,
                format!("Shortcode not found: {shortcode}"),
            );
            return Err(AppError::NotFound {
                code: shortcode.to_string(),
            });
        };

        if record.is_expired_at(now) {
            self.telemetry.log(
                LogLevel::Warn,
                COMPONENT,
                format!("Shortcode expired: {shortcode}"),
            );
            return Err(AppError::Expired {
                code: record.shortcode,
                expired_at: record.expires_at,
            });
        }

        self.repository
            .record_click(shortcode, click.into_event(now))
            .await?;
        counter!("shortlink_redirects_total").increment(1);
        debug!(shortcode, target = %record.original_url, "Resolved");

        Ok(record.original_url)
    }

    /// Appends a click resolved elsewhere, e.g. by an instance using this
    /// one as its remote store.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code was never created, or store
    /// errors if the append fails.
    pub async fn append_click(&self, shortcode: &str, event: ClickEvent) -> Result<(), AppError> {
        self.repository.record_click(shortcode, event).await?;
        counter!("shortlink_redirects_total").increment(1);
        debug!(shortcode, "Forwarded click recorded");
        Ok(())
    }
}
