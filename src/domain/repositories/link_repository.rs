//! Repository trait for the shortlink record store.

use std::collections::HashSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entities::{ClickEvent, LinkRecord};
use crate::error::AppError;

/// The authoritative shortcode → [`LinkRecord`] mapping.
///
/// The store is the single owner of records: services propose values, the
/// store commits them. All mutations go through one serialization point, so
/// concurrent `create` calls for the same code cannot both succeed and
/// `click_count` always equals the click log length.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process map
/// - [`crate::infrastructure::persistence::FileLinkRepository`] - JSON files on disk
/// - [`crate::infrastructure::persistence::RemoteLinkRepository`] - Remote HTTP backend
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Commits a new record.
    ///
    /// Liveness of an existing record with the same shortcode is judged at
    /// `record.created_at`; a dead record may be superseded.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateCode`] if a live record already owns the code.
    /// Returns [`AppError::BackendError`] / [`AppError::StoreUnavailable`] on
    /// storage failures.
    async fn create(&self, record: LinkRecord) -> Result<(), AppError>;

    /// Finds the newest record for a shortcode, live or not.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn find(&self, shortcode: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Lists records that are live at `now`.
    ///
    /// Ordered by `created_at` descending, ties broken by shortcode ascending.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<LinkRecord>, AppError>;

    /// Returns the shortcodes bound to live records at `now`.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn live_codes(&self, now: DateTime<Utc>) -> Result<HashSet<String>, AppError> {
        Ok(self
            .list_live(now)
            .await?
            .into_iter()
            .map(|record| record.shortcode)
            .collect())
    }

    /// Appends a click to a record and bumps its counter.
    ///
    /// Expiry is not checked here; the resolver only calls this for live records.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no record exists for the shortcode.
    async fn record_click(&self, shortcode: &str, event: ClickEvent) -> Result<(), AppError>;

    /// Short name of the backend, reported by the health endpoint.
    fn backend_name(&self) -> &'static str;
}

/// Sorts records most-recent-first with a stable shortcode tie-break.
pub fn sort_most_recent_first(records: &mut [LinkRecord]) {
    records.sort_by(|a, b| {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| a.shortcode.cmp(&b.shortcode))
    });
}
