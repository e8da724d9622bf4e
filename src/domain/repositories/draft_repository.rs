//! Repository trait for pending-form drafts.

use async_trait::async_trait;

use crate::domain::entities::ShortenRequest;
use crate::error::AppError;

/// Stores the rows of the shorten form before they are submitted.
///
/// Drafts are unvalidated [`ShortenRequest`]s; the whole collection is read
/// and replaced at once.
#[async_trait]
pub trait DraftRepository: Send + Sync {
    /// Loads all drafts. Missing or unreadable data yields an empty list.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] on storage failures.
    async fn load_drafts(&self) -> Result<Vec<ShortenRequest>, AppError>;

    /// Replaces the stored drafts.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the drafts cannot be written.
    async fn save_drafts(&self, drafts: Vec<ShortenRequest>) -> Result<(), AppError>;
}
