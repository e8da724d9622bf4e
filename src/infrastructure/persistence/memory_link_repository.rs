//! In-memory implementation of the link and draft repositories.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use super::link_table::LinkTable;
use crate::domain::entities::{ClickEvent, LinkRecord, ShortenRequest};
use crate::domain::repositories::{DraftRepository, LinkRepository};
use crate::error::AppError;

/// Process-local store. Contents are lost on restart.
///
/// Used for tests, development, and as the draft store when records live on
/// a remote backend.
#[derive(Debug, Default)]
pub struct MemoryLinkRepository {
    links: RwLock<LinkTable>,
    drafts: RwLock<Vec<ShortenRequest>>,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        debug!("Using in-memory link store");
        Self::default()
    }

    /// Creates a store pre-populated with records, e.g. for fixtures.
    pub fn with_records(records: Vec<LinkRecord>) -> Self {
        Self {
            links: RwLock::new(LinkTable::from_records(records)),
            drafts: RwLock::default(),
        }
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn create(&self, record: LinkRecord) -> Result<(), AppError> {
        self.links.write().await.insert(record)
    }

    async fn find(&self, shortcode: &str) -> Result<Option<LinkRecord>, AppError> {
        Ok(self.links.read().await.find(shortcode).cloned())
    }

    async fn list_live(&self, now: DateTime<Utc>) -> Result<Vec<LinkRecord>, AppError> {
        Ok(self.links.read().await.list_live(now))
    }

    async fn record_click(&self, shortcode: &str, event: ClickEvent) -> Result<(), AppError> {
        self.links.write().await.record_click(shortcode, event)
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}

#[async_trait]
impl DraftRepository for MemoryLinkRepository {
    async fn load_drafts(&self) -> Result<Vec<ShortenRequest>, AppError> {
        Ok(self.drafts.read().await.clone())
    }

    async fn save_drafts(&self, drafts: Vec<ShortenRequest>) -> Result<(), AppError> {
        *self.drafts.write().await = drafts;
        Ok(())
    }
}
