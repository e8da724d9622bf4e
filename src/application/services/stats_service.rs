//! Per-link usage statistics.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::domain::entities::{LinkRecord, LinkSummary};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Read-only projection of the record store into [`LinkSummary`] rows.
pub struct StatsService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
}

impl<R: LinkRepository + ?Sized> StatsService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Summaries of every link live at `now`, most recent first.
    ///
    /// The store already returns live records in that order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be read.
    pub async fn summarize(&self, now: DateTime<Utc>) -> Result<Vec<LinkSummary>, AppError> {
        self.repository.list_live(now).await
    }

    /// The newest record for `shortcode`, live or expired.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::StoreUnavailable`] if the store cannot be read.
    pub async fn lookup(&self, shortcode: &str) -> Result<Option<LinkRecord>, AppError> {
        self.repository.find(shortcode).await
    }

    /// Summary of one live link, click log in occurrence order.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] for unknown codes and [`AppError::Expired`]
    /// once the link's validity has passed.
    pub async fn link_summary(
        &self,
        shortcode: &str,
        now: DateTime<Utc>,
    ) -> Result<LinkSummary, AppError> {
        let record = self
            .repository
            .find(shortcode)
            .await?
            .ok_or_else(|| AppError::NotFound {
                code: shortcode.to_string(),
            })?;

        if record.is_expired_at(now) {
            return Err(AppError::Expired {
                code: record.shortcode,
                expired_at: record.expires_at,
            });
        }

        Ok(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ClickEvent;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::persistence::MemoryLinkRepository;
    use chrono::Duration;

    fn record(code: &str, created_at: DateTime<Utc>) -> LinkRecord {
        LinkRecord::new(
            code.to_string(),
            format!("https://example.com/{code}"),
            created_at,
            Some(created_at + Duration::minutes(30)),
        )
    }

    #[tokio::test]
    async fn test_summarize_most_recent_first() {
        let t1 = Utc::now();
        let t2 = t1 + Duration::minutes(1);
        let t3 = t1 + Duration::minutes(2);
        let repo = Arc::new(MemoryLinkRepository::with_records(vec![
            record("first", t1),
            record("third", t3),
            record("second", t2),
        ]));

        let summaries = StatsService::new(repo).summarize(t3).await.unwrap();

        let codes: Vec<_> = summaries.iter().map(|s| s.shortcode.as_str()).collect();
        assert_eq!(codes, ["third", "second", "first"]);
    }

    #[tokio::test]
    async fn test_summarize_hides_expired_links() {
        let now = Utc::now();
        let repo = Arc::new(MemoryLinkRepository::with_records(vec![
            record("gone", now - Duration::minutes(30)),
            record("here", now),
        ]));

        let summaries = StatsService::new(repo).summarize(now).await.unwrap();

        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].shortcode, "here");
    }

    #[tokio::test]
    async fn test_link_summary_states() {
        let now = Utc::now();
        let repo = Arc::new(MemoryLinkRepository::with_records(vec![record("abcd", now)]));
        repo.record_click("abcd", ClickEvent::new(now, Some("direct".into()), None))
            .await
            .unwrap();
        let service = StatsService::new(repo);

        let summary = service.link_summary("abcd", now).await.unwrap();
        assert_eq!(summary.click_count, 1);

        let expired = service
            .link_summary("abcd", now + Duration::minutes(30))
            .await
            .unwrap_err();
        assert!(matches!(expired, AppError::Expired { .. }));

        let missing = service.link_summary("zzzz", now).await.unwrap_err();
        assert!(matches!(missing, AppError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_summarize_passes_store_order_through() {
        let now = Utc::now();
        let mut repo = MockLinkRepository::new();
        repo.expect_list_live()
            .times(1)
            .returning(move |_| Ok(vec![record("newer", now), record("older", now - Duration::minutes(5))]));

        let summaries = StatsService::new(Arc::new(repo)).summarize(now).await.unwrap();

        let codes: Vec<_> = summaries.iter().map(|s| s.shortcode.as_str()).collect();
        assert_eq!(codes, ["newer", "older"]);
    }

    #[tokio::test]
    async fn test_lookup_returns_expired_records() {
        let now = Utc::now();
        let repo = Arc::new(MemoryLinkRepository::with_records(vec![record(
            "oldie",
            now - Duration::hours(1),
        )]));
        let service = StatsService::new(repo);

        let found = service.lookup("oldie").await.unwrap().unwrap();
        assert!(found.is_expired_at(now));
        assert!(service.lookup("nope").await.unwrap().is_none());
    }
}
