//! Shortening service: validate, allocate, compute expiry, persist.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use metrics::counter;
use tracing::{debug, warn};

use crate::domain::entities::{LinkRecord, ShortenRequest};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::telemetry::{LogLevel, TelemetrySink};
use crate::utils::code_generator::{CodeAllocator, validate_shortcode};
use crate::utils::url_validator::validate_url;

/// Validity applied when neither the request nor the configuration sets one.
pub const DEFAULT_VALIDITY_MINUTES: i64 = 30;

const COMPONENT: &str = "shortener";

/// Progress of a single shorten request. A failure can happen at any stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortenStage {
    Received,
    Validated,
    CodeAssigned,
    Persisted,
    Succeeded,
}

impl fmt::Display for ShortenStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Received => "received",
            Self::Validated => "validated",
            Self::CodeAssigned => "code_assigned",
            Self::Persisted => "persisted",
            Self::Succeeded => "succeeded",
        };
        f.write_str(name)
    }
}

/// Outcome of one request inside a batch.
#[derive(Debug, Clone)]
pub struct BatchItem {
    /// The URL as submitted, kept so failed items can be matched to their row.
    pub original_url: Option<String>,
    pub outcome: Result<LinkRecord, AppError>,
}

/// Per-item outcomes of a batch, in input order.
#[derive(Debug, Clone, Default)]
pub struct BatchReport {
    pub items: Vec<BatchItem>,
}

impl BatchReport {
    pub fn total(&self) -> usize {
        self.items.len()
    }

    pub fn successful(&self) -> usize {
        self.items.iter().filter(|item| item.outcome.is_ok()).count()
    }

    pub fn failed(&self) -> usize {
        self.total() - self.successful()
    }

    /// `"some items failed"` when at least one item failed.
    pub fn message(&self) -> Option<&'static str> {
        (self.failed() > 0).then_some("some items failed")
    }
}

/// Service turning [`ShortenRequest`]s into committed [`LinkRecord`]s.
///
/// No record is written unless every step succeeds. The store arbitrates
/// concurrent claims on the same code: a lost claim is retried once against
/// a fresh live-code snapshot and reported as [`AppError::RaceLost`] if it is
/// lost again.
pub struct LinkService<R: LinkRepository + ?Sized> {
    repository: Arc<R>,
    allocator: CodeAllocator,
    telemetry: Arc<dyn TelemetrySink>,
    default_validity_minutes: i64,
}

impl<R: LinkRepository + ?Sized> LinkService<R> {
    /// Creates a service with an OS-seeded allocator and the default validity.
    pub fn new(repository: Arc<R>, telemetry: Arc<dyn TelemetrySink>) -> Self {
        Self {
            repository,
            allocator: CodeAllocator::new(),
            telemetry,
            default_validity_minutes: DEFAULT_VALIDITY_MINUTES,
        }
    }

    pub fn with_allocator(mut self, allocator: CodeAllocator) -> Self {
        self.allocator = allocator;
        self
    }

    pub fn with_default_validity(mut self, minutes: i64) -> Self {
        self.default_validity_minutes = minutes;
        self
    }

    /// Shortens one URL using the current time.
    ///
    /// # Errors
    ///
    /// See [`Self::shorten_at`].
    pub async fn shorten(&self, request: &ShortenRequest) -> Result<LinkRecord, AppError> {
        self.shorten_at(request, Utc::now()).await
    }

    /// Shortens one URL as of `now`.
    ///
    /// # Errors
    ///
    /// - [`AppError::MissingUrl`] / [`AppError::InvalidUrl`] for a bad URL
    /// - [`AppError::InvalidShortcode`] / [`AppError::ShortcodeTaken`] for a bad preference
    /// - [`AppError::InvalidValidity`] for a non-positive or overflowing validity
    /// - [`AppError::RaceLost`] if concurrent writers claimed the code twice
    /// - [`AppError::AllocatorExhausted`] or store errors otherwise
    pub async fn shorten_at(
        &self,
        request: &ShortenRequest,
        now: DateTime<Utc>,
    ) -> Result<LinkRecord, AppError> {
        let mut stage = ShortenStage::Received;
        self.telemetry.log(
            LogLevel::Info,
            COMPONENT,
            format!("Attempting to shorten {}", request.url().unwrap_or("<missing>")),
        );

        match self.run(request, now, &mut stage).await {
            Ok(record) => {
                debug!(stage = %ShortenStage::Succeeded, shortcode = %record.shortcode, "Shorten finished");
                counter!("shortlink_created_total").increment(1);
                self.telemetry.log(
                    LogLevel::Info,
                    COMPONENT,
                    format!("Successfully shortened {} as {}", record.original_url, record.shortcode),
                );
                Ok(record)
            }
            Err(e) => {
                debug!(%stage, error = %e, "Shorten failed");
                counter!("shortlink_failed_total", "reason" => e.code()).increment(1);
                let level = if e.is_client_error() {
                    LogLevel::Warn
                } else {
                    LogLevel::Error
                };
                self.telemetry.log(
                    level,
                    COMPONENT,
                    format!("Failed to shorten {}: {e}", request.url().unwrap_or("<missing>")),
                );
                Err(e)
            }
        }
    }

    async fn run(
        &self,
        request: &ShortenRequest,
        now: DateTime<Utc>,
        stage: &mut ShortenStage,
    ) -> Result<LinkRecord, AppError> {
        let url = request.url().ok_or(AppError::MissingUrl)?;
        validate_url(url)?;
        let preferred = request.preferred();
        if let Some(code) = preferred {
            validate_shortcode(code)?;
        }
        *stage = ShortenStage::Validated;
        debug!(%stage, url, "Request validated");

        let live_codes = self.repository.live_codes(now).await?;
        let code = self.allocator.allocate(preferred, &live_codes)?;
        *stage = ShortenStage::CodeAssigned;
        debug!(%stage, shortcode = %code, "Shortcode assigned");

        let expires_at = self.expiry(request.requested_validity_minutes, now)?;
        let record = LinkRecord::new(code, url.to_string(), now, Some(expires_at));

        let record = match self.repository.create(record.clone()).await {
            Ok(()) => record,
            Err(AppError::DuplicateCode { code }) => {
                warn!(shortcode = %code, "Shortcode claimed concurrently, re-allocating");
                let live_codes = self.repository.live_codes(now).await?;
                let code = self.allocator.allocate(preferred, &live_codes)?;
                let retry = LinkRecord::new(code, record.original_url, now, record.expires_at);

                match self.repository.create(retry.clone()).await {
                    Ok(()) => retry,
                    Err(AppError::DuplicateCode { code }) => {
                        return Err(AppError::RaceLost { code });
                    }
                    Err(e) => return Err(e),
                }
            }
            Err(e) => return Err(e),
        };
        *stage = ShortenStage::Persisted;
        debug!(%stage, shortcode = %record.shortcode, "Record committed");

        Ok(record)
    }

    fn expiry(
        &self,
        requested_minutes: Option<i64>,
        now: DateTime<Utc>,
    ) -> Result<DateTime<Utc>, AppError> {
        let minutes = requested_minutes.unwrap_or(self.default_validity_minutes);
        if minutes <= 0 {
            return Err(AppError::InvalidValidity { minutes });
        }

        Duration::try_minutes(minutes)
            .and_then(|validity| now.checked_add_signed(validity))
            .ok_or(AppError::InvalidValidity { minutes })
    }

    /// Shortens each request independently, in input order.
    pub async fn shorten_batch(&self, requests: &[ShortenRequest]) -> BatchReport {
        let mut report = BatchReport::default();
        for request in requests {
            report.items.push(BatchItem {
                original_url: request.url().map(str::to_string),
                outcome: self.shorten(request).await,
            });
        }
        report
    }

    /// Batch variant of [`Self::shorten_at`] with one clock for every item.
    pub async fn shorten_batch_at(
        &self,
        requests: &[ShortenRequest],
        now: DateTime<Utc>,
    ) -> BatchReport {
        let mut report = BatchReport::default();
        for request in requests {
            report.items.push(BatchItem {
                original_url: request.url().map(str::to_string),
                outcome: self.shorten_at(request, now).await,
            });
        }
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::persistence::MemoryLinkRepository;
    use crate::infrastructure::telemetry::NullTelemetry;
    use crate::utils::code_generator::{GENERATED_CODE_LENGTH, SHORTCODE_ALPHABET};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn memory_service() -> (Arc<MemoryLinkRepository>, LinkService<MemoryLinkRepository>) {
        let repo = Arc::new(MemoryLinkRepository::new());
        let service = LinkService::new(Arc::clone(&repo), Arc::new(NullTelemetry::default()))
            .with_allocator(CodeAllocator::seeded(7));
        (repo, service)
    }

    fn mock_service(repo: MockLinkRepository) -> LinkService<MockLinkRepository> {
        LinkService::new(Arc::new(repo), Arc::new(NullTelemetry::default()))
            .with_allocator(CodeAllocator::seeded(7))
    }

    #[tokio::test]
    async fn test_preferred_code_with_default_validity() {
        let (repo, service) = memory_service();
        let now = Utc::now();
        let request = ShortenRequest::new("https://example.com/a").with_shortcode("abcd");

        let record = service.shorten_at(&request, now).await.unwrap();

        assert_eq!(record.shortcode, "abcd");
        assert_eq!(record.expires_at, Some(now + Duration::minutes(30)));
        assert_eq!(record.click_count, 0);
        assert!(record.click_log.is_empty());
        assert_eq!(repo.find("abcd").await.unwrap(), Some(record));
    }

    #[tokio::test]
    async fn test_generated_code_uses_allocator_alphabet() {
        let (repo, service) = memory_service();
        let now = Utc::now();
        let before = repo.live_codes(now).await.unwrap();

        let record = service
            .shorten_at(&ShortenRequest::new("https://example.com/b"), now)
            .await
            .unwrap();

        assert_eq!(record.shortcode.len(), GENERATED_CODE_LENGTH);
        assert!(record.shortcode.bytes().all(|b| SHORTCODE_ALPHABET.contains(&b)));
        assert!(!before.contains(&record.shortcode));
    }

    #[tokio::test]
    async fn test_taken_code_rejected_until_expiry() {
        let (_repo, service) = memory_service();
        let now = Utc::now();
        let request = ShortenRequest::new("https://example.com/a").with_shortcode("abcd");

        service.shorten_at(&request, now).await.unwrap();
        let err = service
            .shorten_at(&request, now + Duration::minutes(29))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ShortcodeTaken { ref code } if code == "abcd"));

        let reused = service
            .shorten_at(&request, now + Duration::minutes(30))
            .await
            .unwrap();
        assert_eq!(reused.shortcode, "abcd");
    }

    #[tokio::test]
    async fn test_invalid_url_writes_nothing() {
        let (repo, service) = memory_service();
        let now = Utc::now();

        let err = service
            .shorten_at(&ShortenRequest::new("not-a-url"), now)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::InvalidUrl { .. }));
        assert!(repo.list_live(now).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_input_errors_short_circuit_in_order() {
        let (_repo, service) = memory_service();
        let now = Utc::now();

        let missing = service
            .shorten_at(&ShortenRequest::default().with_shortcode("!!"), now)
            .await
            .unwrap_err();
        assert!(matches!(missing, AppError::MissingUrl));

        let bad_code = service
            .shorten_at(
                &ShortenRequest::new("https://example.com").with_shortcode("ab"),
                now,
            )
            .await
            .unwrap_err();
        assert!(matches!(bad_code, AppError::InvalidShortcode { .. }));

        for minutes in [0, -5, i64::MAX] {
            let err = service
                .shorten_at(
                    &ShortenRequest::new("https://example.com").with_validity(minutes),
                    now,
                )
                .await
                .unwrap_err();
            assert!(matches!(err, AppError::InvalidValidity { .. }), "{minutes}");
        }
    }

    #[tokio::test]
    async fn test_configured_default_validity() {
        let repo = Arc::new(MemoryLinkRepository::new());
        let service = LinkService::new(repo, Arc::new(NullTelemetry::default()))
            .with_default_validity(120);
        let now = Utc::now();

        let record = service
            .shorten_at(&ShortenRequest::new("https://example.com"), now)
            .await
            .unwrap();

        assert_eq!(record.expires_at, Some(now + Duration::minutes(120)));
    }

    #[tokio::test]
    async fn test_batch_keeps_order_and_isolates_failures() {
        let (_repo, service) = memory_service();
        let now = Utc::now();
        let requests = vec![
            ShortenRequest::new("https://example.com/1").with_shortcode("abcd"),
            ShortenRequest::new("not-a-url"),
            ShortenRequest::new("https://example.com/3").with_shortcode("abcd"),
            ShortenRequest::new("https://example.com/4"),
        ];

        let report = service.shorten_batch_at(&requests, now).await;

        assert_eq!(report.total(), 4);
        assert_eq!(report.successful(), 2);
        assert_eq!(report.failed(), 2);
        assert_eq!(report.message(), Some("some items failed"));
        assert!(report.items[0].outcome.is_ok());
        assert!(matches!(report.items[1].outcome, Err(AppError::InvalidUrl { .. })));
        assert!(matches!(report.items[2].outcome, Err(AppError::ShortcodeTaken { .. })));
        assert_eq!(report.items[3].original_url.as_deref(), Some("https://example.com/4"));
        assert!(report.items[3].outcome.is_ok());
    }

    #[tokio::test]
    async fn test_batch_without_failures_has_no_message() {
        let (_repo, service) = memory_service();

        let report = service
            .shorten_batch(&[ShortenRequest::new("https://example.com")])
            .await;

        assert_eq!(report.message(), None);
    }

    #[tokio::test]
    async fn test_lost_race_retries_with_new_code() {
        let mut repo = MockLinkRepository::new();
        repo.expect_live_codes()
            .times(2)
            .returning(|_| Ok(HashSet::new()));
        let creates = AtomicUsize::new(0);
        repo.expect_create().times(2).returning(move |record| {
            if creates.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(AppError::DuplicateCode {
                    code: record.shortcode,
                })
            } else {
                Ok(())
            }
        });

        let record = mock_service(repo)
            .shorten(&ShortenRequest::new("https://example.com"))
            .await
            .unwrap();

        assert_eq!(record.shortcode.len(), GENERATED_CODE_LENGTH);
    }

    #[tokio::test]
    async fn test_preferred_code_race_surfaces_as_taken() {
        let mut repo = MockLinkRepository::new();
        let snapshots = AtomicUsize::new(0);
        repo.expect_live_codes().times(2).returning(move |_| {
            if snapshots.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(HashSet::new())
            } else {
                Ok(HashSet::from(["abcd".to_string()]))
            }
        });
        repo.expect_create().times(1).returning(|record| {
            Err(AppError::DuplicateCode {
                code: record.shortcode,
            })
        });

        let err = mock_service(repo)
            .shorten(&ShortenRequest::new("https://example.com").with_shortcode("abcd"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::ShortcodeTaken { .. }));
    }

    #[tokio::test]
    async fn test_second_lost_race_is_reported() {
        let mut repo = MockLinkRepository::new();
        repo.expect_live_codes()
            .times(2)
            .returning(|_| Ok(HashSet::new()));
        repo.expect_create().times(2).returning(|record| {
            Err(AppError::DuplicateCode {
                code: record.shortcode,
            })
        });

        let err = mock_service(repo)
            .shorten(&ShortenRequest::new("https://example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::RaceLost { .. }));
    }

    #[tokio::test]
    async fn test_store_unavailable_propagates() {
        let mut repo = MockLinkRepository::new();
        repo.expect_live_codes()
            .returning(|_| Err(AppError::StoreUnavailable("connection refused".into())));
        repo.expect_create().times(0);

        let err = mock_service(repo)
            .shorten(&ShortenRequest::new("https://example.com"))
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::StoreUnavailable(_)));
    }
}
