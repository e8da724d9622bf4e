//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, RedirectService, StatsService};
use crate::domain::repositories::{DraftRepository, LinkRepository};
use crate::infrastructure::telemetry::TelemetrySink;
use crate::utils::code_generator::CodeAllocator;

/// Handles to the services and stores, cloned per request.
///
/// All three services share one record store, so shortening, statistics and
/// redirects observe the same records.
#[derive(Clone)]
pub struct AppState {
    pub link_service: Arc<LinkService<dyn LinkRepository>>,
    pub stats_service: Arc<StatsService<dyn LinkRepository>>,
    pub redirect_service: Arc<RedirectService<dyn LinkRepository>>,
    pub drafts: Arc<dyn DraftRepository>,
    pub telemetry: Arc<dyn TelemetrySink>,
    pub base_url: String,
    pub backend: &'static str,
}

impl AppState {
    pub fn new(
        links: Arc<dyn LinkRepository>,
        drafts: Arc<dyn DraftRepository>,
        telemetry: Arc<dyn TelemetrySink>,
        base_url: impl Into<String>,
        default_validity_minutes: i64,
    ) -> Self {
        Self::with_allocator(
            links,
            drafts,
            telemetry,
            base_url,
            default_validity_minutes,
            CodeAllocator::new(),
        )
    }

    /// Same as [`Self::new`] with an explicit allocator (seeded in tests).
    pub fn with_allocator(
        links: Arc<dyn LinkRepository>,
        drafts: Arc<dyn DraftRepository>,
        telemetry: Arc<dyn TelemetrySink>,
        base_url: impl Into<String>,
        default_validity_minutes: i64,
        allocator: CodeAllocator,
    ) -> Self {
        let backend = links.backend_name();
        let link_service = LinkService::new(Arc::clone(&links), Arc::clone(&telemetry))
            .with_allocator(allocator)
            .with_default_validity(default_validity_minutes);

        Self {
            link_service: Arc::new(link_service),
            stats_service: Arc::new(StatsService::new(Arc::clone(&links))),
            redirect_service: Arc::new(RedirectService::new(links, Arc::clone(&telemetry))),
            drafts,
            telemetry,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            backend,
        }
    }

    /// Public URL for a shortcode: `{base_url}/{shortcode}`.
    pub fn short_url(&self, shortcode: &str) -> String {
        format!("{}/{}", self.base_url, shortcode)
    }
}
