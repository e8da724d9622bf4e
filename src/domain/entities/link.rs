//! Link record entity representing a shortcode → URL mapping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::click::ClickEvent;

/// A committed shortcode mapping with its usage history.
///
/// `expires_at: None` means the record never expires. Records are never deleted;
/// once `now >= expires_at` they are dead and only kept for audit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkRecord {
    #[serde(alias = "shortCode")]
    pub shortcode: String,
    pub original_url: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    #[serde(default, alias = "clicks")]
    pub click_count: u64,
    #[serde(default, alias = "detailedClicks")]
    pub click_log: Vec<ClickEvent>,
}

impl LinkRecord {
    /// Creates a fresh record with no clicks.
    pub fn new(
        shortcode: String,
        original_url: String,
        created_at: DateTime<Utc>,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            shortcode,
            original_url,
            created_at,
            expires_at,
            click_count: 0,
            click_log: Vec::new(),
        }
    }

    /// Returns true if the record is still live at `now`.
    ///
    /// The expiry instant itself is already dead.
    pub fn is_live_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_none_or(|expires_at| now < expires_at)
    }

    /// Returns true if the record has passed its expiry at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_live_at(now)
    }

    /// Appends a click and bumps the counter in one step.
    pub(crate) fn push_click(&mut self, event: ClickEvent) {
        self.click_log.push(event);
        self.click_count = self.click_log.len() as u64;
    }
}
