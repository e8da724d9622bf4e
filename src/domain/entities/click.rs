//! Click entity representing a single successful resolution.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A click recorded when a shortcode resolves to a live record.
///
/// Source and location are best-effort metadata (referrer / client address)
/// and may be missing. Click events are never mutated or deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClickEvent {
    pub timestamp: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl ClickEvent {
    /// Creates a new click event.
    ///
    /// # Examples
    ///
    /// ```ignore
    /// let click = ClickEvent::new(
    ///     Utc::now(),
    ///     Some("https://google.com".to_string()),
    ///     Some("192.168.1.1".to_string()),
    /// );
    /// ```
    pub fn new(timestamp: DateTime<Utc>, source: Option<String>, location: Option<String>) -> Self {
        Self {
            timestamp,
            source,
            location,
        }
    }
}

/// Request metadata captured by the redirect entry point.
///
/// Turned into a [`ClickEvent`] only once the resolver has confirmed the
/// shortcode is live.
#[derive(Debug, Clone, Default)]
pub struct ClickMetadata {
    pub source: Option<String>,
    pub location: Option<String>,
}

impl ClickMetadata {
    pub fn new(source: Option<&str>, location: Option<String>) -> Self {
        Self {
            source: source.map(|s| s.to_string()),
            location,
        }
    }

    /// Stamps the metadata into a click event.
    pub fn into_event(self, timestamp: DateTime<Utc>) -> ClickEvent {
        ClickEvent::new(timestamp, self.source, self.location)
    }
}
