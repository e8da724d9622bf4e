//! Shorten request entity (one submitted form row).

use serde::{Deserialize, Serialize};

/// A single submission to shorten a URL.
///
/// Transient: built per submission and never committed as a link. The same
/// shape is used for persisted pending-form drafts, which are stored before
/// any validation happens. Empty strings count as absent values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default, alias = "validity")]
    pub requested_validity_minutes: Option<i64>,
    #[serde(default)]
    pub preferred_shortcode: Option<String>,
}

impl ShortenRequest {
    /// Creates a request for `url` with no validity or shortcode preference.
    pub fn new(original_url: impl Into<String>) -> Self {
        Self {
            original_url: Some(original_url.into()),
            ..Self::default()
        }
    }

    pub fn with_validity(mut self, minutes: i64) -> Self {
        self.requested_validity_minutes = Some(minutes);
        self
    }

    pub fn with_shortcode(mut self, shortcode: impl Into<String>) -> Self {
        self.preferred_shortcode = Some(shortcode.into());
        self
    }

    /// The submitted URL, or `None` when missing or empty.
    pub fn url(&self) -> Option<&str> {
        self.original_url.as_deref().filter(|s| !s.is_empty())
    }

    /// The preferred shortcode, or `None` when the user expressed no preference.
    pub fn preferred(&self) -> Option<&str> {
        self.preferred_shortcode.as_deref().filter(|s| !s.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_sets_fields() {
        let request = ShortenRequest::new("https://example.com/a")
            .with_validity(15)
            .with_shortcode("abcd");

        assert_eq!(request.url(), Some("https://example.com/a"));
        assert_eq!(request.requested_validity_minutes, Some(15));
        assert_eq!(request.preferred(), Some("abcd"));
    }

    #[test]
    fn test_empty_strings_are_absent() {
        let request = ShortenRequest {
            original_url: Some(String::new()),
            requested_validity_minutes: None,
            preferred_shortcode: Some(String::new()),
        };

        assert!(request.url().is_none());
        assert!(request.preferred().is_none());
    }

    #[test]
    fn test_accepts_form_field_alias() {
        let request: ShortenRequest = serde_json::from_str(
            r#"{ "originalUrl": "https://example.com", "validity": 45, "preferredShortcode": "" }"#,
        )
        .unwrap();

        assert_eq!(request.requested_validity_minutes, Some(45));
        assert!(request.preferred().is_none());
    }
}
