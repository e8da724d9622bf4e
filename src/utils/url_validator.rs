//! URL well-formedness checks.
//!
//! Submitted URLs are validated but never rewritten: the stored target must
//! round-trip byte-for-byte through a redirect.

use url::Url;

use crate::error::AppError;

/// Errors that can occur during URL validation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("URL must be absolute with a host")]
    MissingAuthority,

    #[error("URL must not contain whitespace or control characters")]
    ForbiddenCharacter,
}

impl From<UrlValidationError> for AppError {
    fn from(e: UrlValidationError) -> Self {
        AppError::InvalidUrl {
            reason: e.to_string(),
        }
    }
}

/// Accepts only absolute URLs with a scheme and a non-empty host.
///
/// The parser silently drops tabs and newlines, so those are rejected up
/// front: a stored URL must be usable verbatim as a `Location` header.
///
/// # Errors
///
/// Returns [`UrlValidationError::ForbiddenCharacter`] for whitespace or
/// control characters, [`UrlValidationError::InvalidFormat`] for unparsable
/// input and [`UrlValidationError::MissingAuthority`] for URLs such as
/// `mailto:` or `file:///` that carry no host.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_url("https://example.com/a").is_ok());
/// assert!(validate_url("not-a-url").is_err());
/// assert!(validate_url("mailto:test@example.com").is_err());
/// ```
pub fn validate_url(candidate: &str) -> Result<(), UrlValidationError> {
    if candidate
        .chars()
        .any(|c| c.is_whitespace() || c.is_control())
    {
        return Err(UrlValidationError::ForbiddenCharacter);
    }

    let url =
        Url::parse(candidate).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    if url.cannot_be_a_base() || url.host_str().is_none_or(str::is_empty) {
        return Err(UrlValidationError::MissingAuthority);
    }

    Ok(())
}
