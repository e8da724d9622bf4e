//! Shortcode validation and collision-free allocation.
//!
//! Random codes are drawn from `[A-Za-z0-9]` with a fixed length of 6. The
//! random source is injectable so collision-retry paths can be exercised
//! deterministically in tests.

use std::collections::HashSet;
use std::sync::{LazyLock, Mutex, PoisonError};

use rand::rngs::StdRng;
use rand::{Rng, RngCore, SeedableRng};
use regex::Regex;

use crate::error::AppError;

/// Characters used for generated shortcodes.
pub const SHORTCODE_ALPHABET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

/// Length of generated shortcodes.
pub const GENERATED_CODE_LENGTH: usize = 6;

/// Accepted length range for user-provided shortcodes.
pub const MIN_SHORTCODE_LENGTH: usize = 4;
pub const MAX_SHORTCODE_LENGTH: usize = 10;

/// Retry cap for random generation before giving up.
pub const MAX_ALLOCATION_ATTEMPTS: usize = 1000;

static SHORTCODE_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());

/// Reasons a user-provided shortcode is rejected.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum ShortcodeError {
    #[error("Shortcode must be 4-10 characters, got {0}")]
    Length(usize),

    #[error("Shortcode can only contain letters and digits")]
    Characters,
}

impl From<ShortcodeError> for AppError {
    fn from(e: ShortcodeError) -> Self {
        AppError::InvalidShortcode {
            reason: e.to_string(),
        }
    }
}

/// Outcome of a failed allocation.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum AllocationError {
    #[error(transparent)]
    InvalidShortcode(#[from] ShortcodeError),

    /// The preferred code is bound to a live record. The caller decides
    /// whether to report it or fall back to a random code.
    #[error("Shortcode '{0}' collides with a live record")]
    Collision(String),

    #[error("No free shortcode after {0} attempts")]
    Exhausted(usize),
}

impl From<AllocationError> for AppError {
    fn from(e: AllocationError) -> Self {
        match e {
            AllocationError::InvalidShortcode(e) => e.into(),
            AllocationError::Collision(code) => AppError::ShortcodeTaken { code },
            AllocationError::Exhausted(attempts) => AppError::AllocatorExhausted { attempts },
        }
    }
}

/// Validates a user-provided shortcode.
///
/// # Rules
///
/// - Length: 4-10 characters
/// - Allowed characters: ASCII letters and digits
///
/// An empty preference is "no preference" and must be filtered out by the
/// caller before reaching this function.
///
/// # Examples
///
/// ```ignore
/// assert!(validate_shortcode("abcd").is_ok());
/// assert!(validate_shortcode("Promo2025").is_ok());
/// assert!(validate_shortcode("abc").is_err());        // Too short
/// assert!(validate_shortcode("my-link").is_err());    // Hyphen
/// ```
pub fn validate_shortcode(candidate: &str) -> Result<(), ShortcodeError> {
    let len = candidate.chars().count();
    if !(MIN_SHORTCODE_LENGTH..=MAX_SHORTCODE_LENGTH).contains(&len) {
        return Err(ShortcodeError::Length(len));
    }

    if !SHORTCODE_REGEX.is_match(candidate) {
        return Err(ShortcodeError::Characters);
    }

    Ok(())
}

/// Generates shortcodes that do not collide with a given live-code set.
pub struct CodeAllocator {
    rng: Mutex<Box<dyn RngCore + Send>>,
    max_attempts: usize,
}

impl CodeAllocator {
    /// Creates an allocator seeded from the operating system.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Creates a deterministic allocator for reproducible code sequences.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Creates an allocator drawing from the given random source.
    pub fn with_rng(rng: impl RngCore + Send + 'static) -> Self {
        Self {
            rng: Mutex::new(Box::new(rng)),
            max_attempts: MAX_ALLOCATION_ATTEMPTS,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// Picks a shortcode.
    ///
    /// - A valid preferred code that is not live is returned unchanged.
    /// - A preferred code that is live yields [`AllocationError::Collision`].
    /// - Without a preference, random codes are drawn until one is free.
    ///
    /// # Errors
    ///
    /// Returns [`AllocationError::InvalidShortcode`] for a malformed preference
    /// and [`AllocationError::Exhausted`] once the retry cap is hit.
    pub fn allocate(
        &self,
        preferred: Option<&str>,
        live_codes: &HashSet<String>,
    ) -> Result<String, AllocationError> {
        if let Some(code) = preferred {
            validate_shortcode(code)?;

            if live_codes.contains(code) {
                return Err(AllocationError::Collision(code.to_string()));
            }

            return Ok(code.to_string());
        }

        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);

        for attempt in 1..=self.max_attempts {
            let candidate = random_code(&mut *rng);

            if !live_codes.contains(&candidate) {
                if attempt > 1 {
                    tracing::debug!(attempt, "Shortcode allocated after collision retries");
                }
                return Ok(candidate);
            }
        }

        Err(AllocationError::Exhausted(self.max_attempts))
    }
}

impl Default for CodeAllocator {
    fn default() -> Self {
        Self::new()
    }
}

fn random_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..GENERATED_CODE_LENGTH)
        .map(|_| SHORTCODE_ALPHABET[rng.random_range(0..SHORTCODE_ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Random source that always yields zero bits, so every code is `AAAAAA`.
    struct ZeroRng;

    impl RngCore for ZeroRng {
        fn next_u32(&mut self) -> u32 {
            0
        }

        fn next_u64(&mut self) -> u64 {
            0
        }

        fn fill_bytes(&mut self, dst: &mut [u8]) {
            dst.fill(0);
        }
    }

    fn live(codes: &[&str]) -> HashSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn test_validate_minimum_length() {
        assert!(validate_shortcode("abcd").is_ok());
    }

    #[test]
    fn test_validate_maximum_length() {
        assert!(validate_shortcode("abcd123456").is_ok());
    }

    #[test]
    fn test_validate_mixed_case_and_digits() {
        assert!(validate_shortcode("Promo2025").is_ok());
    }

    #[test]
    fn test_validate_too_short() {
        let err = validate_shortcode("abc").unwrap_err();
        assert_eq!(err, ShortcodeError::Length(3));
        assert!(err.to_string().contains("4-10 characters"));
    }

    #[test]
    fn test_validate_too_long() {
        assert_eq!(
            validate_shortcode("abcd1234567"),
            Err(ShortcodeError::Length(11))
        );
    }

    #[test]
    fn test_validate_rejects_non_alphanumeric() {
        assert_eq!(validate_shortcode("my-link"), Err(ShortcodeError::Characters));
        assert_eq!(validate_shortcode("my_link"), Err(ShortcodeError::Characters));
        assert_eq!(validate_shortcode("my link"), Err(ShortcodeError::Characters));
    }

    #[test]
    fn test_validate_rejects_non_ascii_letters() {
        assert_eq!(validate_shortcode("héllo"), Err(ShortcodeError::Characters));
    }

    #[test]
    fn test_allocate_returns_free_preferred_code_unchanged() {
        let allocator = CodeAllocator::seeded(1);
        let code = allocator.allocate(Some("abcd"), &live(&["wxyz"])).unwrap();
        assert_eq!(code, "abcd");
    }

    #[test]
    fn test_allocate_reports_preferred_collision() {
        let allocator = CodeAllocator::seeded(1);
        let err = allocator.allocate(Some("abcd"), &live(&["abcd"])).unwrap_err();
        assert_eq!(err, AllocationError::Collision("abcd".to_string()));
    }

    #[test]
    fn test_allocate_rejects_invalid_preferred_code() {
        let allocator = CodeAllocator::seeded(1);
        let err = allocator.allocate(Some("a!"), &HashSet::new()).unwrap_err();
        assert!(matches!(err, AllocationError::InvalidShortcode(_)));
    }

    #[test]
    fn test_generated_code_shape() {
        let allocator = CodeAllocator::seeded(7);
        let code = allocator.allocate(None, &HashSet::new()).unwrap();

        assert_eq!(code.len(), GENERATED_CODE_LENGTH);
        assert!(code.bytes().all(|b| SHORTCODE_ALPHABET.contains(&b)));
    }

    #[test]
    fn test_seeded_allocators_are_deterministic() {
        let first = CodeAllocator::seeded(42);
        let second = CodeAllocator::seeded(42);

        for _ in 0..5 {
            assert_eq!(
                first.allocate(None, &HashSet::new()).unwrap(),
                second.allocate(None, &HashSet::new()).unwrap()
            );
        }
    }

    #[test]
    fn test_collision_triggers_retry() {
        let replay = CodeAllocator::seeded(42);
        let first_draw = replay.allocate(None, &HashSet::new()).unwrap();
        let second_draw = replay.allocate(None, &HashSet::new()).unwrap();

        let allocator = CodeAllocator::seeded(42);
        let taken = live(&[first_draw.as_str()]);
        let code = allocator.allocate(None, &taken).unwrap();

        assert_ne!(code, first_draw);
        assert_eq!(code, second_draw);
    }

    #[test]
    fn test_exhaustion_after_retry_cap() {
        let allocator = CodeAllocator::with_rng(ZeroRng).with_max_attempts(25);
        let err = allocator.allocate(None, &live(&["AAAAAA"])).unwrap_err();
        assert_eq!(err, AllocationError::Exhausted(25));
    }

    #[test]
    fn test_allocation_errors_map_to_app_errors() {
        let taken: AppError = AllocationError::Collision("abcd".into()).into();
        assert_eq!(taken.code(), "shortcode_taken");

        let exhausted: AppError = AllocationError::Exhausted(1000).into();
        assert_eq!(exhausted.code(), "allocator_exhausted");

        let invalid: AppError = AllocationError::InvalidShortcode(ShortcodeError::Characters).into();
        assert_eq!(invalid.code(), "invalid_shortcode");
    }

    #[test]
    fn test_allocations_never_repeat_live_codes() {
        let allocator = CodeAllocator::seeded(3);
        let mut codes = HashSet::new();

        for _ in 0..1000 {
            let code = allocator.allocate(None, &codes).unwrap();
            codes.insert(code);
        }

        assert_eq!(codes.len(), 1000);
    }
}
