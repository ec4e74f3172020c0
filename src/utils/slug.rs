//! Slug generation, normalization, and validation.
//!
//! Generated slugs are drawn from a lowercase URL-safe alphabet so they
//! survive the case normalization applied to every slug at creation.

use rand::Rng;
use regex::Regex;
use std::borrow::Cow;
use std::sync::LazyLock;
use validator::ValidationError;

/// Alphabet for generated slugs: lowercase letters, digits, `_` and `-`.
pub const SLUG_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyz0123456789_-";

/// Default generated slug length.
pub const DEFAULT_SLUG_LENGTH: usize = 5;

/// Longest slug accepted from callers.
pub const MAX_SLUG_LENGTH: usize = 64;

/// Slugs that would shadow service routes.
pub const RESERVED_SLUGS: &[&str] = &["url", "health", "static"];

static SLUG_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").expect("slug pattern is valid"));

/// Generates a random slug of `length` characters.
///
/// Uses the thread-local CSPRNG, so slugs are not predictable from earlier
/// ones. Uniqueness is not guaranteed here; the store decides.
pub fn generate_slug(length: usize) -> String {
    let mut rng = rand::rng();

    (0..length)
        .map(|_| {
            let idx = rng.random_range(0..SLUG_ALPHABET.len());
            SLUG_ALPHABET[idx] as char
        })
        .collect()
}

/// Trims surrounding whitespace and lowercases a slug.
pub fn normalize_slug(raw: &str) -> String {
    raw.trim().to_lowercase()
}

/// Returns true if `slug` has the accepted shape and is not reserved.
pub fn is_valid_slug(slug: &str) -> bool {
    validate_slug(slug).is_ok()
}

/// Validates a caller-supplied slug.
///
/// # Rules
///
/// - Length: 1-64 characters
/// - Allowed characters: ASCII letters, digits, `_` and `-`
/// - Cannot be a reserved route name (case-insensitive)
///
/// # Errors
///
/// Returns a [`ValidationError`] with a human-readable message.
pub fn validate_slug(slug: &str) -> Result<(), ValidationError> {
    if slug.is_empty() || slug.len() > MAX_SLUG_LENGTH {
        return Err(ValidationError::new("slug_length")
            .with_message(Cow::Borrowed("slug must be 1-64 characters")));
    }

    if !SLUG_REGEX.is_match(slug) {
        return Err(ValidationError::new("slug_format").with_message(Cow::Borrowed(
            "slug may only contain letters, digits, underscores and hyphens",
        )));
    }

    let lowered = slug.to_ascii_lowercase();
    if RESERVED_SLUGS.contains(&lowered.as_str()) {
        return Err(ValidationError::new("slug_reserved")
            .with_message(Cow::Borrowed("slug is reserved")));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_generate_slug_has_requested_length() {
        assert_eq!(generate_slug(DEFAULT_SLUG_LENGTH).len(), 5);
        assert_eq!(generate_slug(12).len(), 12);
    }

    #[test]
    fn test_generate_slug_uses_alphabet() {
        for _ in 0..200 {
            let slug = generate_slug(DEFAULT_SLUG_LENGTH);
            assert!(slug.bytes().all(|b| SLUG_ALPHABET.contains(&b)), "{slug}");
        }
    }

    #[test]
    fn test_generate_slug_is_already_normalized() {
        let slug = generate_slug(16);
        assert_eq!(normalize_slug(&slug), slug);
        assert!(is_valid_slug(&slug));
    }

    #[test]
    fn test_generate_slug_produces_unique_slugs() {
        let slugs: HashSet<_> = (0..1000).map(|_| generate_slug(12)).collect();
        assert_eq!(slugs.len(), 1000);
    }

    #[test]
    fn test_normalize_slug() {
        assert_eq!(normalize_slug("  AbC "), "abc");
        assert_eq!(normalize_slug("my-Link_2"), "my-link_2");
    }

    #[test]
    fn test_validate_accepts_word_chars_and_hyphens() {
        assert!(validate_slug("abc").is_ok());
        assert!(validate_slug("AbC").is_ok());
        assert!(validate_slug("my-link_2024").is_ok());
        assert!(validate_slug("-").is_ok());
    }

    #[test]
    fn test_validate_rejects_other_characters() {
        assert!(validate_slug("my link").is_err());
        assert!(validate_slug("a/b").is_err());
        assert!(validate_slug("a.b").is_err());
        assert!(validate_slug("héllo").is_err());
        assert!(validate_slug("a)").is_err());
    }

    #[test]
    fn test_validate_length_bounds() {
        assert!(validate_slug("").is_err());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LENGTH)).is_ok());
        assert!(validate_slug(&"a".repeat(MAX_SLUG_LENGTH + 1)).is_err());
    }

    #[test]
    fn test_validate_rejects_reserved_slugs() {
        for &reserved in RESERVED_SLUGS {
            assert!(validate_slug(reserved).is_err(), "{reserved} should be reserved");
        }
        assert!(validate_slug("HEALTH").is_err());
    }

    #[test]
    fn test_validate_error_message() {
        let err = validate_slug("bad slug").unwrap_err();
        assert_eq!(err.code, "slug_format");
        assert!(err.message.unwrap().contains("letters, digits"));
    }
}
