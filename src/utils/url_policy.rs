//! Target URL validation and the self-reference policy.

use crate::error::AppError;
use serde_json::json;
use std::borrow::Cow;
use url::Url;
use validator::ValidationError;

/// Longest target URL accepted.
pub const MAX_URL_LENGTH: usize = 2048;

/// Schemes a short link may redirect to.
const ALLOWED_SCHEMES: &[&str] = &["http", "https", "ftp"];

/// Validates that `input` is a well-formed absolute URL.
///
/// # Rules
///
/// - At most 2048 characters
/// - Parses as an absolute URL
/// - Scheme is `http`, `https` or `ftp` (rejects `javascript:`, `data:`, ...)
/// - Has a non-empty host
///
/// # Errors
///
/// Returns a [`ValidationError`] describing the first violated rule.
pub fn validate_target_url(input: &str) -> Result<(), ValidationError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(ValidationError::new("url_length")
            .with_message(Cow::Borrowed("url must be at most 2048 characters")));
    }

    let url = Url::parse(input).map_err(|_| {
        ValidationError::new("url").with_message(Cow::Borrowed("url must be a valid URL"))
    })?;

    if !ALLOWED_SCHEMES.contains(&url.scheme()) {
        return Err(ValidationError::new("url_scheme")
            .with_message(Cow::Borrowed("url must use http, https or ftp")));
    }

    if url.host_str().is_none_or(str::is_empty) {
        return Err(
            ValidationError::new("url_host").with_message(Cow::Borrowed("url must have a host"))
        );
    }

    Ok(())
}

/// Rejects targets that point back at the service itself.
///
/// Shortening one of our own links would create redirect chains or loops.
#[derive(Debug, Clone)]
pub struct TargetPolicy {
    service_domain: String,
}

impl TargetPolicy {
    pub fn new(service_domain: impl Into<String>) -> Self {
        Self {
            service_domain: normalize_host(&service_domain.into()),
        }
    }

    /// Checks the policy for an already shape-validated target.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if `target` does not parse, and
    /// [`AppError::Policy`] if its host is the service domain or one of its
    /// subdomains.
    pub fn check(&self, target: &str) -> Result<(), AppError> {
        let url = Url::parse(target).map_err(|e| {
            AppError::bad_request("url must be a valid URL", json!({ "reason": e.to_string() }))
        })?;

        let Some(host) = url.host_str() else {
            return Err(AppError::bad_request("url must have a host", json!({})));
        };

        let host = normalize_host(host);
        let suffix = format!(".{}", self.service_domain);

        if host == self.service_domain || host.ends_with(&suffix) {
            return Err(AppError::policy(
                "Stop it. Links to this service cannot be shortened.",
                json!({ "host": host }),
            ));
        }

        Ok(())
    }
}

fn normalize_host(host: &str) -> String {
    host.trim().trim_end_matches('.').to_ascii_lowercase()
}
