//! DTOs for the link creation endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;
use crate::utils::slug::validate_slug;
use crate::utils::url_policy::validate_target_url;

/// Request to create one short link.
///
/// Both fields are trimmed by [`CreateLinkRequest::trimmed`] before
/// validation; an empty `slug` means "generate one".
#[derive(Debug, Deserialize, Validate)]
pub struct CreateLinkRequest {
    /// Optional custom slug (ASCII word characters and hyphens).
    #[validate(custom(function = "validate_optional_slug"))]
    pub slug: Option<String>,

    /// Target URL (`http`, `https` or `ftp`).
    #[validate(custom(function = "validate_target_url"))]
    pub url: String,
}

impl CreateLinkRequest {
    /// Returns the request with surrounding whitespace removed and an empty
    /// slug collapsed to `None`.
    pub fn trimmed(self) -> Self {
        let slug = self
            .slug
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty());

        Self {
            slug,
            url: self.url.trim().to_string(),
        }
    }
}

/// validator calls custom functions with the inner value of an `Option`
/// field, so this only sees slugs that were sent.
fn validate_optional_slug(slug: &str) -> Result<(), validator::ValidationError> {
    validate_slug(slug)
}

/// A created short link as returned by `POST /url`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortLinkResponse {
    pub id: i64,
    pub slug: String,
    pub url: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<ShortLink> for ShortLinkResponse {
    fn from(link: ShortLink) -> Self {
        Self {
            id: link.id,
            slug: link.slug,
            url: link.target,
            clicks: link.clicks,
            created_at: link.created_at,
            updated_at: link.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn request(slug: Option<&str>, url: &str) -> CreateLinkRequest {
        CreateLinkRequest {
            slug: slug.map(str::to_string),
            url: url.to_string(),
        }
    }

    #[test]
    fn test_trimmed_collapses_empty_slug() {
        let req = request(Some("   "), "  https://example.com  ").trimmed();

        assert_eq!(req.slug, None);
        assert_eq!(req.url, "https://example.com");
    }

    #[test]
    fn test_valid_request() {
        assert!(request(Some("my-link_1"), "https://example.com").validate().is_ok());
        assert!(request(None, "ftp://files.example.com/a").validate().is_ok());
    }

    #[test]
    fn test_invalid_url_is_reported_on_url_field() {
        let errors = request(None, "not a url").validate().unwrap_err();

        assert!(errors.field_errors().contains_key("url"));
    }

    #[test]
    fn test_invalid_slug_is_reported_on_slug_field() {
        let errors = request(Some("a b"), "https://example.com")
            .validate()
            .unwrap_err();

        assert!(errors.field_errors().contains_key("slug"));
    }

    #[test]
    fn test_response_uses_camel_case() {
        let now = Utc::now();
        let link = ShortLink::new(7, "abc".into(), "https://example.com".into(), 0, now, now);

        let value = serde_json::to_value(ShortLinkResponse::from(link)).unwrap();

        assert_eq!(value["id"], json!(7));
        assert_eq!(value["url"], json!("https://example.com"));
        assert!(value.get("createdAt").is_some());
        assert!(value.get("updatedAt").is_some());
        assert!(value.get("target").is_none());
    }
}
