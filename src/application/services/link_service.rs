//! Short link creation service.

use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::slug::{generate_slug, normalize_slug, validate_slug};
use crate::utils::url_policy::{TargetPolicy, validate_target_url};
use serde_json::json;
use tracing::{debug, info};

/// Attempts at inserting a generated slug before giving up.
pub const MAX_GENERATION_ATTEMPTS: usize = 5;

/// Service for creating short links.
///
/// Runs validation and policy checks before touching the store, generates a
/// slug when the caller did not supply one, and leaves uniqueness to the
/// store's atomic `put`.
pub struct LinkService {
    repository: Arc<dyn LinkRepository>,
    policy: TargetPolicy,
    slug_length: usize,
}

impl LinkService {
    /// Creates a new link service.
    pub fn new(repository: Arc<dyn LinkRepository>, policy: TargetPolicy, slug_length: usize) -> Self {
        Self {
            repository,
            policy,
            slug_length,
        }
    }

    /// Creates a short link for `target`.
    ///
    /// A supplied slug is trimmed and lowercased; an empty one counts as
    /// absent.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] if the target or slug is malformed,
    /// [`AppError::Policy`] if the target points at this service, and
    /// [`AppError::DuplicateSlug`] if a supplied slug is taken. Generated
    /// slugs are retried on collision up to [`MAX_GENERATION_ATTEMPTS`]
    /// times before failing with [`AppError::Internal`].
    pub async fn create_link(
        &self,
        target: &str,
        slug: Option<&str>,
    ) -> Result<ShortLink, AppError> {
        let target = target.trim();

        validate_target_url(target).map_err(|e| {
            AppError::bad_request(
                e.message
                    .as_deref()
                    .unwrap_or("url must be a valid URL")
                    .to_string(),
                json!({ "field": "url", "code": e.code }),
            )
        })?;
        self.policy.check(target)?;

        let custom = slug.map(str::trim).filter(|s| !s.is_empty());

        let link = match custom {
            Some(custom) => {
                validate_slug(custom).map_err(|e| {
                    AppError::bad_request(
                        e.message.as_deref().unwrap_or("invalid slug").to_string(),
                        json!({ "field": "slug", "code": e.code }),
                    )
                })?;

                self.insert(NewShortLink::new(normalize_slug(custom), target))
                    .await?
            }
            None => self.insert_generated(target).await?,
        };

        info!(slug = %link.slug, target = %link.target, "Short link created");

        Ok(link)
    }

    /// Inserts under a freshly generated slug, retrying on collision.
    async fn insert_generated(&self, target: &str) -> Result<ShortLink, AppError> {
        for attempt in 1..=MAX_GENERATION_ATTEMPTS {
            let slug = generate_slug(self.slug_length);

            match self.insert(NewShortLink::new(slug, target)).await {
                Err(AppError::DuplicateSlug { slug }) => {
                    debug!(%slug, attempt, "Generated slug collided, retrying");
                }
                other => return other,
            }
        }

        Err(AppError::internal(
            "Failed to generate unique slug",
            json!({ "reason": "Too many collisions", "attempts": MAX_GENERATION_ATTEMPTS }),
        ))
    }

    /// Runs `put` on its own task so a dropped request cannot abandon it
    /// half-issued.
    async fn insert(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let repository = self.repository.clone();

        tokio::spawn(async move { repository.put(new_link).await })
            .await
            .map_err(|e| AppError::internal("Store task failed", json!({ "reason": e.to_string() })))?
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::slug::SLUG_ALPHABET;
    use chrono::Utc;

    fn link_from(new_link: &NewShortLink) -> ShortLink {
        let now = Utc::now();
        ShortLink::new(
            1,
            new_link.slug.clone(),
            new_link.target.clone(),
            0,
            now,
            now,
        )
    }

    fn service(repo: MockLinkRepository) -> LinkService {
        LinkService::new(Arc::new(repo), TargetPolicy::new("cdg.sh"), 5)
    }

    #[tokio::test]
    async fn test_create_with_generated_slug() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put()
            .times(1)
            .returning(|new_link| Ok(link_from(&new_link)));

        let link = service(repo)
            .create_link("https://example.com", None)
            .await
            .unwrap();

        assert_eq!(link.slug.len(), 5);
        assert!(link.slug.bytes().all(|b| SLUG_ALPHABET.contains(&b)));
        assert_eq!(link.target, "https://example.com");
        assert_eq!(link.clicks, 0);
    }

    #[tokio::test]
    async fn test_create_lowercases_custom_slug() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put()
            .withf(|new_link| new_link.slug == "abc")
            .times(1)
            .returning(|new_link| Ok(link_from(&new_link)));

        let link = service(repo)
            .create_link("https://example.com", Some("  AbC "))
            .await
            .unwrap();

        assert_eq!(link.slug, "abc");
    }

    #[tokio::test]
    async fn test_empty_slug_is_generated() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put()
            .withf(|new_link| new_link.slug.len() == 5)
            .times(1)
            .returning(|new_link| Ok(link_from(&new_link)));

        let result = service(repo)
            .create_link("https://example.com", Some("   "))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_generated_slug_collision_is_retried() {
        let mut repo = MockLinkRepository::new();
        let mut seq = mockall::Sequence::new();
        repo.expect_put()
            .times(2)
            .in_sequence(&mut seq)
            .returning(|new_link| Err(AppError::duplicate_slug(new_link.slug)));
        repo.expect_put()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|new_link| Ok(link_from(&new_link)));

        let result = service(repo)
            .create_link("https://example.com", None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_generated_slug_gives_up_after_max_attempts() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put()
            .times(MAX_GENERATION_ATTEMPTS)
            .returning(|new_link| Err(AppError::duplicate_slug(new_link.slug)));

        let result = service(repo)
            .create_link("https://example.com", None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }

    #[tokio::test]
    async fn test_custom_slug_conflict_is_not_retried() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put()
            .times(1)
            .returning(|new_link| Err(AppError::duplicate_slug(new_link.slug)));

        let result = service(repo)
            .create_link("https://example.com", Some("taken"))
            .await;

        let err = result.unwrap_err();
        assert!(matches!(err, AppError::DuplicateSlug { .. }));
        assert_eq!(err.to_string(), "Slug in use.");
    }

    #[tokio::test]
    async fn test_invalid_url_never_reaches_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put().times(0);

        let result = service(repo).create_link("not-a-url", None).await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_invalid_slug_never_reaches_store() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put().times(0);

        let result = service(repo)
            .create_link("https://example.com", Some("no spaces"))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Validation { .. }));
    }

    #[tokio::test]
    async fn test_self_referential_target_is_policy_error() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put().times(0);

        let result = service(repo)
            .create_link("https://cdg.sh/abcde", None)
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Policy { .. }));
    }

    #[tokio::test]
    async fn test_store_errors_propagate() {
        let mut repo = MockLinkRepository::new();
        repo.expect_put()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let result = service(repo)
            .create_link("https://example.com", Some("fine"))
            .await;

        assert!(matches!(result.unwrap_err(), AppError::Internal { .. }));
    }
}
