//! Slug resolution for the redirect path.
//!
//! Each request walks a small state machine:
//!
//! ```text
//! RECEIVED --normalize/shape check--> LOOKED_UP --get_and_bump--> REDIRECT(target)
//!     |                                   |
//!     +---- invalid slug ----> NOT_FOUND <+---- missing slug or store error
//! ```
//!
//! Both terminal states are expressed by [`Resolution`]. Store failures are
//! folded into `NotFound` so redirect consumers never see internal detail;
//! they are logged instead.

use std::sync::Arc;
use std::time::Duration;

use serde_json::json;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, error};

use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::slug::{is_valid_slug, normalize_slug};

/// Retries for store errors that guarantee nothing was applied.
const TRANSIENT_RETRIES: usize = 2;

/// Terminal outcome of resolving a slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Redirect the visitor to this target.
    Redirect(String),
    /// Serve the not-found page.
    NotFound,
}

/// Turns a slug from a request path into a redirect target, counting the click.
pub struct RedirectResolver {
    repository: Arc<dyn LinkRepository>,
}

impl RedirectResolver {
    pub fn new(repository: Arc<dyn LinkRepository>) -> Self {
        Self { repository }
    }

    /// Resolves `raw_slug` and increments its click counter.
    ///
    /// Slugs that cannot exist (bad characters, reserved names) resolve to
    /// [`Resolution::NotFound`] without touching the store.
    pub async fn resolve(&self, raw_slug: &str) -> Resolution {
        let slug = normalize_slug(raw_slug);

        if !is_valid_slug(&slug) {
            debug!(slug = %raw_slug, "Rejected malformed slug");
            return Resolution::NotFound;
        }

        match self.lookup(slug.clone()).await {
            Ok(link) => {
                debug!(%slug, clicks = link.clicks, "Resolved short link");
                Resolution::Redirect(link.target)
            }
            Err(AppError::NotFound { .. }) => {
                debug!(%slug, "Short link not found");
                Resolution::NotFound
            }
            Err(e) => {
                error!(%slug, error = ?e, "Store error while resolving slug");
                Resolution::NotFound
            }
        }
    }

    /// Calls `get_and_bump`, retrying only failures where the store never
    /// ran the increment (pool exhaustion), so a retry cannot double count.
    async fn lookup(&self, slug: String) -> Result<ShortLink, AppError> {
        let strategy = ExponentialBackoff::from_millis(10)
            .max_delay(Duration::from_millis(200))
            .map(jitter)
            .take(TRANSIENT_RETRIES);

        RetryIf::start(
            strategy,
            || self.bump(slug.clone()),
            |e: &AppError| e.is_transient(),
        )
        .await
    }

    /// Runs the increment on its own task so that a client disconnect, which
    /// drops this future, cannot leave it half-issued.
    async fn bump(&self, slug: String) -> Result<ShortLink, AppError> {
        let repository = self.repository.clone();

        tokio::spawn(async move { repository.get_and_bump(&slug).await })
            .await
            .map_err(|e| AppError::internal("Store task failed", json!({ "reason": e.to_string() })))?
    }
}
