//! Repository trait for short link storage.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// The slug store contract.
///
/// Both mutating operations are atomic at the storage layer. Uniqueness and
/// click counting must never rely on a read followed by a write in the
/// application, because the service runs as several concurrent workers.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - In-process implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Inserts a new mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::DuplicateSlug`] if the slug already exists. Of two
    /// concurrent calls with the same slug exactly one succeeds.
    ///
    /// Returns [`AppError::Internal`] or [`AppError::Unavailable`] on storage errors.
    async fn put(&self, new_link: NewShortLink) -> Result<ShortLink, AppError>;

    /// Increments the click counter of `slug` and returns the updated record.
    ///
    /// The increment is a single store-side `clicks = clicks + 1`, so
    /// concurrent calls never lose updates.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this slug. Nothing is
    /// mutated in that case.
    async fn get_and_bump(&self, slug: &str) -> Result<ShortLink, AppError>;

    /// Reads a link without touching its counter.
    async fn find(&self, slug: &str) -> Result<Option<ShortLink>, AppError>;

    /// Removes a link. Returns `Ok(false)` if the slug did not exist.
    ///
    /// Only reachable through administrative tooling.
    async fn delete(&self, slug: &str) -> Result<bool, AppError>;

    /// Counts stored links.
    async fn count(&self) -> Result<i64, AppError>;

    /// Sums the click counters of all links.
    async fn total_clicks(&self) -> Result<i64, AppError>;

    /// Checks if the storage backend is reachable.
    async fn health_check(&self) -> bool;
}
