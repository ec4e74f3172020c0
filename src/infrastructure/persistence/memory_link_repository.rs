//! In-process implementation of the slug store.

use async_trait::async_trait;
use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde_json::json;
use std::sync::atomic::{AtomicI64, Ordering};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// Slug store backed by a sharded concurrent map.
///
/// The map's per-shard locks provide the same guarantees the database gives
/// the PostgreSQL backend: `put` is insert-if-absent under the entry lock and
/// `get_and_bump` mutates the record in place under the same lock. State is
/// per-process, so this backend suits development and tests, not a
/// multi-worker deployment.
pub struct MemoryLinkRepository {
    links: DashMap<String, ShortLink>,
    next_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn put(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        match self.links.entry(new_link.slug.clone()) {
            Entry::Occupied(_) => Err(AppError::duplicate_slug(new_link.slug)),
            Entry::Vacant(vacant) => {
                let now = Utc::now();
                let link = ShortLink::new(
                    self.next_id.fetch_add(1, Ordering::Relaxed),
                    new_link.slug,
                    new_link.target,
                    0,
                    now,
                    now,
                );
                vacant.insert(link.clone());
                Ok(link)
            }
        }
    }

    async fn get_and_bump(&self, slug: &str) -> Result<ShortLink, AppError> {
        let Some(mut entry) = self.links.get_mut(slug) else {
            return Err(AppError::not_found(
                "Short link not found",
                json!({ "slug": slug }),
            ));
        };

        entry.clicks += 1;
        entry.updated_at = Utc::now();

        Ok(entry.value().clone())
    }

    async fn find(&self, slug: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.links.get(slug).map(|entry| entry.value().clone()))
    }

    async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        Ok(self.links.remove(slug).is_some())
    }

    async fn count(&self) -> Result<i64, AppError> {
        Ok(self.links.len() as i64)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        Ok(self.links.iter().map(|entry| entry.clicks).sum())
    }

    async fn health_check(&self) -> bool {
        true
    }
}
