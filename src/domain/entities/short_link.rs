//! Short link entity representing a slug → target mapping.

use chrono::{DateTime, Utc};

/// A persisted short link.
///
/// `slug` and `target` never change after creation. Only `clicks` and
/// `updated_at` move, and only through the store's atomic increment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShortLink {
    pub id: i64,
    pub slug: String,
    pub target: String,
    pub clicks: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(
        id: i64,
        slug: String,
        target: String,
        clicks: i64,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            slug,
            target,
            clicks,
            created_at,
            updated_at,
        }
    }
}

/// Input data for creating a new short link.
///
/// The slug is expected to be normalized (trimmed, lowercased) already.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewShortLink {
    pub slug: String,
    pub target: String,
}

impl NewShortLink {
    pub fn new(slug: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            slug: slug.into(),
            target: target.into(),
        }
    }
}
