//! PostgreSQL implementation of the slug store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::utils::db_error::is_unique_violation_on_slug;

/// PostgreSQL repository for short links.
///
/// Atomicity comes from the database: the `short_links_slug_key` unique
/// constraint arbitrates concurrent inserts and the click counter is bumped
/// by a single `UPDATE ... RETURNING` statement.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct ShortLinkRow {
    id: i64,
    slug: String,
    target: String,
    clicks: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(r: ShortLinkRow) -> Self {
        ShortLink::new(r.id, r.slug, r.target, r.clicks, r.created_at, r.updated_at)
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn put(&self, new_link: NewShortLink) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            INSERT INTO short_links (slug, target)
            VALUES ($1, $2)
            RETURNING id, slug, target, clicks, created_at, updated_at
            "#,
        )
        .bind(&new_link.slug)
        .bind(&new_link.target)
        .fetch_one(self.pool.as_ref())
        .await
        .map_err(|e| {
            if is_unique_violation_on_slug(&e) {
                AppError::duplicate_slug(&new_link.slug)
            } else {
                AppError::from(e)
            }
        })?;

        Ok(row.into())
    }

    async fn get_and_bump(&self, slug: &str) -> Result<ShortLink, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            UPDATE short_links
            SET clicks = clicks + 1, updated_at = NOW()
            WHERE slug = $1
            RETURNING id, slug, target, clicks, created_at, updated_at
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        row.map(ShortLink::from)
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "slug": slug })))
    }

    async fn find(&self, slug: &str) -> Result<Option<ShortLink>, AppError> {
        let row = sqlx::query_as::<_, ShortLinkRow>(
            r#"
            SELECT id, slug, target, clicks, created_at, updated_at
            FROM short_links
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn delete(&self, slug: &str) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM short_links WHERE slug = $1")
            .bind(slug)
            .execute(self.pool.as_ref())
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64, AppError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM short_links")
            .fetch_one(self.pool.as_ref())
            .await?;

        Ok(count)
    }

    async fn total_clicks(&self) -> Result<i64, AppError> {
        let total: i64 =
            sqlx::query_scalar("SELECT COALESCE(SUM(clicks), 0)::BIGINT FROM short_links")
                .fetch_one(self.pool.as_ref())
                .await?;

        Ok(total)
    }

    async fn health_check(&self) -> bool {
        sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(self.pool.as_ref())
            .await
            .is_ok()
    }
}
