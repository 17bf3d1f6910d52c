//! Pillar-post repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};
use tracing::info;

use vitrine_core::defaults::PILLAR_LIMIT;
use vitrine_core::{Error, PillarPost, PillarRepository, PillarSave, Result};

const PILLAR_SELECT: &str = "SELECT pp.id, pp.post_id, pp.keywords, pp.created_at, p.title, p.slug \
     FROM pillar_posts pp JOIN posts p ON p.id = pp.post_id";

fn map_pillar_row(row: &sqlx::sqlite::SqliteRow) -> PillarPost {
    PillarPost {
        id: row.get("id"),
        post_id: row.get("post_id"),
        title: row.get("title"),
        slug: row.get("slug"),
        keywords: row.get("keywords"),
        created_at: row.get("created_at"),
    }
}

/// SQLite implementation of PillarRepository.
#[derive(Clone)]
pub struct SqlitePillarRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePillarRepository {
    /// Create a new SqlitePillarRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PillarRepository for SqlitePillarRepository {
    async fn save(&self, post_id: i64, keywords: &str) -> Result<PillarSave> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        let post_exists: Option<i64> = sqlx::query_scalar("SELECT id FROM posts WHERE id = ?")
            .bind(post_id)
            .fetch_optional(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if post_exists.is_none() {
            return Err(Error::PostNotFound(post_id));
        }

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM pillar_posts WHERE post_id = ?")
                .bind(post_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(Error::Database)?;

        let outcome = if existing.is_some() {
            sqlx::query("UPDATE pillar_posts SET keywords = ? WHERE post_id = ?")
                .bind(keywords)
                .bind(post_id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            PillarSave::Updated
        } else {
            let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pillar_posts")
                .fetch_one(&mut *tx)
                .await
                .map_err(Error::Database)?;
            if count >= PILLAR_LIMIT {
                return Err(Error::LimitReached(format!(
                    "at most {} pillar posts are allowed",
                    PILLAR_LIMIT
                )));
            }
            sqlx::query("INSERT INTO pillar_posts (post_id, keywords, created_at) VALUES (?, ?, ?)")
                .bind(post_id)
                .bind(keywords)
                .bind(Utc::now())
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
            PillarSave::Created
        };

        tx.commit().await.map_err(Error::Database)?;

        info!(
            subsystem = "database",
            component = "pillars",
            op = "save",
            post_id,
            outcome = ?outcome,
            "Pillar saved"
        );
        Ok(outcome)
    }

    async fn list(&self) -> Result<Vec<PillarPost>> {
        let rows = sqlx::query(&format!("{PILLAR_SELECT} ORDER BY pp.created_at, pp.id"))
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(map_pillar_row).collect())
    }

    async fn get(&self, post_id: i64) -> Result<Option<PillarPost>> {
        let row = sqlx::query(&format!("{PILLAR_SELECT} WHERE pp.post_id = ?"))
            .bind(post_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(map_pillar_row))
    }

    async fn remove(&self, post_id: i64) -> Result<bool> {
        let result = sqlx::query("DELETE FROM pillar_posts WHERE post_id = ?")
            .bind(post_id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pillar_posts")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(count)
    }
}
