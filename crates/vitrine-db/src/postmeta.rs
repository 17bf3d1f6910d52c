//! Post-metadata repository implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use vitrine_core::{Error, PostMetaRepository, Result};

const UPSERT_SQL: &str = "INSERT INTO postmeta (post_id, meta_key, meta_value) VALUES (?, ?, ?) \
     ON CONFLICT (post_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value";

/// SQLite implementation of PostMetaRepository.
#[derive(Clone)]
pub struct SqlitePostMetaRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePostMetaRepository {
    /// Create a new SqlitePostMetaRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostMetaRepository for SqlitePostMetaRepository {
    async fn get(&self, post_id: i64, key: &str) -> Result<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT meta_value FROM postmeta WHERE post_id = ? AND meta_key = ?",
        )
        .bind(post_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(value)
    }

    async fn get_all(&self, post_id: i64) -> Result<BTreeMap<String, String>> {
        let rows = sqlx::query("SELECT meta_key, meta_value FROM postmeta WHERE post_id = ?")
            .bind(post_id)
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("meta_key"), row.get("meta_value")))
            .collect())
    }

    async fn set(&self, post_id: i64, key: &str, value: &str) -> Result<()> {
        sqlx::query(UPSERT_SQL)
            .bind(post_id)
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn set_many(&self, post_id: i64, entries: &[(&str, &str)]) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        for (key, value) in entries {
            sqlx::query(UPSERT_SQL)
                .bind(post_id)
                .bind(*key)
                .bind(*value)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }
        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn delete(&self, post_id: i64, key: &str) -> Result<()> {
        sqlx::query("DELETE FROM postmeta WHERE post_id = ? AND meta_key = ?")
            .bind(post_id)
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(())
    }

    async fn list_by_key(&self, key: &str) -> Result<Vec<(i64, String)>> {
        let rows = sqlx::query(
            "SELECT post_id, meta_value FROM postmeta \
             WHERE meta_key = ? AND meta_value <> '' ORDER BY post_id",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(rows
            .into_iter()
            .map(|row| (row.get("post_id"), row.get("meta_value")))
            .collect())
    }
}
