//! Category and tag repository implementation.

use async_trait::async_trait;
use sqlx::{Pool, Row, Sqlite};

use vitrine_core::text::slugify;
use vitrine_core::{CreateTermRequest, Error, Result, Taxonomy, Term, TermRepository};

const TERM_SELECT: &str = r#"
    SELECT t.id, t.taxonomy, t.name, t.slug, t.description, t.parent,
        (SELECT COUNT(*) FROM post_terms pt JOIN posts p ON p.id = pt.post_id
         WHERE pt.term_id = t.id AND p.status <> 'trash') AS post_count
    FROM terms t
"#;

fn map_term_row(row: &sqlx::sqlite::SqliteRow) -> Term {
    let taxonomy = match row.get::<String, _>("taxonomy").as_str() {
        "post_tag" => Taxonomy::Tag,
        _ => Taxonomy::Category,
    };
    Term {
        id: row.get("id"),
        taxonomy,
        name: row.get("name"),
        slug: row.get("slug"),
        description: row.get("description"),
        parent: row.get("parent"),
        count: row.get("post_count"),
    }
}

/// SQLite implementation of TermRepository.
#[derive(Clone)]
pub struct SqliteTermRepository {
    pool: Pool<Sqlite>,
}

impl SqliteTermRepository {
    /// Create a new SqliteTermRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TermRepository for SqliteTermRepository {
    async fn list(&self, taxonomy: Taxonomy) -> Result<Vec<Term>> {
        let rows = sqlx::query(&format!("{TERM_SELECT} WHERE t.taxonomy = ? ORDER BY t.name"))
            .bind(taxonomy.as_str())
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(rows.iter().map(map_term_row).collect())
    }

    async fn fetch(&self, id: i64) -> Result<Term> {
        let row = sqlx::query(&format!("{TERM_SELECT} WHERE t.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref()
            .map(map_term_row)
            .ok_or_else(|| Error::NotFound(format!("term {}", id)))
    }

    async fn create(&self, taxonomy: Taxonomy, req: CreateTermRequest) -> Result<Term> {
        let name = req.name.trim();
        if name.is_empty() {
            return Err(Error::InvalidInput("term name is required".to_string()));
        }
        let slug = req
            .slug
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(name));

        let existing: Option<i64> =
            sqlx::query_scalar("SELECT id FROM terms WHERE taxonomy = ? AND slug = ?")
                .bind(taxonomy.as_str())
                .bind(&slug)
                .fetch_optional(&self.pool)
                .await
                .map_err(Error::Database)?;
        if existing.is_some() {
            return Err(Error::InvalidInput(format!(
                "a {} with slug '{}' already exists",
                taxonomy, slug
            )));
        }

        let parent = match taxonomy {
            Taxonomy::Category => req.parent,
            Taxonomy::Tag => 0,
        };

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO terms (taxonomy, name, slug, description, parent) \
             VALUES (?, ?, ?, ?, ?) RETURNING id",
        )
        .bind(taxonomy.as_str())
        .bind(name)
        .bind(&slug)
        .bind(&req.description)
        .bind(parent)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.fetch(id).await
    }

    async fn get_for_post(&self, post_id: i64, taxonomy: Taxonomy) -> Result<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "SELECT t.id FROM post_terms pt JOIN terms t ON t.id = pt.term_id \
             WHERE pt.post_id = ? AND t.taxonomy = ? ORDER BY t.id",
        )
        .bind(post_id)
        .bind(taxonomy.as_str())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(ids)
    }

    async fn set_for_post(
        &self,
        post_id: i64,
        taxonomy: Taxonomy,
        term_ids: &[i64],
    ) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        sqlx::query(
            "DELETE FROM post_terms WHERE post_id = ? \
             AND term_id IN (SELECT id FROM terms WHERE taxonomy = ?)",
        )
        .bind(post_id)
        .bind(taxonomy.as_str())
        .execute(&mut *tx)
        .await
        .map_err(Error::Database)?;

        // Ids from another taxonomy or unknown ids are ignored.
        for term_id in term_ids {
            sqlx::query(
                "INSERT OR IGNORE INTO post_terms (post_id, term_id) \
                 SELECT ?, id FROM terms WHERE id = ? AND taxonomy = ?",
            )
            .bind(post_id)
            .bind(term_id)
            .bind(taxonomy.as_str())
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }
}
