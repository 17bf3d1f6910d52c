//! Post repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::SqliteRow;
use sqlx::{Pool, QueryBuilder, Row, Sqlite};

use vitrine_core::keys::meta;
use vitrine_core::text::slugify;
use vitrine_core::{
    ContentCounts, CreatePostRequest, Error, ListPostsRequest, ListPostsResponse, Post,
    PostRepository, PostStatus, PostType, Result, StatusCounts, UpdatePostRequest,
};

use crate::escape_like;

const POST_COLUMNS: &str = "p.id, p.title, p.slug, p.content, p.excerpt, p.status, p.type, \
     p.author_id, p.featured_media, p.created_at, p.updated_at";

/// Slug used when a title has no sluggable characters.
const FALLBACK_SLUG: &str = "post";

pub(crate) fn map_post_row(row: &SqliteRow) -> Post {
    Post {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        content: row.get("content"),
        excerpt: row.get("excerpt"),
        status: row
            .get::<String, _>("status")
            .parse()
            .unwrap_or_default(),
        post_type: row.get::<String, _>("type").parse().unwrap_or_default(),
        author_id: row.get("author_id"),
        featured_media: row.get("featured_media"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// Append the WHERE filters of a list request.
fn push_list_filters(qb: &mut QueryBuilder<'_, Sqlite>, req: &ListPostsRequest) {
    qb.push(" WHERE 1 = 1");

    match req.status {
        Some(status) => {
            qb.push(" AND p.status = ").push_bind(status.to_string());
        }
        None => {
            qb.push(" AND p.status <> 'trash'");
        }
    }

    if let Some(post_type) = req.post_type {
        qb.push(" AND p.type = ").push_bind(post_type.to_string());
    }

    if let Some(search) = req.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        let pattern = format!("%{}%", escape_like(search));
        qb.push(" AND (p.title LIKE ")
            .push_bind(pattern.clone())
            .push(" ESCAPE '\\' OR p.content LIKE ")
            .push_bind(pattern)
            .push(" ESCAPE '\\')");
    }

    for term_ids in [&req.categories, &req.tags] {
        if term_ids.is_empty() {
            continue;
        }
        qb.push(" AND EXISTS (SELECT 1 FROM post_terms pt WHERE pt.post_id = p.id AND pt.term_id IN (");
        let mut ids = qb.separated(", ");
        for id in term_ids {
            ids.push_bind(*id);
        }
        qb.push("))");
    }
}

/// SQLite implementation of PostRepository.
#[derive(Clone)]
pub struct SqlitePostRepository {
    pool: Pool<Sqlite>,
}

impl SqlitePostRepository {
    /// Create a new SqlitePostRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    async fn slug_taken(&self, slug: &str, exclude_id: Option<i64>) -> Result<bool> {
        let taken: Option<i64> = sqlx::query_scalar(
            "SELECT id FROM posts WHERE slug = ? AND (? IS NULL OR id <> ?) LIMIT 1",
        )
        .bind(slug)
        .bind(exclude_id)
        .bind(exclude_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(taken.is_some())
    }
}

#[async_trait]
impl PostRepository for SqlitePostRepository {
    async fn insert(&self, req: CreatePostRequest) -> Result<i64> {
        let base = req
            .slug
            .as_deref()
            .map(slugify)
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&req.title));
        let slug = self.unique_slug(&base, None).await?;

        let now = Utc::now();
        let created_at = req.created_at.unwrap_or(now);

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO posts
                (title, slug, content, excerpt, status, type, author_id, featured_media,
                 created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&req.title)
        .bind(&slug)
        .bind(&req.content)
        .bind(&req.excerpt)
        .bind(req.status.to_string())
        .bind(req.post_type.to_string())
        .bind(req.author_id)
        .bind(req.featured_media)
        .bind(created_at)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn fetch(&self, id: i64) -> Result<Post> {
        self.find(id).await?.ok_or(Error::PostNotFound(id))
    }

    async fn find(&self, id: i64) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(map_post_row))
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>> {
        let row = sqlx::query(&format!("SELECT {POST_COLUMNS} FROM posts p WHERE p.slug = ?"))
            .bind(slug)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(row.as_ref().map(map_post_row))
    }

    async fn list(&self, req: ListPostsRequest) -> Result<ListPostsResponse> {
        let limit = req.limit.unwrap_or(vitrine_core::defaults::PAGE_LIMIT);
        let offset = req.offset.unwrap_or(0);

        let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM posts p");
        push_list_filters(&mut count_qb, &req);
        let total: i64 = count_qb
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;

        let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {POST_COLUMNS} FROM posts p"));
        push_list_filters(&mut qb, &req);
        qb.push(" ORDER BY p.created_at DESC, p.id DESC LIMIT ")
            .push_bind(limit)
            .push(" OFFSET ")
            .push_bind(offset);

        let rows = qb
            .build()
            .fetch_all(&self.pool)
            .await
            .map_err(Error::Database)?;

        Ok(ListPostsResponse {
            posts: rows.iter().map(map_post_row).collect(),
            total,
        })
    }

    async fn list_published(&self, post_type: PostType) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            "SELECT {POST_COLUMNS} FROM posts p WHERE p.status = 'publish' AND p.type = ? ORDER BY p.id"
        ))
        .bind(post_type.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(map_post_row).collect())
    }

    async fn update(&self, id: i64, req: UpdatePostRequest) -> Result<Post> {
        let mut post = self.fetch(id).await?;

        if let Some(title) = req.title {
            post.title = title;
        }
        if let Some(content) = req.content {
            post.content = content;
        }
        if let Some(excerpt) = req.excerpt {
            post.excerpt = excerpt;
        }
        if let Some(status) = req.status {
            post.status = status;
        }
        if let Some(featured_media) = req.featured_media {
            post.featured_media = featured_media;
        }
        if let Some(slug) = req.slug {
            let base = slugify(&slug);
            if !base.is_empty() && base != post.slug {
                post.slug = self.unique_slug(&base, Some(id)).await?;
            }
        }

        sqlx::query(
            r#"
            UPDATE posts
            SET title = ?, slug = ?, content = ?, excerpt = ?, status = ?,
                featured_media = ?, updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&post.title)
        .bind(&post.slug)
        .bind(&post.content)
        .bind(&post.excerpt)
        .bind(post.status.to_string())
        .bind(post.featured_media)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.fetch(id).await
    }

    async fn update_content(&self, id: i64, content: &str) -> Result<()> {
        let result = sqlx::query("UPDATE posts SET content = ?, updated_at = ? WHERE id = ?")
            .bind(content)
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::PostNotFound(id));
        }
        Ok(())
    }

    async fn soft_delete(&self, id: i64) -> Result<()> {
        let result = sqlx::query("UPDATE posts SET status = ?, updated_at = ? WHERE id = ?")
            .bind(PostStatus::Trash.to_string())
            .bind(Utc::now())
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::PostNotFound(id));
        }
        Ok(())
    }

    async fn hard_delete(&self, id: i64) -> Result<()> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;

        for sql in [
            "DELETE FROM postmeta WHERE post_id = ?",
            "DELETE FROM post_terms WHERE post_id = ?",
            "DELETE FROM pillar_posts WHERE post_id = ?",
        ] {
            sqlx::query(sql)
                .bind(id)
                .execute(&mut *tx)
                .await
                .map_err(Error::Database)?;
        }

        let result = sqlx::query("DELETE FROM posts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .map_err(Error::Database)?;
        if result.rows_affected() == 0 {
            return Err(Error::PostNotFound(id));
        }

        tx.commit().await.map_err(Error::Database)?;
        Ok(())
    }

    async fn unique_slug(&self, base: &str, exclude_id: Option<i64>) -> Result<String> {
        let base = if base.is_empty() { FALLBACK_SLUG } else { base };
        if !self.slug_taken(base, exclude_id).await? {
            return Ok(base.to_string());
        }
        let mut n = 2;
        loop {
            let candidate = format!("{}-{}", base, n);
            if !self.slug_taken(&candidate, exclude_id).await? {
                return Ok(candidate);
            }
            n += 1;
        }
    }

    async fn count_containing(&self, needle: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM posts WHERE status <> 'trash' AND instr(content, ?) > 0",
        )
        .bind(needle)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(count)
    }

    async fn list_pending_seo(&self, limit: i64, max_attempts: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts p
            WHERE p.status = 'publish' AND p.type = 'post'
              AND NOT EXISTS (
                  SELECT 1 FROM postmeta m
                  WHERE m.post_id = p.id AND m.meta_key = ? AND m.meta_value <> '')
              AND NOT EXISTS (
                  SELECT 1 FROM postmeta m WHERE m.post_id = p.id AND m.meta_key = ?)
              AND (? = 0 OR COALESCE((
                  SELECT CAST(m.meta_value AS INTEGER) FROM postmeta m
                  WHERE m.post_id = p.id AND m.meta_key = ?), 0) < ?)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#
        ))
        .bind(meta::SEO_DESCRIPTION)
        .bind(meta::SEO_DONE)
        .bind(max_attempts)
        .bind(meta::SEO_ATTEMPTS)
        .bind(max_attempts)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(map_post_row).collect())
    }

    async fn list_pending_links(&self, limit: i64) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts p
            WHERE p.status = 'publish' AND p.type = 'post'
              AND NOT EXISTS (
                  SELECT 1 FROM postmeta m WHERE m.post_id = p.id AND m.meta_key = ?)
            ORDER BY p.created_at DESC, p.id DESC
            LIMIT ?
            "#
        ))
        .bind(meta::LINKED)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(map_post_row).collect())
    }

    async fn list_duplicate_titles(&self) -> Result<Vec<Post>> {
        let rows = sqlx::query(&format!(
            r#"
            SELECT {POST_COLUMNS} FROM posts p
            WHERE p.status <> 'trash'
              AND p.title IN (
                  SELECT title FROM posts WHERE status <> 'trash'
                  GROUP BY title HAVING COUNT(*) > 1)
            ORDER BY p.title, p.created_at, p.id
            "#
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(map_post_row).collect())
    }

    async fn content_counts(&self) -> Result<ContentCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                COALESCE(SUM(CASE WHEN type = 'post' THEN 1 ELSE 0 END), 0) AS posts,
                COALESCE(SUM(CASE WHEN type = 'page' THEN 1 ELSE 0 END), 0) AS pages
            FROM posts WHERE status = 'publish'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(ContentCounts {
            posts: row.get("posts"),
            pages: row.get("pages"),
            comments: 0,
        })
    }

    async fn status_counts(&self) -> Result<StatusCounts> {
        let row = sqlx::query(
            r#"
            SELECT
                COUNT(*) AS all_posts,
                COALESCE(SUM(CASE WHEN status = 'publish' THEN 1 ELSE 0 END), 0) AS publish,
                COALESCE(SUM(CASE WHEN status = 'draft' THEN 1 ELSE 0 END), 0) AS draft
            FROM posts WHERE type = 'post' AND status <> 'trash'
            "#,
        )
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(StatusCounts {
            all: row.get("all_posts"),
            publish: row.get("publish"),
            draft: row.get("draft"),
        })
    }
}
