//! Media repository implementation.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

use vitrine_core::text::slugify;
use vitrine_core::{
    CreateMediaRequest, Error, Media, MediaRepository, Result, UpdateMediaRequest,
};

const MEDIA_COLUMNS: &str = "id, title, slug, source_url, file, mime_type, alt_text, caption, \
     description, author_id, created_at, updated_at";

/// Guess a MIME type from a file name's extension.
pub fn guess_mime_type(file: &str) -> &'static str {
    let ext = file
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "svg" => "image/svg+xml",
        "avif" => "image/avif",
        "mp4" => "video/mp4",
        "pdf" => "application/pdf",
        _ => "image/jpeg",
    }
}

fn map_media_row(row: &sqlx::sqlite::SqliteRow) -> Media {
    Media {
        id: row.get("id"),
        title: row.get("title"),
        slug: row.get("slug"),
        source_url: row.get("source_url"),
        file: row.get("file"),
        mime_type: row.get("mime_type"),
        alt_text: row.get("alt_text"),
        caption: row.get("caption"),
        description: row.get("description"),
        author_id: row.get("author_id"),
        created_at: row.get("created_at"),
        updated_at: row.get("updated_at"),
    }
}

/// SQLite implementation of MediaRepository.
#[derive(Clone)]
pub struct SqliteMediaRepository {
    pool: Pool<Sqlite>,
}

impl SqliteMediaRepository {
    /// Create a new SqliteMediaRepository with the given connection pool.
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MediaRepository for SqliteMediaRepository {
    async fn insert(&self, req: CreateMediaRequest) -> Result<i64> {
        if req.source_url.trim().is_empty() {
            return Err(Error::InvalidInput("source_url is required".to_string()));
        }

        let file = if req.file.is_empty() {
            req.source_url
                .rsplit('/')
                .next()
                .unwrap_or_default()
                .to_string()
        } else {
            req.file.clone()
        };
        let title = if req.title.is_empty() {
            file.rsplit_once('.')
                .map(|(stem, _)| stem.to_string())
                .unwrap_or_else(|| file.clone())
        } else {
            req.title.clone()
        };
        let mime_type = req
            .mime_type
            .clone()
            .unwrap_or_else(|| guess_mime_type(&file).to_string());
        let now = Utc::now();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO media
                (title, slug, source_url, file, mime_type, alt_text, caption, description,
                 author_id, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(&title)
        .bind(slugify(&title))
        .bind(&req.source_url)
        .bind(&file)
        .bind(&mime_type)
        .bind(&req.alt_text)
        .bind(&req.caption)
        .bind(&req.description)
        .bind(req.author_id)
        .bind(now)
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(Error::Database)?;

        Ok(id)
    }

    async fn fetch(&self, id: i64) -> Result<Media> {
        let row = sqlx::query(&format!("SELECT {MEDIA_COLUMNS} FROM media WHERE id = ?"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(Error::Database)?;
        row.as_ref()
            .map(map_media_row)
            .ok_or_else(|| Error::NotFound(format!("media {}", id)))
    }

    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Media>> {
        let rows = sqlx::query(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media ORDER BY created_at DESC, id DESC LIMIT ? OFFSET ?"
        ))
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(Error::Database)?;
        Ok(rows.iter().map(map_media_row).collect())
    }

    async fn count(&self) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM media")
            .fetch_one(&self.pool)
            .await
            .map_err(Error::Database)?;
        Ok(count)
    }

    async fn update(&self, id: i64, req: UpdateMediaRequest) -> Result<Media> {
        let mut media = self.fetch(id).await?;
        if let Some(title) = req.title {
            media.title = title;
        }
        if let Some(alt_text) = req.alt_text {
            media.alt_text = alt_text;
        }
        if let Some(caption) = req.caption {
            media.caption = caption;
        }
        if let Some(description) = req.description {
            media.description = description;
        }

        sqlx::query(
            "UPDATE media SET title = ?, alt_text = ?, caption = ?, description = ?, updated_at = ? \
             WHERE id = ?",
        )
        .bind(&media.title)
        .bind(&media.alt_text)
        .bind(&media.caption)
        .bind(&media.description)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(Error::Database)?;

        self.fetch(id).await
    }
}
