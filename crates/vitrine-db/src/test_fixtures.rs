//! Test fixtures for database integration tests.
//!
//! Every [`TestDatabase`] is a fresh migrated `sqlite::memory:` database, so
//! tests are isolated without any cleanup.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use vitrine_db::test_fixtures::TestDatabase;
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let test_db = TestDatabase::new().await;
//!     let id = test_db.published_post("Motoboy em Guarulhos", "<p>corpo</p>").await;
//!     // Run your tests...
//! }
//! ```

use chrono::{DateTime, Utc};

use crate::{
    CreatePostRequest, Database, PillarRepository, PoolConfig, PostMetaRepository,
    PostRepository, PostStatus, PostType,
};

/// In-memory URL used by test databases.
pub const TEST_DATABASE_URL: &str = "sqlite::memory:";

/// Fresh migrated in-memory database.
pub struct TestDatabase {
    pub db: Database,
}

impl TestDatabase {
    /// Create and migrate a new in-memory database.
    pub async fn new() -> Self {
        let db = Database::connect_with_config(TEST_DATABASE_URL, PoolConfig::in_memory())
            .await
            .expect("Failed to create test database");
        db.migrate().await.expect("Failed to run migrations");
        Self { db }
    }

    /// Insert a published post.
    pub async fn published_post(&self, title: &str, content: &str) -> i64 {
        self.post_with(title, content, PostStatus::Publish, None).await
    }

    /// Insert a draft post.
    pub async fn draft_post(&self, title: &str, content: &str) -> i64 {
        self.post_with(title, content, PostStatus::Draft, None).await
    }

    /// Insert a published post with an explicit creation time.
    pub async fn published_post_at(
        &self,
        title: &str,
        content: &str,
        created_at: DateTime<Utc>,
    ) -> i64 {
        self.post_with(title, content, PostStatus::Publish, Some(created_at))
            .await
    }

    /// Insert a published page.
    pub async fn published_page(&self, title: &str, content: &str) -> i64 {
        self.db
            .posts
            .insert(CreatePostRequest {
                title: title.to_string(),
                content: content.to_string(),
                status: PostStatus::Publish,
                post_type: PostType::Page,
                author_id: 1,
                ..Default::default()
            })
            .await
            .expect("Failed to insert page")
    }

    async fn post_with(
        &self,
        title: &str,
        content: &str,
        status: PostStatus,
        created_at: Option<DateTime<Utc>>,
    ) -> i64 {
        self.db
            .posts
            .insert(CreatePostRequest {
                title: title.to_string(),
                content: content.to_string(),
                status,
                post_type: PostType::Post,
                author_id: 1,
                created_at,
                ..Default::default()
            })
            .await
            .expect("Failed to insert post")
    }

    /// Register a pillar for a post.
    pub async fn pillar(&self, post_id: i64, keywords: &str) {
        self.db
            .pillars
            .save(post_id, keywords)
            .await
            .expect("Failed to save pillar");
    }

    /// Write one metadata value.
    pub async fn meta(&self, post_id: i64, key: &str, value: &str) {
        self.db
            .meta
            .set(post_id, key, value)
            .await
            .expect("Failed to set post meta");
    }

    /// Current body of a post.
    pub async fn content_of(&self, post_id: i64) -> String {
        self.db
            .posts
            .fetch(post_id)
            .await
            .expect("Failed to fetch post")
            .content
    }

    /// Read one metadata value.
    pub async fn meta_of(&self, post_id: i64, key: &str) -> Option<String> {
        self.db
            .meta
            .get(post_id, key)
            .await
            .expect("Failed to read post meta")
    }
}
