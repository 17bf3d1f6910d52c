//! # vitrine-db
//!
//! SQLite content store for vitrine.
//!
//! This crate provides:
//! - Connection pool management
//! - Repository implementations for posts, post metadata, pillars, media,
//!   terms and settings
//! - Embedded schema migrations
//!
//! ## Example
//!
//! ```rust,ignore
//! use vitrine_db::{CreatePostRequest, Database, PostRepository, PostStatus};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::connect("sqlite://vitrine.db?mode=rwc").await?;
//!     db.migrate().await?;
//!
//!     let id = db.posts.insert(CreatePostRequest {
//!         title: "Entrega Expressa em Guarulhos".to_string(),
//!         content: "<p>Entregas no mesmo dia.</p>".to_string(),
//!         status: PostStatus::Publish,
//!         ..Default::default()
//!     }).await?;
//!
//!     println!("Created post: {}", id);
//!     Ok(())
//! }
//! ```
pub mod media;
pub mod pillars;
pub mod pool;
pub mod postmeta;
pub mod posts;
pub mod settings;
pub mod terms;

// Test fixtures for integration tests
// Note: Always compiled so integration tests in other crates can use them
#[cfg(feature = "migrations")]
pub mod test_fixtures;

// Re-export core types
pub use vitrine_core::*;

/// Escape LIKE wildcard characters (`%`, `_`, `\`) in user input.
///
/// Pair with `ESCAPE '\'` in the query.
pub fn escape_like(input: &str) -> String {
    input
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

// Re-export repository implementations
pub use media::{guess_mime_type, SqliteMediaRepository};
pub use pillars::SqlitePillarRepository;
pub use pool::{create_pool, create_pool_with_config, log_pool_metrics, PoolConfig};
pub use postmeta::SqlitePostMetaRepository;
pub use posts::SqlitePostRepository;
pub use settings::SqliteSettingsRepository;
pub use terms::SqliteTermRepository;

/// Combined database context with all repositories.
#[derive(Clone)]
pub struct Database {
    /// The underlying connection pool.
    pub pool: sqlx::Pool<sqlx::Sqlite>,
    /// Post repository for CRUD and pending-set queries.
    pub posts: SqlitePostRepository,
    /// Per-post key/value metadata.
    pub meta: SqlitePostMetaRepository,
    /// Pillar-post definitions.
    pub pillars: SqlitePillarRepository,
    /// Media metadata.
    pub media: SqliteMediaRepository,
    /// Categories and tags.
    pub terms: SqliteTermRepository,
    /// Key/value configuration.
    pub settings: SqliteSettingsRepository,
}

impl Database {
    /// Create a new Database instance from a connection pool.
    pub fn new(pool: sqlx::Pool<sqlx::Sqlite>) -> Self {
        Self {
            posts: SqlitePostRepository::new(pool.clone()),
            meta: SqlitePostMetaRepository::new(pool.clone()),
            pillars: SqlitePillarRepository::new(pool.clone()),
            media: SqliteMediaRepository::new(pool.clone()),
            terms: SqliteTermRepository::new(pool.clone()),
            settings: SqliteSettingsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Create a new Database instance by connecting to the given URL.
    pub async fn connect(url: &str) -> Result<Self> {
        let pool = create_pool(url).await?;
        Ok(Self::new(pool))
    }

    /// Create with custom pool configuration.
    pub async fn connect_with_config(url: &str, config: PoolConfig) -> Result<Self> {
        let pool = create_pool_with_config(url, config).await?;
        Ok(Self::new(pool))
    }

    /// Run pending migrations.
    #[cfg(feature = "migrations")]
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("../../migrations")
            .run(&self.pool)
            .await
            .map_err(|e| Error::Database(sqlx::Error::Migrate(Box::new(e))))?;
        Ok(())
    }

    /// Get the underlying connection pool.
    pub fn pool(&self) -> &sqlx::Pool<sqlx::Sqlite> {
        &self.pool
    }
}
