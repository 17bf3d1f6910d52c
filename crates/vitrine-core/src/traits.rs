//! Core traits for vitrine abstractions.
//!
//! These traits define the interfaces that concrete implementations
//! must satisfy, enabling pluggable backends and testability.

use std::collections::BTreeMap;

use async_trait::async_trait;

use crate::error::Result;
use crate::models::*;

// =============================================================================
// POST REPOSITORY TRAITS
// =============================================================================

/// Repository for post CRUD and the automation's pending-set queries.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Insert a post. The slug is derived from the title when not given
    /// and made unique by appending `-2`, `-3`, ...
    async fn insert(&self, req: CreatePostRequest) -> Result<i64>;

    /// Fetch a post, failing with `PostNotFound` when absent.
    async fn fetch(&self, id: i64) -> Result<Post>;

    /// Fetch a post if it exists.
    async fn find(&self, id: i64) -> Result<Option<Post>>;

    /// Look up a post by slug.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>>;

    /// List posts with filters and pagination.
    async fn list(&self, req: ListPostsRequest) -> Result<ListPostsResponse>;

    /// All published posts of one type, oldest id first.
    async fn list_published(&self, post_type: PostType) -> Result<Vec<Post>>;

    /// Apply a partial update and return the updated post.
    async fn update(&self, id: i64, req: UpdatePostRequest) -> Result<Post>;

    /// Replace the body and bump `updated_at`.
    async fn update_content(&self, id: i64, content: &str) -> Result<()>;

    /// Move a post to `trash`.
    async fn soft_delete(&self, id: i64) -> Result<()>;

    /// Delete a post and its metadata.
    async fn hard_delete(&self, id: i64) -> Result<()>;

    /// Return `base`, or `base-N` for the smallest N >= 2 that is free.
    /// `exclude_id` lets a post keep its own slug.
    async fn unique_slug(&self, base: &str, exclude_id: Option<i64>) -> Result<String>;

    /// Number of non-trashed posts whose body contains `needle`.
    async fn count_containing(&self, needle: &str) -> Result<i64>;

    /// Published posts lacking an SEO description and the SEO marker.
    /// `max_attempts` of zero disables the attempt filter.
    async fn list_pending_seo(&self, limit: i64, max_attempts: i64) -> Result<Vec<Post>>;

    /// Published posts lacking the link marker, newest first.
    async fn list_pending_links(&self, limit: i64) -> Result<Vec<Post>>;

    /// Non-trashed posts whose title is shared with another post,
    /// ordered by title then creation time.
    async fn list_duplicate_titles(&self) -> Result<Vec<Post>>;

    /// Published posts, pages and comments.
    async fn content_counts(&self) -> Result<ContentCounts>;

    /// Posts of type `post` by status.
    async fn status_counts(&self) -> Result<StatusCounts>;
}

/// Repository for per-post key/value metadata.
#[async_trait]
pub trait PostMetaRepository: Send + Sync {
    /// Get one value.
    async fn get(&self, post_id: i64, key: &str) -> Result<Option<String>>;

    /// All metadata of a post.
    async fn get_all(&self, post_id: i64) -> Result<BTreeMap<String, String>>;

    /// Insert or replace one value.
    async fn set(&self, post_id: i64, key: &str, value: &str) -> Result<()>;

    /// Insert or replace several values in one transaction.
    async fn set_many(&self, post_id: i64, entries: &[(&str, &str)]) -> Result<()>;

    /// Remove one key.
    async fn delete(&self, post_id: i64, key: &str) -> Result<()>;

    /// `(post_id, value)` for every non-empty value stored under `key`.
    async fn list_by_key(&self, key: &str) -> Result<Vec<(i64, String)>>;
}

// =============================================================================
// PILLAR REPOSITORY TRAITS
// =============================================================================

/// Repository for pillar-post definitions.
#[async_trait]
pub trait PillarRepository: Send + Sync {
    /// Create or update the pillar record of a post.
    ///
    /// Updating is always allowed; creating fails with `LimitReached` once
    /// the pillar limit is reached.
    async fn save(&self, post_id: i64, keywords: &str) -> Result<PillarSave>;

    /// All pillars with their post's title and slug.
    async fn list(&self) -> Result<Vec<PillarPost>>;

    /// The pillar record of a post.
    async fn get(&self, post_id: i64) -> Result<Option<PillarPost>>;

    /// Remove the pillar record of a post. Returns whether one existed.
    async fn remove(&self, post_id: i64) -> Result<bool>;

    /// Number of pillar records.
    async fn count(&self) -> Result<i64>;
}

// =============================================================================
// MEDIA / TERM REPOSITORY TRAITS
// =============================================================================

/// Repository for media metadata.
#[async_trait]
pub trait MediaRepository: Send + Sync {
    async fn insert(&self, req: CreateMediaRequest) -> Result<i64>;

    async fn fetch(&self, id: i64) -> Result<Media>;

    /// Newest first.
    async fn list(&self, limit: i64, offset: i64) -> Result<Vec<Media>>;

    async fn count(&self) -> Result<i64>;

    async fn update(&self, id: i64, req: UpdateMediaRequest) -> Result<Media>;
}

/// Repository for categories and tags.
#[async_trait]
pub trait TermRepository: Send + Sync {
    /// Terms of one taxonomy ordered by name, with post counts.
    async fn list(&self, taxonomy: Taxonomy) -> Result<Vec<Term>>;

    async fn fetch(&self, id: i64) -> Result<Term>;

    /// Create a term; the slug is derived from the name when absent.
    async fn create(&self, taxonomy: Taxonomy, req: CreateTermRequest) -> Result<Term>;

    /// Term ids of one taxonomy attached to a post.
    async fn get_for_post(&self, post_id: i64, taxonomy: Taxonomy) -> Result<Vec<i64>>;

    /// Replace the post's terms of one taxonomy.
    async fn set_for_post(&self, post_id: i64, taxonomy: Taxonomy, term_ids: &[i64])
        -> Result<()>;
}

// =============================================================================
// SETTINGS TRAITS
// =============================================================================

/// Key/value configuration store.
#[async_trait]
pub trait SettingsRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn all(&self) -> Result<BTreeMap<String, String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;

    async fn set_many(&self, entries: &[(String, String)]) -> Result<()>;
}

// =============================================================================
// INFERENCE TRAITS
// =============================================================================

/// Backend for text generation.
#[async_trait]
pub trait GenerationBackend: Send + Sync {
    /// Generate text given a prompt.
    async fn generate(&self, prompt: &str) -> Result<String>;

    /// Generate text with system context.
    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String>;

    /// Get the model name being used.
    fn model_name(&self) -> &str;
}
