//! Core data models for vitrine.
//!
//! These types are shared across all vitrine crates and represent the
//! content store entities.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::text::split_keywords;

// =============================================================================
// POST TYPES
// =============================================================================

/// Publication status of a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Publish,
    /// Soft-deleted
    Trash,
}

impl std::fmt::Display for PostStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Draft => write!(f, "draft"),
            Self::Publish => write!(f, "publish"),
            Self::Trash => write!(f, "trash"),
        }
    }
}

impl std::str::FromStr for PostStatus {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(Self::Draft),
            "publish" => Ok(Self::Publish),
            "trash" => Ok(Self::Trash),
            _ => Err(format!("Invalid post status: {}", s)),
        }
    }
}

/// Kind of content a post row holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PostType {
    #[default]
    Post,
    Page,
    WebStory,
}

impl std::fmt::Display for PostType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Post => write!(f, "post"),
            Self::Page => write!(f, "page"),
            Self::WebStory => write!(f, "web-story"),
        }
    }
}

impl std::str::FromStr for PostType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "post" => Ok(Self::Post),
            "page" => Ok(Self::Page),
            "web-story" | "web_story" => Ok(Self::WebStory),
            _ => Err(format!("Invalid post type: {}", s)),
        }
    }
}

/// A stored post, page or web story.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub slug: String,
    /// HTML body
    pub content: String,
    pub excerpt: String,
    pub status: PostStatus,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub author_id: i64,
    pub featured_media: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    /// Whether the post is publicly visible.
    pub fn is_published(&self) -> bool {
        self.status == PostStatus::Publish
    }
}

/// Request for creating a new post.
#[derive(Debug, Clone, Default)]
pub struct CreatePostRequest {
    pub title: String,
    pub content: String,
    pub excerpt: String,
    /// Explicit slug; derived from the title when absent.
    pub slug: Option<String>,
    pub status: PostStatus,
    pub post_type: PostType,
    pub author_id: i64,
    pub featured_media: i64,
    /// Backdated creation time; now when absent.
    pub created_at: Option<DateTime<Utc>>,
}

/// Partial update of a post. `None` fields are left untouched.
#[derive(Debug, Clone, Default)]
pub struct UpdatePostRequest {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub slug: Option<String>,
    pub status: Option<PostStatus>,
    pub featured_media: Option<i64>,
}

/// Request for listing posts.
#[derive(Debug, Clone, Default)]
pub struct ListPostsRequest {
    /// Maximum results
    pub limit: Option<i64>,
    /// Pagination offset
    pub offset: Option<i64>,
    /// Filter by status; all non-trashed posts when absent
    pub status: Option<PostStatus>,
    /// Filter by type
    pub post_type: Option<PostType>,
    /// Case-insensitive search over title and content
    pub search: Option<String>,
    /// Posts carrying any of these category ids
    pub categories: Vec<i64>,
    /// Posts carrying any of these tag ids
    pub tags: Vec<i64>,
}

/// Response for listing posts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListPostsResponse {
    pub posts: Vec<Post>,
    pub total: i64,
}

/// Published content counts for the stats endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentCounts {
    pub posts: i64,
    pub pages: i64,
    pub comments: i64,
}

/// Post counts by status (type `post` only).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub all: i64,
    pub publish: i64,
    pub draft: i64,
}

// =============================================================================
// PILLAR TYPES
// =============================================================================

/// A hub post with the keyword list that drives outbound links toward it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PillarPost {
    pub id: i64,
    pub post_id: i64,
    pub title: String,
    pub slug: String,
    /// Comma-separated free text
    pub keywords: String,
    pub created_at: DateTime<Utc>,
}

impl PillarPost {
    /// Keywords split on commas, trimmed, empties dropped.
    pub fn keyword_list(&self) -> Vec<String> {
        split_keywords(&self.keywords)
    }
}

/// Outcome of saving a pillar definition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PillarSave {
    Created,
    Updated,
}

// =============================================================================
// MEDIA TYPES
// =============================================================================

/// Metadata of an uploaded file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Media {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub source_url: String,
    pub file: String,
    pub mime_type: String,
    pub alt_text: String,
    pub caption: String,
    pub description: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Request for registering a media record.
#[derive(Debug, Clone, Default)]
pub struct CreateMediaRequest {
    pub title: String,
    pub source_url: String,
    pub file: String,
    pub mime_type: Option<String>,
    pub alt_text: String,
    pub caption: String,
    pub description: String,
    pub author_id: i64,
}

/// Partial update of a media record's attributes.
#[derive(Debug, Clone, Default)]
pub struct UpdateMediaRequest {
    pub title: Option<String>,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
}

// =============================================================================
// TERM TYPES
// =============================================================================

/// Taxonomy a term belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Taxonomy {
    #[serde(rename = "category")]
    Category,
    #[serde(rename = "post_tag")]
    Tag,
}

impl Taxonomy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Tag => "post_tag",
        }
    }
}

impl std::fmt::Display for Taxonomy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A category or tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Term {
    pub id: i64,
    pub taxonomy: Taxonomy,
    pub name: String,
    pub slug: String,
    pub description: String,
    pub parent: i64,
    /// Number of non-trashed posts carrying the term
    pub count: i64,
}

/// Request for creating a term.
#[derive(Debug, Clone, Default)]
pub struct CreateTermRequest {
    pub name: String,
    pub slug: Option<String>,
    pub description: String,
    pub parent: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_post() -> Post {
        Post {
            id: 1,
            title: "Entrega Expressa".to_string(),
            slug: "entrega-expressa".to_string(),
            content: "<p>corpo</p>".to_string(),
            excerpt: String::new(),
            status: PostStatus::Publish,
            post_type: PostType::Post,
            author_id: 1,
            featured_media: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn test_post_status_round_trip() {
        for status in [PostStatus::Draft, PostStatus::Publish, PostStatus::Trash] {
            assert_eq!(status.to_string().parse::<PostStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_post_status_rejects_unknown() {
        assert!("archived".parse::<PostStatus>().is_err());
    }

    #[test]
    fn test_post_type_accepts_web_story_spellings() {
        assert_eq!("web-story".parse::<PostType>().unwrap(), PostType::WebStory);
        assert_eq!("web_story".parse::<PostType>().unwrap(), PostType::WebStory);
        assert_eq!(PostType::WebStory.to_string(), "web-story");
    }

    #[test]
    fn test_post_serializes_type_field() {
        let json = serde_json::to_value(sample_post()).unwrap();
        assert_eq!(json["type"], "post");
        assert_eq!(json["status"], "publish");
    }

    #[test]
    fn test_is_published() {
        let mut post = sample_post();
        assert!(post.is_published());
        post.status = PostStatus::Draft;
        assert!(!post.is_published());
    }

    #[test]
    fn test_pillar_keyword_list() {
        let pillar = PillarPost {
            id: 1,
            post_id: 7,
            title: "Motoboy".to_string(),
            slug: "motoboy".to_string(),
            keywords: " motoboy, entrega rápida ,, frete ".to_string(),
            created_at: Utc::now(),
        };
        assert_eq!(
            pillar.keyword_list(),
            vec!["motoboy", "entrega rápida", "frete"]
        );
    }

    #[test]
    fn test_taxonomy_wire_names() {
        assert_eq!(Taxonomy::Category.as_str(), "category");
        assert_eq!(Taxonomy::Tag.to_string(), "post_tag");
        assert_eq!(
            serde_json::to_value(Taxonomy::Tag).unwrap(),
            serde_json::json!("post_tag")
        );
    }
}
