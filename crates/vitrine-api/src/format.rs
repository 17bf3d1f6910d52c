//! WordPress REST v2 object shapes.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;

use vitrine_core::{
    Media, Post, PostMetaRepository, PostRepository, PostStatus, PostType, Result, Taxonomy, Term,
    TermRepository,
};
use vitrine_seo::backlinks::outgoing_slugs;

use crate::config::ApiConfig;
use crate::state::AppState;

/// WordPress timestamps: local-style ISO 8601 without offset.
pub fn wp_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%dT%H:%M:%S").to_string()
}

#[derive(Debug, Serialize)]
pub struct Rendered {
    pub rendered: String,
}

#[derive(Debug, Serialize)]
pub struct RenderedRaw {
    pub rendered: String,
    pub raw: String,
}

#[derive(Debug, Serialize)]
pub struct RenderedContent {
    pub rendered: String,
    pub raw: String,
    pub protected: bool,
}

impl RenderedContent {
    fn new(text: &str) -> Self {
        Self {
            rendered: text.to_string(),
            raw: text.to_string(),
            protected: false,
        }
    }
}

impl RenderedRaw {
    fn new(text: &str) -> Self {
        Self {
            rendered: text.to_string(),
            raw: text.to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct Href {
    pub href: String,
}

#[derive(Debug, Serialize)]
pub struct Links {
    #[serde(rename = "self")]
    pub self_: Vec<Href>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub collection: Vec<Href>,
}

/// A post as the WordPress v2 API returns it, plus internal link counts.
#[derive(Debug, Serialize)]
pub struct WpPost {
    pub id: i64,
    pub date: String,
    pub date_gmt: String,
    pub guid: Rendered,
    pub modified: String,
    pub modified_gmt: String,
    pub slug: String,
    pub status: PostStatus,
    #[serde(rename = "type")]
    pub post_type: PostType,
    pub link: String,
    pub title: RenderedRaw,
    pub content: RenderedContent,
    pub excerpt: RenderedContent,
    pub author: i64,
    pub featured_media: i64,
    pub categories: Vec<i64>,
    pub tags: Vec<i64>,
    /// Public metadata; keys starting with `_` are internal markers.
    pub meta: BTreeMap<String, String>,
    /// Other live posts whose body links to this post.
    pub inbound_links: i64,
    /// Distinct internal slugs this post links to.
    pub outbound_links: usize,
    #[serde(rename = "_links")]
    pub links: Links,
}

/// Shape a stored post, loading its terms, metadata and link counts.
pub async fn format_post(state: &AppState, post: Post) -> Result<WpPost> {
    let db = &state.db;
    let base = state.config.base_url.as_str();

    let categories = db.terms.get_for_post(post.id, Taxonomy::Category).await?;
    let tags = db.terms.get_for_post(post.id, Taxonomy::Tag).await?;
    let meta = db
        .meta
        .get_all(post.id)
        .await?
        .into_iter()
        .filter(|(k, _)| !k.starts_with('_'))
        .collect();

    let href = format!("{}/{}", base, post.slug);
    let mut inbound_links = db.posts.count_containing(&href).await?;
    if post.status != PostStatus::Trash && post.content.contains(&href) {
        inbound_links -= 1;
    }
    let outbound_links = outgoing_slugs(&post.content, base).len();

    Ok(WpPost {
        id: post.id,
        date: wp_date(&post.created_at),
        date_gmt: wp_date(&post.created_at),
        guid: Rendered {
            rendered: format!("{}/?p={}", base, post.id),
        },
        modified: wp_date(&post.updated_at),
        modified_gmt: wp_date(&post.updated_at),
        link: href,
        title: RenderedRaw::new(&post.title),
        content: RenderedContent::new(&post.content),
        excerpt: RenderedContent::new(&post.excerpt),
        author: post.author_id,
        featured_media: post.featured_media,
        categories,
        tags,
        meta,
        inbound_links: inbound_links.max(0),
        outbound_links,
        links: Links {
            self_: vec![Href {
                href: format!("{}/wp-json/wp/v2/posts/{}", base, post.id),
            }],
            collection: vec![Href {
                href: format!("{}/wp-json/wp/v2/posts", base),
            }],
        },
        slug: post.slug,
        status: post.status,
        post_type: post.post_type,
    })
}

/// Format a page of posts in order.
pub async fn format_posts(state: &AppState, posts: Vec<Post>) -> Result<Vec<WpPost>> {
    let mut out = Vec::with_capacity(posts.len());
    for post in posts {
        out.push(format_post(state, post).await?);
    }
    Ok(out)
}

#[derive(Debug, Serialize)]
pub struct MediaDetails {
    pub file: String,
}

#[derive(Debug, Serialize)]
pub struct WpMedia {
    pub id: i64,
    pub date: String,
    pub date_gmt: String,
    pub guid: Rendered,
    pub modified: String,
    pub modified_gmt: String,
    pub slug: String,
    pub status: &'static str,
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub link: String,
    pub title: RenderedRaw,
    pub author: i64,
    pub alt_text: String,
    pub caption: RenderedRaw,
    pub description: RenderedRaw,
    pub media_type: &'static str,
    pub mime_type: String,
    pub source_url: String,
    pub media_details: MediaDetails,
    #[serde(rename = "_links")]
    pub links: Links,
}

pub fn format_media(config: &ApiConfig, media: Media) -> WpMedia {
    let media_type = if media.mime_type.starts_with("image/") {
        "image"
    } else {
        "file"
    };

    WpMedia {
        id: media.id,
        date: wp_date(&media.created_at),
        date_gmt: wp_date(&media.created_at),
        guid: Rendered {
            rendered: media.source_url.clone(),
        },
        modified: wp_date(&media.updated_at),
        modified_gmt: wp_date(&media.updated_at),
        status: "inherit",
        kind: "attachment",
        link: media.source_url.clone(),
        title: RenderedRaw::new(&media.title),
        author: media.author_id,
        caption: RenderedRaw::new(&media.caption),
        description: RenderedRaw::new(&media.description),
        media_type,
        media_details: MediaDetails { file: media.file },
        links: Links {
            self_: vec![Href {
                href: format!("{}/wp-json/wp/v2/media/{}", config.base_url, media.id),
            }],
            collection: Vec::new(),
        },
        slug: media.slug,
        alt_text: media.alt_text,
        mime_type: media.mime_type,
        source_url: media.source_url,
    }
}

#[derive(Debug, Serialize)]
pub struct WpTerm {
    pub id: i64,
    pub count: i64,
    pub description: String,
    pub link: String,
    pub name: String,
    pub slug: String,
    pub taxonomy: Taxonomy,
    pub parent: i64,
    pub meta: Vec<String>,
}

pub fn format_term(config: &ApiConfig, term: Term) -> WpTerm {
    let prefix = match term.taxonomy {
        Taxonomy::Category => "categoria",
        Taxonomy::Tag => "tag",
    };

    WpTerm {
        id: term.id,
        count: term.count,
        description: term.description,
        link: format!("{}/{}/{}", config.base_url, prefix, term.slug),
        name: term.name,
        slug: term.slug,
        taxonomy: term.taxonomy,
        parent: term.parent,
        meta: Vec::new(),
    }
}

#[derive(Debug, Serialize)]
pub struct WpUser {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub email: String,
    pub roles: Vec<&'static str>,
    pub capabilities: BTreeMap<&'static str, bool>,
}

/// The single static administrator.
pub fn admin_user(config: &ApiConfig) -> WpUser {
    let name = if config.credentials.user.is_empty() {
        "admin".to_string()
    } else {
        config.credentials.user.clone()
    };
    let domain = config
        .base_url
        .split("://")
        .nth(1)
        .unwrap_or("localhost")
        .trim_end_matches('/');

    WpUser {
        id: 1,
        slug: vitrine_core::text::slugify(&name),
        email: format!("{}@{}", name, domain),
        name,
        roles: vec!["administrator"],
        capabilities: BTreeMap::from([("administrator", true)]),
    }
}
