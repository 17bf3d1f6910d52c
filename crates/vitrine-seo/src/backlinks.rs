//! Internal link graph over published posts.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use vitrine_core::defaults::FIXED_PAGE_SLUGS;
use vitrine_core::{Post, PostRepository, PostType, Result};
use vitrine_db::Database;

static HREF: Lazy<Regex> = Lazy::new(|| Regex::new(r#"href=["']([^"']*)["']"#).unwrap());

/// Slug an internal `href` points at, if any.
///
/// Absolute URLs must start with `base_url`; root-relative paths are always
/// internal. The slug is the last non-empty path segment.
pub fn internal_slug(href: &str, base_url: &str) -> Option<String> {
    let base = base_url.trim_end_matches('/');
    let path = if !base.is_empty() && href.starts_with(base) {
        &href[base.len()..]
    } else if href.starts_with('/') && !href.starts_with("//") {
        href
    } else {
        return None;
    };

    let path = path.split(|c: char| c == '?' || c == '#').next().unwrap_or("");
    let slug = path.split('/').filter(|s| !s.is_empty()).last()?;
    if FIXED_PAGE_SLUGS.contains(&slug) {
        return None;
    }
    Some(slug.to_string())
}

/// Internal slugs linked from an HTML body, deduplicated, in order.
pub fn outgoing_slugs(content: &str, base_url: &str) -> Vec<String> {
    let mut seen = BTreeSet::new();
    HREF
        .captures_iter(content)
        .filter_map(|c| c.get(1))
        .filter_map(|m| internal_slug(m.as_str(), base_url))
        .filter(|slug| seen.insert(slug.clone()))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostRef {
    pub id: i64,
    pub title: String,
    pub slug: String,
}

impl From<&Post> for PostRef {
    fn from(post: &Post) -> Self {
        Self {
            id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BacklinkEntry {
    pub post: PostRef,
    pub outgoing: Vec<PostRef>,
    pub incoming: Vec<PostRef>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BacklinkMap {
    pub posts: Vec<BacklinkEntry>,
    pub orphans: Vec<PostRef>,
    pub total_links: usize,
}

/// Build the link graph between `posts`. Links to unknown slugs and
/// self-links are ignored.
pub fn build_backlink_map(posts: &[Post], base_url: &str) -> BacklinkMap {
    let by_slug: HashMap<&str, &Post> = posts.iter().map(|p| (p.slug.as_str(), p)).collect();

    let mut outgoing: BTreeMap<i64, Vec<PostRef>> = BTreeMap::new();
    let mut incoming: BTreeMap<i64, Vec<PostRef>> = BTreeMap::new();
    let mut total_links = 0;

    for post in posts {
        for slug in outgoing_slugs(&post.content, base_url) {
            let Some(target) = by_slug.get(slug.as_str()) else {
                continue;
            };
            if target.id == post.id {
                continue;
            }
            outgoing.entry(post.id).or_default().push(PostRef::from(*target));
            incoming.entry(target.id).or_default().push(PostRef::from(post));
            total_links += 1;
        }
    }

    let mut map = BacklinkMap {
        total_links,
        ..Default::default()
    };
    for post in posts {
        let entry = BacklinkEntry {
            post: PostRef::from(post),
            outgoing: outgoing.remove(&post.id).unwrap_or_default(),
            incoming: incoming.remove(&post.id).unwrap_or_default(),
        };
        if entry.incoming.is_empty() {
            map.orphans.push(entry.post.clone());
        }
        map.posts.push(entry);
    }
    map
}

/// Backlink map over all published posts of type `post`.
pub async fn backlink_map(db: &Database, base_url: &str) -> Result<BacklinkMap> {
    let posts = db.posts.list_published(PostType::Post).await?;
    Ok(build_backlink_map(&posts, base_url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use vitrine_core::PostStatus;

    const BASE: &str = "https://caasexpresss.com";

    fn post(id: i64, slug: &str, content: &str) -> Post {
        Post {
            id,
            title: slug.replace('-', " "),
            slug: slug.to_string(),
            content: content.to_string(),
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
    fn test_internal_slug() {
        assert_eq!(internal_slug("https://caasexpresss.com/frete/", BASE).as_deref(), Some("frete"));
        assert_eq!(internal_slug("/blog/motoboy?utm=x#top", BASE).as_deref(), Some("motoboy"));
        assert_eq!(internal_slug("https://outro.com/frete", BASE), None);
        assert_eq!(internal_slug("//cdn.com/frete", BASE), None);
        assert_eq!(internal_slug("https://caasexpresss.com/contato", BASE), None);
        assert_eq!(internal_slug("https://caasexpresss.com/", BASE), None);
    }

    #[test]
    fn test_outgoing_slugs_dedupes() {
        let html = r#"<a href="/frete">a</a> <a href='https://caasexpresss.com/frete'>b</a> <a href="/motoboy">c</a>"#;
        assert_eq!(outgoing_slugs(html, BASE), vec!["frete", "motoboy"]);
    }

    #[test]
    fn test_build_map_and_orphans() {
        let posts = vec![
            post(1, "frete", r#"<a href="/motoboy">m</a> <a href="/frete">self</a>"#),
            post(2, "motoboy", r#"<a href="https://caasexpresss.com/frete">f</a>"#),
            post(3, "sozinho", r#"<a href="/inexistente">x</a>"#),
        ];
        let map = build_backlink_map(&posts, BASE);

        assert_eq!(map.total_links, 2);
        assert_eq!(map.posts[0].outgoing.len(), 1);
        assert_eq!(map.posts[0].incoming[0].id, 2);
        assert_eq!(map.posts[1].incoming[0].id, 1);
        assert_eq!(map.orphans.iter().map(|p| p.id).collect::<Vec<_>>(), vec![3]);
    }
}
