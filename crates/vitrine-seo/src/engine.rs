//! Keyword/link candidate engine.
//!
//! Pure functions that decide where anchors may go. They take posts and
//! targets already loaded from the store and never touch it themselves;
//! [`crate::interlink::Interlinker`] feeds them and persists the results.

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};
use tracing::trace;

use vitrine_core::defaults::{
    BACKLINK_CAP, PREVIEW_LIMIT, PREVIEW_LINKS_PER_SOURCE, SCORE_EXACT_TITLE,
};
use vitrine_core::text::strip_tags;
use vitrine_core::{PillarPost, Post};

use crate::keywords::title_keywords;
use crate::matcher::{already_links_to, AnchorTarget, KeywordPattern};

/// A post that outbound links may point at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkTarget {
    pub post_id: i64,
    pub title: String,
    pub slug: String,
    /// Keywords tried in order; the first safe match wins.
    pub keywords: Vec<String>,
    /// Pillars are exempt from the backlink cap.
    pub is_pillar: bool,
}

impl LinkTarget {
    pub fn from_pillar(pillar: &PillarPost) -> Self {
        Self {
            post_id: pillar.post_id,
            title: pillar.title.clone(),
            slug: pillar.slug.clone(),
            keywords: pillar.keyword_list(),
            is_pillar: true,
        }
    }

    /// Target built from a post's `secondary_keywords` value.
    pub fn from_post_keywords(post: &Post, keywords: &str) -> Self {
        Self {
            post_id: post.id,
            title: post.title.clone(),
            slug: post.slug.clone(),
            keywords: vitrine_core::text::split_keywords(keywords),
            is_pillar: false,
        }
    }

    pub fn anchor(&self, base_url: &str) -> AnchorTarget {
        AnchorTarget::new(base_url, &self.slug, &self.title)
    }
}

/// Merge pillar targets with keyword targets. A post reached by both keeps
/// its first occurrence, so the pillar flag survives.
pub fn merge_targets(pillars: Vec<LinkTarget>, others: Vec<LinkTarget>) -> Vec<LinkTarget> {
    let mut seen = HashSet::new();
    pillars
        .into_iter()
        .chain(others)
        .filter(|t| seen.insert(t.post_id))
        .collect()
}

/// First keyword of `keywords` with a safe match in `body`.
pub fn first_safe_keyword<'a>(body: &str, keywords: &'a [String]) -> Option<&'a str> {
    keywords.iter().map(String::as_str).find(|kw| {
        KeywordPattern::new(kw)
            .map(|p| p.is_match(body))
            .unwrap_or(false)
    })
}

/// One anchor inserted into a body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AppliedLink {
    pub target_id: i64,
    pub keyword: String,
}

/// Result of an outbound pass over one body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundResult {
    pub content: String,
    pub links: Vec<AppliedLink>,
}

impl OutboundResult {
    pub fn changed(&self) -> bool {
        !self.links.is_empty()
    }
}

/// Link a body to every target it mentions, at most once per target.
///
/// `backlinks` holds, for non-pillar targets, how many posts already
/// reference the target slug; targets at [`BACKLINK_CAP`] are skipped.
/// Targets already referenced by the body, and the post itself, are skipped.
pub fn link_outbound(
    post_id: i64,
    content: &str,
    targets: &[LinkTarget],
    backlinks: &HashMap<i64, i64>,
    base_url: &str,
) -> OutboundResult {
    let mut current = content.to_string();
    let mut links = Vec::new();

    for target in targets {
        if target.post_id == post_id || already_links_to(&current, &target.slug) {
            continue;
        }
        if !target.is_pillar && backlinks.get(&target.post_id).copied().unwrap_or(0) >= BACKLINK_CAP {
            trace!(
                subsystem = "seo",
                component = "engine",
                target_id = target.post_id,
                "Backlink cap reached, skipping target"
            );
            continue;
        }

        let anchor = target.anchor(base_url);
        for keyword in &target.keywords {
            let Ok(pattern) = KeywordPattern::new(keyword) else {
                continue;
            };
            let (next, changed) = pattern.apply(&current, &anchor);
            if changed {
                current = next;
                links.push(AppliedLink {
                    target_id: target.post_id,
                    keyword: keyword.clone(),
                });
                break;
            }
        }
    }

    OutboundResult {
        content: current,
        links,
    }
}

/// Link preview mode.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewMode {
    /// Pillar keywords against every published non-pillar post.
    #[default]
    Pillar,
    /// Titles of every published post against every other post.
    Ai,
}

impl std::str::FromStr for PreviewMode {
    type Err = vitrine_core::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pillar" | "manual" => Ok(Self::Pillar),
            "ai" => Ok(Self::Ai),
            other => Err(vitrine_core::Error::InvalidInput(format!(
                "unknown preview mode: {}",
                other
            ))),
        }
    }
}

/// A proposed link from a source post to a target post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkSuggestion {
    pub source_id: i64,
    pub source_title: String,
    pub target_id: i64,
    pub target_title: String,
    pub target_slug: String,
    pub keyword: String,
    pub score: u32,
}

/// Pillar-mode suggestions: one per (post, pillar) where the tag-stripped
/// body mentions a pillar keyword and does not reference the pillar yet.
pub fn preview_pillar_links(posts: &[Post], pillars: &[PillarPost]) -> Vec<LinkSuggestion> {
    let pillar_ids: HashSet<i64> = pillars.iter().map(|p| p.post_id).collect();
    let mut suggestions = Vec::new();

    for post in posts.iter().filter(|p| !pillar_ids.contains(&p.id)) {
        let text = strip_tags(&post.content);
        for pillar in pillars {
            if already_links_to(&post.content, &pillar.slug) {
                continue;
            }
            let keywords = pillar.keyword_list();
            if let Some(keyword) = first_safe_keyword(&text, &keywords) {
                suggestions.push(LinkSuggestion {
                    source_id: post.id,
                    source_title: post.title.clone(),
                    target_id: pillar.post_id,
                    target_title: pillar.title.clone(),
                    target_slug: pillar.slug.clone(),
                    keyword: keyword.to_string(),
                    score: SCORE_EXACT_TITLE,
                });
            }
        }
    }
    suggestions
}

/// AI-mode suggestions built from post titles.
///
/// Every post contributes its exact title (score 100) and short title
/// (score 80). Each source gets at most three suggestions; the result is
/// sorted by score (stable) and capped.
pub fn preview_title_links(posts: &[Post]) -> Vec<LinkSuggestion> {
    struct Entry<'a> {
        target: &'a Post,
        pattern: KeywordPattern,
        score: u32,
    }

    let keyword_map: Vec<Entry<'_>> = posts
        .iter()
        .flat_map(|target| {
            title_keywords(&target.title)
                .into_iter()
                .filter_map(move |kw| {
                    KeywordPattern::new(&kw.keyword).ok().map(|pattern| Entry {
                        target,
                        pattern,
                        score: kw.score,
                    })
                })
        })
        .collect();

    let mut suggestions = Vec::new();
    for source in posts {
        let text = strip_tags(&source.content);
        let mut found = 0;
        for entry in &keyword_map {
            if found >= PREVIEW_LINKS_PER_SOURCE {
                break;
            }
            if entry.target.id == source.id || already_links_to(&source.content, &entry.target.slug) {
                continue;
            }
            if entry.pattern.is_match(&text) {
                suggestions.push(LinkSuggestion {
                    source_id: source.id,
                    source_title: source.title.clone(),
                    target_id: entry.target.id,
                    target_title: entry.target.title.clone(),
                    target_slug: entry.target.slug.clone(),
                    keyword: entry.pattern.keyword().to_string(),
                    score: entry.score,
                });
                found += 1;
            }
        }
    }

    suggestions.sort_by(|a, b| b.score.cmp(&a.score));
    suggestions.truncate(PREVIEW_LIMIT);
    suggestions
}
