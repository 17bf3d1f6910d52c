//! Link applier: runs the candidate engine against the content store and
//! persists the rewritten bodies.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use chrono::Utc;
use rand::seq::SliceRandom;
use serde::Serialize;
use tracing::{debug, info, instrument};

use vitrine_core::defaults::{BACKLINK_CAP, INBOUND_LINKS_PER_PASS, INBOUND_SOURCES_PER_KEYWORD};
use vitrine_core::keys::meta;
use vitrine_core::{
    marker_value, PillarRepository, Post, PostMetaRepository, PostRepository, PostStatus,
    PostType, Result,
};
use vitrine_db::Database;

use crate::engine::{
    link_outbound, merge_targets, preview_pillar_links, preview_title_links, AppliedLink,
    LinkSuggestion, LinkTarget, PreviewMode,
};
use crate::keywords::{contains_ignore_case, title_keywords};
use crate::matcher::{already_links_to, AnchorTarget, KeywordPattern};

/// An inbound link created in another post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InboundLink {
    pub source_id: i64,
    pub keyword: String,
}

/// Outcome of linking one post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LinkReport {
    pub post_id: i64,
    pub inbound: Vec<InboundLink>,
    pub outbound: Vec<AppliedLink>,
}

impl LinkReport {
    pub fn total(&self) -> usize {
        self.inbound.len() + self.outbound.len()
    }
}

/// Outcome of applying a list of suggestions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ApplyReport {
    pub applied: usize,
    pub skipped: usize,
}

/// Applies inbound and outbound links to stored posts.
#[derive(Clone)]
pub struct Interlinker {
    db: Database,
    base_url: String,
}

impl Interlinker {
    pub fn new(db: Database, base_url: impl Into<String>) -> Self {
        Self {
            db,
            base_url: base_url.into(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Run the inbound and outbound passes for `post`, then mark it linked.
    #[instrument(skip(self, post), fields(subsystem = "seo", component = "interlinker", post_id = post.id))]
    pub async fn link_post(&self, post: &Post) -> Result<LinkReport> {
        let start = Instant::now();
        let inbound = self.inbound_pass(post).await?;
        let outbound = self.outbound_pass(post).await?;

        self.db
            .meta
            .set(post.id, meta::LINKED, &marker_value(Utc::now()))
            .await?;

        let report = LinkReport {
            post_id: post.id,
            inbound,
            outbound,
        };
        info!(
            op = "link_post",
            inbound = report.inbound.len(),
            outbound = report.outbound.len(),
            duration_ms = start.elapsed().as_millis() as u64,
            "Post linked"
        );
        Ok(report)
    }

    /// Bring links from other posts to `target`.
    ///
    /// For the exact title and then the short title, up to five random
    /// published posts mentioning the keyword (and not yet referencing the
    /// target slug) are tried; each linked source counts once, with at most
    /// three links per pass. Non-pillar targets stop at [`BACKLINK_CAP`]
    /// referencing posts, counting the links already in the corpus.
    pub async fn inbound_pass(&self, target: &Post) -> Result<Vec<InboundLink>> {
        let existing = if self.db.pillars.get(target.id).await?.is_some() {
            None
        } else {
            Some(self.db.posts.count_containing(&target.slug).await?)
        };
        let room = |created: usize| -> bool {
            created < INBOUND_LINKS_PER_PASS
                && existing.map_or(true, |count| count + (created as i64) < BACKLINK_CAP)
        };
        if !room(0) {
            debug!(
                subsystem = "seo",
                component = "interlinker",
                target_id = target.id,
                "Backlink cap reached, skipping inbound pass"
            );
            return Ok(Vec::new());
        }

        let anchor = AnchorTarget::new(&self.base_url, &target.slug, &target.title);
        let corpus = self.db.posts.list_published(PostType::Post).await?;
        let mut used: HashSet<i64> = HashSet::new();
        let mut links = Vec::new();

        for scored in title_keywords(&target.title) {
            if !room(links.len()) {
                break;
            }
            let pattern = KeywordPattern::new(&scored.keyword)?;

            let mut sources: Vec<&Post> = corpus
                .iter()
                .filter(|p| p.id != target.id && !used.contains(&p.id))
                .filter(|p| !already_links_to(&p.content, &target.slug))
                .filter(|p| contains_ignore_case(&p.content, &scored.keyword))
                .collect();
            sources.shuffle(&mut rand::thread_rng());
            sources.truncate(INBOUND_SOURCES_PER_KEYWORD);

            for source in sources {
                if !room(links.len()) {
                    break;
                }
                // Re-read: the body may have changed since the corpus was loaded.
                let Some(fresh) = self.db.posts.find(source.id).await? else {
                    continue;
                };
                if already_links_to(&fresh.content, &target.slug) {
                    continue;
                }
                let (content, changed) = pattern.apply(&fresh.content, &anchor);
                if !changed {
                    continue;
                }
                self.db.posts.update_content(fresh.id, &content).await?;
                used.insert(fresh.id);
                info!(
                    subsystem = "seo",
                    component = "interlinker",
                    op = "link_inbound",
                    post_id = fresh.id,
                    target_id = target.id,
                    keyword = %scored.keyword,
                    "Inbound link created"
                );
                links.push(InboundLink {
                    source_id: fresh.id,
                    keyword: scored.keyword.clone(),
                });
            }
        }
        Ok(links)
    }

    /// Pillar targets followed by posts carrying `secondary_keywords`.
    pub async fn outbound_targets(&self) -> Result<Vec<LinkTarget>> {
        let pillars: Vec<LinkTarget> = self
            .db
            .pillars
            .list()
            .await?
            .iter()
            .map(LinkTarget::from_pillar)
            .collect();

        let mut others = Vec::new();
        for (post_id, keywords) in self.db.meta.list_by_key(meta::SECONDARY_KEYWORDS).await? {
            if let Some(post) = self.db.posts.find(post_id).await? {
                if post.status == PostStatus::Publish {
                    others.push(LinkTarget::from_post_keywords(&post, &keywords));
                }
            }
        }
        Ok(merge_targets(pillars, others))
    }

    /// Link `post` to the pillars and keyword targets it mentions.
    pub async fn outbound_pass(&self, post: &Post) -> Result<Vec<AppliedLink>> {
        let targets = self.outbound_targets().await?;
        let Some(fresh) = self.db.posts.find(post.id).await? else {
            return Ok(Vec::new());
        };

        let mut backlinks = HashMap::new();
        for target in targets.iter().filter(|t| !t.is_pillar && t.post_id != post.id) {
            let count = self.db.posts.count_containing(&target.slug).await?;
            backlinks.insert(target.post_id, count);
        }

        let result = link_outbound(post.id, &fresh.content, &targets, &backlinks, &self.base_url);
        if result.changed() {
            self.db.posts.update_content(post.id, &result.content).await?;
            for link in &result.links {
                info!(
                    subsystem = "seo",
                    component = "interlinker",
                    op = "link_outbound",
                    post_id = post.id,
                    target_id = link.target_id,
                    keyword = %link.keyword,
                    "Outbound link created"
                );
            }
        } else {
            debug!(
                subsystem = "seo",
                component = "interlinker",
                post_id = post.id,
                targets = targets.len(),
                "No outbound match"
            );
        }
        Ok(result.links)
    }

    /// Suggestions for the given mode, without writing anything.
    pub async fn preview(&self, mode: PreviewMode) -> Result<Vec<LinkSuggestion>> {
        match mode {
            PreviewMode::Pillar => {
                let pillars = self.db.pillars.list().await?;
                if pillars.is_empty() {
                    return Ok(Vec::new());
                }
                let mut posts = Vec::new();
                for post_type in [PostType::Post, PostType::Page, PostType::WebStory] {
                    posts.extend(self.db.posts.list_published(post_type).await?);
                }
                Ok(preview_pillar_links(&posts, &pillars))
            }
            PreviewMode::Ai => {
                let posts = self.db.posts.list_published(PostType::Post).await?;
                Ok(preview_title_links(&posts))
            }
        }
    }

    /// Apply suggestions one by one, re-checking each source before writing.
    pub async fn apply_suggestions(&self, suggestions: &[LinkSuggestion]) -> Result<ApplyReport> {
        let mut report = ApplyReport::default();

        for suggestion in suggestions {
            let source = self.db.posts.find(suggestion.source_id).await?;
            let target = self.db.posts.find(suggestion.target_id).await?;
            let (Some(source), Some(target)) = (source, target) else {
                report.skipped += 1;
                continue;
            };
            if target.status == PostStatus::Trash || already_links_to(&source.content, &target.slug) {
                report.skipped += 1;
                continue;
            }

            let Ok(pattern) = KeywordPattern::new(&suggestion.keyword) else {
                report.skipped += 1;
                continue;
            };
            let anchor = AnchorTarget::new(&self.base_url, &target.slug, &target.title);
            let (content, changed) = pattern.apply(&source.content, &anchor);
            if changed {
                self.db.posts.update_content(source.id, &content).await?;
                report.applied += 1;
            } else {
                report.skipped += 1;
            }
        }

        info!(
            subsystem = "seo",
            component = "interlinker",
            op = "apply_suggestions",
            applied = report.applied,
            skipped = report.skipped,
            "Suggestions applied"
        );
        Ok(report)
    }
}
