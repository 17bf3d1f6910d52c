//! # vitrine-seo
//!
//! Keyword matching, internal linking and SEO metadata synthesis.
//!
//! This crate provides:
//! - [`KeywordPattern`]: boundary-aware, tag-safe keyword matching and the
//!   single-occurrence anchor rewrite
//! - The candidate engine: outbound targets, backlink caps and link previews
//! - [`Interlinker`]: inbound and outbound passes persisted to the store
//! - [`SeoSynthesizer`]: title, description, focus keyword and tags from a
//!   [`GenerationBackend`]
//! - Pillar keyword expansion, duplicate-title repair and the backlink map

pub mod backlinks;
pub mod duplicates;
pub mod engine;
pub mod expansion;
pub mod interlink;
pub mod keywords;
pub mod matcher;
pub mod synthesizer;

// Re-export core types
pub use vitrine_core::*;

pub use backlinks::{backlink_map, build_backlink_map, BacklinkEntry, BacklinkMap, PostRef};
pub use duplicates::{
    find_duplicates, fix_duplicates, group_duplicates, DuplicateEntry, DuplicateGroup, TitleFix,
    TITLE_SUFFIXES,
};
pub use engine::{
    link_outbound, preview_pillar_links, preview_title_links, AppliedLink, LinkSuggestion,
    LinkTarget, OutboundResult, PreviewMode,
};
pub use expansion::{expand_keywords, expand_pillar};
pub use interlink::{ApplyReport, InboundLink, Interlinker, LinkReport};
pub use keywords::{short_title, title_keywords, ScoredKeyword};
pub use matcher::{already_links_to, apply_first_match, AnchorTarget, KeywordPattern};
pub use synthesizer::{SeoFields, SeoSynthesizer, SynthesisMode, SynthesisOutcome};
