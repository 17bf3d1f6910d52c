//! Centralized default constants for the vitrine system.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates reference these constants instead of defining their own magic
//! numbers. Organized by domain area.

// =============================================================================
// SITE
// =============================================================================

/// Canonical public URL used when building anchor `href`s.
pub const SITE_BASE_URL: &str = "https://caasexpresss.com";

/// Site name reported by the REST index.
pub const SITE_NAME: &str = "Caas Express Blog";

/// Fixed pages that never count as post links in the backlink map.
pub const FIXED_PAGE_SLUGS: &[&str] = &["contato", "sobre-nos", "blog", "servicos", "home"];

// =============================================================================
// LINKING
// =============================================================================

/// Maximum inbound links created for one post during a single pass.
pub const INBOUND_LINKS_PER_PASS: usize = 3;

/// Random candidate sources considered per inbound keyword.
pub const INBOUND_SOURCES_PER_KEYWORD: usize = 5;

/// Maximum inbound links a non-pillar post may accumulate system-wide.
pub const BACKLINK_CAP: i64 = 5;

/// Maximum number of pillar posts.
pub const PILLAR_LIMIT: i64 = 5;

/// Score of an exact full-title keyword match.
pub const SCORE_EXACT_TITLE: u32 = 100;

/// Score of a stop-word-filtered short title match.
pub const SCORE_SHORT_TITLE: u32 = 80;

/// Maximum title-mode suggestions per source post.
pub const PREVIEW_LINKS_PER_SOURCE: usize = 3;

/// Maximum number of suggestions returned by a preview.
pub const PREVIEW_LIMIT: usize = 100;

/// Minimum character length of a short title keyword (exclusive).
pub const SHORT_TITLE_MIN_CHARS: usize = 10;

// =============================================================================
// SEO SYNTHESIS
// =============================================================================

/// Character budget for the description prompt (and the combined prompt).
pub const SEO_DESCRIPTION_BUDGET: usize = 1000;

/// Character budget for the title prompt.
pub const SEO_TITLE_BUDGET: usize = 500;

/// Posts with fewer usable characters than this are skipped.
pub const SEO_MIN_CONTENT_CHARS: usize = 10;

/// Sentinel stored as description for posts without usable content.
pub const SEO_SKIPPED_SENTINEL: &str = "skipped";

/// Number of synonyms requested when expanding pillar keywords.
pub const KEYWORD_EXPANSION_COUNT: usize = 15;

// =============================================================================
// GENERATION
// =============================================================================

/// Per-provider request timeout in seconds.
pub const GENERATION_TIMEOUT_SECS: u64 = 30;

/// Sampling temperature sent with chat requests.
pub const GENERATION_TEMPERATURE: f32 = 0.7;

/// Default model name for the chat providers.
pub const GENERATION_MODEL: &str = "openai";

/// Default system instruction when none is supplied.
pub const GENERATION_SYSTEM: &str = "You are a helpful assistant.";

/// Bytes of a failed response body kept in the error message.
pub const GENERATION_ERROR_BODY_LEN: usize = 200;

// =============================================================================
// WORKER
// =============================================================================

/// Posts synthesized per cycle when `auto_seo_batch_size` is unset.
pub const WORKER_BATCH_SIZE: i64 = 5;

/// Seconds between cycles when `auto_seo_batch_delay` is unset.
pub const WORKER_BATCH_DELAY_SECS: u64 = 60;

/// Lower bound applied to the configured cycle delay.
pub const WORKER_MIN_DELAY_SECS: u64 = 5;

/// Posts run through the link pass per cycle.
pub const WORKER_LINK_BATCH: i64 = 2;

/// Failed synthesis attempts tolerated before a post leaves the pending set.
/// Zero means unlimited.
pub const WORKER_MAX_ATTEMPTS: i64 = 0;

/// Capacity of the worker event broadcast channel.
pub const EVENT_BUS_CAPACITY: usize = 256;

// =============================================================================
// PAGINATION
// =============================================================================

/// Default page size for REST list endpoints.
pub const PAGE_LIMIT: i64 = 10;

/// Largest page size a client may request.
pub const PAGE_LIMIT_MAX: i64 = 100;

// =============================================================================
// SERVER
// =============================================================================

/// Default HTTP server port.
pub const SERVER_PORT: u16 = 3001;

/// Default SQLite database URL.
pub const DATABASE_URL: &str = "sqlite://vitrine.db?mode=rwc";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linking_caps_are_positive() {
        assert!(INBOUND_LINKS_PER_PASS > 0);
        assert!(INBOUND_SOURCES_PER_KEYWORD >= INBOUND_LINKS_PER_PASS);
        assert!(BACKLINK_CAP > 0);
    }

    #[test]
    fn test_scores_prefer_exact_title() {
        assert!(SCORE_EXACT_TITLE > SCORE_SHORT_TITLE);
    }

    #[test]
    fn test_title_budget_within_description_budget() {
        assert!(SEO_TITLE_BUDGET < SEO_DESCRIPTION_BUDGET);
    }

    #[test]
    fn test_worker_delay_floor() {
        assert!(WORKER_BATCH_DELAY_SECS >= WORKER_MIN_DELAY_SECS);
    }

    #[test]
    fn test_page_limits_ordered() {
        assert!(PAGE_LIMIT <= PAGE_LIMIT_MAX);
    }
}
