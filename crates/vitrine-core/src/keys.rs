//! Well-known post-metadata and settings keys.

use chrono::{DateTime, Utc};

/// Post-metadata keys written by the automation and the REST surface.
pub mod meta {
    pub const SEO_TITLE: &str = "seo_title";
    pub const SEO_DESCRIPTION: &str = "seo_description";
    pub const FOCUS_KEYWORD: &str = "focus_keyword";
    /// Comma-separated keywords that make the post an outbound link target.
    pub const SECONDARY_KEYWORDS: &str = "secondary_keywords";
    pub const AI_TAGS: &str = "ai_tags";

    /// Set once synthesis finished for the post.
    pub const SEO_DONE: &str = "_ai_autopilot_done";
    /// Set once the link pass ran for the post.
    pub const LINKED: &str = "_auto_linked";
    /// Failed synthesis attempts.
    pub const SEO_ATTEMPTS: &str = "_seo_attempts";

    // Extra fields accepted by the update-meta endpoint.
    pub const LINK_INTERNAL: &str = "link_internal";
    pub const FAQ: &str = "faq";
    pub const FAQ_TITLE: &str = "faq_title";
    pub const ARTICLE_TYPE: &str = "article_type";
    pub const BLOG_POSTING: &str = "blog_posting_data";
}

/// Settings keys stored in the `ai_config` table.
pub mod config {
    pub const POLLINATIONS_API_KEY: &str = "pollinations_api_key";
    pub const POLLINATIONS_API_KEY_2: &str = "pollinations_api_key_2";
    pub const OPENAI_API_KEY: &str = "openai_api_key";
    pub const GEMINI_API_KEY: &str = "gemini_api_key";
    pub const TEXT_MODEL: &str = "text_model";

    pub const BATCH_SIZE: &str = "auto_seo_batch_size";
    pub const BATCH_DELAY: &str = "auto_seo_batch_delay";
    pub const MAX_ATTEMPTS: &str = "seo_max_attempts";
    /// `combined` or `per_field`
    pub const SYNTHESIS_MODE: &str = "seo_synthesis_mode";

    /// Keys whose values are masked when settings are listed.
    pub const SECRET_KEYS: &[&str] = &[
        POLLINATIONS_API_KEY,
        POLLINATIONS_API_KEY_2,
        OPENAI_API_KEY,
        GEMINI_API_KEY,
    ];
}

/// Value written to processing markers: `YYYY-MM-DD HH:MM:SS` in UTC.
pub fn marker_value(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_marker_value_format() {
        let at = Utc.with_ymd_and_hms(2026, 3, 9, 7, 5, 1).unwrap();
        assert_eq!(marker_value(at), "2026-03-09 07:05:01");
    }

    #[test]
    fn test_markers_are_private_keys() {
        assert!(meta::SEO_DONE.starts_with('_'));
        assert!(meta::LINKED.starts_with('_'));
        assert!(meta::SEO_ATTEMPTS.starts_with('_'));
    }

    #[test]
    fn test_secret_keys_cover_provider_keys() {
        assert!(config::SECRET_KEYS.contains(&config::OPENAI_API_KEY));
        assert!(!config::SECRET_KEYS.contains(&config::TEXT_MODEL));
    }
}
