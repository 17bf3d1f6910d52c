//! Safe keyword matching and anchor insertion.
//!
//! A keyword matches only when:
//! - it is bounded on both sides by whitespace, one of `. , ; ! ? ( )`, or
//!   the start/end of the body;
//! - it does not sit inside an HTML tag, i.e. the first `<` or `>` after the
//!   match is not a `>`;
//! - letters compare case-insensitively with Unicode case folding.
//!
//! [`apply_first_match`] is pure: it rewrites the first safe occurrence and
//! leaves every other byte of the body untouched.

use std::ops::Range;

use regex::{Regex, RegexBuilder};

use vitrine_core::text::escape_html;
use vitrine_core::{Error, Result};

/// Punctuation accepted as a keyword boundary besides whitespace.
const BOUNDARY_PUNCTUATION: &[char] = &['.', ',', ';', '!', '?', '(', ')'];

fn is_boundary(c: Option<char>) -> bool {
    match c {
        None => true,
        Some(c) => c.is_whitespace() || BOUNDARY_PUNCTUATION.contains(&c),
    }
}

/// Whether `pos` lies inside an HTML tag: scanning forward, a `>` shows up
/// before any `<`.
fn inside_tag(body: &str, pos: usize) -> bool {
    body[pos..]
        .find(|c: char| c == '<' || c == '>')
        .map(|i| body[pos + i..].starts_with('>'))
        .unwrap_or(false)
}

/// Compiled matcher for one keyword.
#[derive(Debug, Clone)]
pub struct KeywordPattern {
    keyword: String,
    regex: Regex,
}

impl KeywordPattern {
    /// Compile a matcher. Fails with `InvalidInput` for a blank keyword.
    pub fn new(keyword: &str) -> Result<Self> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(Error::InvalidInput("keyword must not be empty".to_string()));
        }
        let regex = RegexBuilder::new(&regex::escape(keyword))
            .case_insensitive(true)
            .build()
            .map_err(|e| Error::InvalidInput(format!("keyword pattern: {}", e)))?;
        Ok(Self {
            keyword: keyword.to_string(),
            regex,
        })
    }

    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Byte range of the first safe occurrence in `body`.
    pub fn find(&self, body: &str) -> Option<Range<usize>> {
        let mut start = 0;
        while start <= body.len() {
            let m = self.regex.find_at(body, start)?;
            let before = body[..m.start()].chars().next_back();
            let after = body[m.end()..].chars().next();

            if is_boundary(before) && is_boundary(after) && !inside_tag(body, m.end()) {
                return Some(m.range());
            }

            // Retry one character after the rejected match start.
            let step = body[m.start()..].chars().next().map_or(1, char::len_utf8);
            start = m.start() + step;
        }
        None
    }

    /// Whether `body` has a safe occurrence.
    pub fn is_match(&self, body: &str) -> bool {
        self.find(body).is_some()
    }

    /// Replace the first safe occurrence with an anchor to `target`.
    ///
    /// Returns the new body and whether anything changed.
    pub fn apply(&self, body: &str, target: &AnchorTarget) -> (String, bool) {
        match self.find(body) {
            Some(range) => {
                let mut out = String::with_capacity(body.len() + 64);
                out.push_str(&body[..range.start]);
                out.push_str(&target.render(&body[range.clone()]));
                out.push_str(&body[range.end..]);
                (out, true)
            }
            None => (body.to_string(), false),
        }
    }
}

/// Where an inserted anchor points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnchorTarget {
    pub base_url: String,
    pub slug: String,
    pub title: String,
}

impl AnchorTarget {
    pub fn new(base_url: impl Into<String>, slug: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            slug: slug.into(),
            title: title.into(),
        }
    }

    /// Public URL of the target post.
    pub fn href(&self) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), self.slug)
    }

    /// `<a href="…" title="…">text</a>`, with the title escaped and the
    /// matched text kept verbatim.
    pub fn render(&self, text: &str) -> String {
        format!(
            "<a href=\"{}\" title=\"{}\">{}</a>",
            self.href(),
            escape_html(&self.title),
            text
        )
    }
}

/// Replace the first safe occurrence of `keyword` in `body` with an anchor.
pub fn apply_first_match(body: &str, keyword: &str, target: &AnchorTarget) -> Result<(String, bool)> {
    Ok(KeywordPattern::new(keyword)?.apply(body, target))
}

/// Whether `body` already references `slug` anywhere.
///
/// A substring test: any occurrence counts as an existing link.
pub fn already_links_to(body: &str, slug: &str) -> bool {
    !slug.is_empty() && body.contains(slug)
}
