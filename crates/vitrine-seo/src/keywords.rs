//! Keyword candidates derived from post titles.

use serde::Serialize;

use vitrine_core::defaults::{SCORE_EXACT_TITLE, SCORE_SHORT_TITLE, SHORT_TITLE_MIN_CHARS};

/// Portuguese filler words dropped when shortening a title.
pub const STOP_WORDS: &[&str] = &[
    "como", "para", "onde", "pelo", "pela", "quem", "qual", "entao", "pois", "porque", "sobre",
    "apos", "antes", "guia", "dicas", "tudo", "voce", "precisa", "saber", "passo",
];

/// A keyword with its preview score.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredKeyword {
    pub keyword: String,
    pub score: u32,
}

/// Lowercased title with stop words removed.
///
/// Produced only when at least two words remain and the joined form is
/// longer than ten characters.
///
/// ```
/// use vitrine_seo::keywords::short_title;
/// assert_eq!(
///     short_title("Como Escolher Motoboy para Empresas").as_deref(),
///     Some("escolher motoboy empresas")
/// );
/// assert_eq!(short_title("Guia de Fretes"), None);
/// ```
pub fn short_title(title: &str) -> Option<String> {
    let lowered = title.to_lowercase();
    let words: Vec<&str> = lowered
        .split_whitespace()
        .filter(|w| !STOP_WORDS.contains(w))
        .collect();
    if words.len() < 2 {
        return None;
    }
    let joined = words.join(" ");
    (joined.chars().count() > SHORT_TITLE_MIN_CHARS).then_some(joined)
}

/// Inbound keywords for a target post: the exact title, then the short title.
pub fn title_keywords(title: &str) -> Vec<ScoredKeyword> {
    let title = title.trim();
    let mut keywords = Vec::with_capacity(2);
    if title.is_empty() {
        return keywords;
    }
    keywords.push(ScoredKeyword {
        keyword: title.to_string(),
        score: SCORE_EXACT_TITLE,
    });
    if let Some(short) = short_title(title) {
        if short != title.to_lowercase() {
            keywords.push(ScoredKeyword {
                keyword: short,
                score: SCORE_SHORT_TITLE,
            });
        }
    }
    keywords
}

/// Case-insensitive substring test used to prefilter candidate sources.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_title_drops_stop_words() {
        assert_eq!(
            short_title("Dicas para Entrega Expressa em Guarulhos").as_deref(),
            Some("entrega expressa em guarulhos")
        );
    }

    #[test]
    fn test_short_title_needs_two_words() {
        assert_eq!(short_title("Guia Motoboy"), None);
    }

    #[test]
    fn test_short_title_needs_more_than_ten_chars() {
        // "frete rápido" is 12 chars, "frete já" only 8
        assert!(short_title("Frete Rápido").is_some());
        assert_eq!(short_title("Guia Frete Já"), None);
    }

    #[test]
    fn test_title_keywords_order_and_scores() {
        let keywords = title_keywords("Como Contratar Motoboy em Guarulhos");
        assert_eq!(keywords.len(), 2);
        assert_eq!(keywords[0].keyword, "Como Contratar Motoboy em Guarulhos");
        assert_eq!(keywords[0].score, 100);
        assert_eq!(keywords[1].keyword, "contratar motoboy em guarulhos");
        assert_eq!(keywords[1].score, 80);
    }

    #[test]
    fn test_title_keywords_skip_redundant_short_form() {
        let keywords = title_keywords("entrega expressa guarulhos");
        assert_eq!(keywords.len(), 1);
    }

    #[test]
    fn test_title_keywords_empty_title() {
        assert!(title_keywords("   ").is_empty());
    }

    #[test]
    fn test_contains_ignore_case() {
        assert!(contains_ignore_case("Nossa ENTREGA Expressa", "entrega expressa"));
        assert!(contains_ignore_case("LOGÍSTICA", "logística"));
        assert!(!contains_ignore_case("nada", "entrega"));
    }
}
