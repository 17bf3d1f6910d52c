//! AI keyword expansion for pillar posts.

use std::collections::HashSet;

use tracing::info;

use vitrine_core::defaults::KEYWORD_EXPANSION_COUNT;
use vitrine_core::text::split_keywords;
use vitrine_core::{Error, GenerationBackend, PillarPost, PillarRepository, Result};
use vitrine_db::Database;

pub const EXPANSION_SYSTEM_PROMPT: &str = "You are an SEO expert specialized in semantic nuances.";

/// Phrases models prepend to lists; removed from the reply.
const REPLY_NOISE: &[&str] = &["Here are", "synonyms"];

pub fn expansion_prompt(current: &str) -> String {
    format!(
        "Generate {} semantic synonyms or variations (short phrases) for these keywords: '{}'. \
         Context: SEO Internal Linking. Language: Portuguese. \
         Return ONLY comma-separated values, no explanation.",
        KEYWORD_EXPANSION_COUNT, current
    )
}

/// Remove quotes, periods and boilerplate from a reply; line breaks become
/// separators.
pub fn clean_expansion(reply: &str) -> String {
    let mut cleaned = reply
        .replace(|c: char| c == '"' || c == '.', "")
        .replace(|c: char| c == '\n' || c == '\r', ",");
    for noise in REPLY_NOISE {
        cleaned = cleaned.replace(noise, "");
    }
    cleaned.trim().to_string()
}

/// Merge keyword lists, keeping the first spelling of case-insensitive
/// duplicates, joined with `", "`.
pub fn merge_keywords(current: &str, extra: &str) -> String {
    let mut seen = HashSet::new();
    split_keywords(current)
        .into_iter()
        .chain(split_keywords(extra))
        .filter(|k| seen.insert(k.to_lowercase()))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Ask the backend for variations of `keywords` and merge them in.
pub async fn expand_keywords(backend: &dyn GenerationBackend, keywords: &str) -> Result<String> {
    if split_keywords(keywords).is_empty() {
        return Err(Error::InvalidInput("no keywords to expand".to_string()));
    }
    let reply = backend
        .generate_with_system(EXPANSION_SYSTEM_PROMPT, &expansion_prompt(keywords))
        .await?;
    let variations = clean_expansion(&reply);
    if variations.is_empty() {
        return Err(Error::Inference("empty keyword expansion".to_string()));
    }
    Ok(merge_keywords(keywords, &variations))
}

/// Expand the stored keywords of a pillar and save the merged list.
pub async fn expand_pillar(
    db: &Database,
    backend: &dyn GenerationBackend,
    post_id: i64,
) -> Result<PillarPost> {
    let pillar = db
        .pillars
        .get(post_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("pillar for post {}", post_id)))?;

    let merged = expand_keywords(backend, &pillar.keywords).await?;
    db.pillars.save(post_id, &merged).await?;

    let added = split_keywords(&merged)
        .len()
        .saturating_sub(pillar.keyword_list().len());
    info!(
        subsystem = "seo",
        component = "expansion",
        op = "expand_keywords",
        post_id,
        added,
        "Pillar keywords expanded"
    );

    db.pillars
        .get(post_id)
        .await?
        .ok_or_else(|| Error::NotFound(format!("pillar for post {}", post_id)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_expansion() {
        let reply = "Here are the synonyms: \"frete rápido\", entrega ágil.\nmotoboy express";
        assert_eq!(
            clean_expansion(reply),
            "the : frete rápido, entrega ágil,motoboy express"
        );
    }

    #[test]
    fn test_merge_dedupes_case_insensitively() {
        assert_eq!(
            merge_keywords("Entrega Expressa, motoboy", "entrega expressa, frete, Motoboy, , frete"),
            "Entrega Expressa, motoboy, frete"
        );
    }

    #[test]
    fn test_prompt_mentions_count_and_keywords() {
        let prompt = expansion_prompt("frete, motoboy");
        assert!(prompt.starts_with("Generate 15 semantic synonyms"));
        assert!(prompt.contains("'frete, motoboy'"));
    }
}
