//! SEO metadata synthesizer.
//!
//! Cleans a post body, asks the generation backend for SEO metadata and
//! stores the result as post metadata followed by the processed marker.
//! A provider failure leaves the post unmarked (still pending) and bumps
//! its `_seo_attempts` counter.

use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

use vitrine_core::defaults::{
    SEO_DESCRIPTION_BUDGET, SEO_MIN_CONTENT_CHARS, SEO_SKIPPED_SENTINEL, SEO_TITLE_BUDGET,
};
use vitrine_core::keys::meta;
use vitrine_core::text::{collapse_whitespace, strip_tags, truncate_chars};
use vitrine_core::{marker_value, Error, GenerationBackend, Post, PostMetaRepository, Result};
use vitrine_db::Database;

/// System instruction for the combined JSON request.
pub const SEO_SYSTEM_PROMPT: &str = "Você é um Especialista em SEO. Retorne apenas JSON válido.";

/// How metadata is requested from the backend.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisMode {
    /// One request returning a JSON object with every field.
    #[default]
    Combined,
    /// One request for the description and one for the title.
    PerField,
}

impl std::fmt::Display for SynthesisMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Combined => write!(f, "combined"),
            Self::PerField => write!(f, "per_field"),
        }
    }
}

impl std::str::FromStr for SynthesisMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "combined" => Ok(Self::Combined),
            "per_field" | "per-field" | "perfield" => Ok(Self::PerField),
            other => Err(Error::InvalidInput(format!("unknown synthesis mode: {}", other))),
        }
    }
}

/// Generated SEO metadata for one post.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeoFields {
    pub title: String,
    pub description: String,
    pub focus_keyword: String,
    pub tags: String,
    pub secondary_keywords: String,
}

impl SeoFields {
    /// Non-empty fields as `(meta_key, value)` pairs.
    pub fn meta_entries(&self) -> Vec<(&'static str, &str)> {
        [
            (meta::SEO_TITLE, self.title.as_str()),
            (meta::SEO_DESCRIPTION, self.description.as_str()),
            (meta::FOCUS_KEYWORD, self.focus_keyword.as_str()),
            (meta::AI_TAGS, self.tags.as_str()),
            (meta::SECONDARY_KEYWORDS, self.secondary_keywords.as_str()),
        ]
        .into_iter()
        .filter(|(_, v)| !v.is_empty())
        .collect()
    }
}

/// Result of synthesizing one post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum SynthesisOutcome {
    Generated(SeoFields),
    /// Body too short; sentinel stored without a generation call.
    Skipped,
}

/// Strip tags and control characters, collapse whitespace and keep the
/// first `budget` characters.
pub fn clean_content(html: &str, budget: usize) -> String {
    let text: String = strip_tags(html)
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    let text = collapse_whitespace(&text);
    truncate_chars(&text, budget).trim_end().to_string()
}

/// Remove double quotes and line breaks from a generated field and trim it.
pub fn clean_field(raw: &str) -> String {
    raw.replace(|c: char| c == '"' || c == '\n' || c == '\r', "")
        .trim()
        .to_string()
}

/// Drop Markdown code fences around a JSON reply.
pub fn strip_code_fences(reply: &str) -> String {
    reply.replace("```json", "").replace("```", "").trim().to_string()
}

fn text_field(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> String {
    keys.iter()
        .filter_map(|k| obj.get(*k))
        .find_map(|v| match v {
            Value::String(s) => Some(s.clone()),
            Value::Array(items) => Some(
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", "),
            ),
            _ => None,
        })
        .map(|s| clean_field(&s))
        .unwrap_or_default()
}

/// Decode a combined reply. `None` when it is not a JSON object or holds
/// neither a title nor a description.
pub fn parse_combined(reply: &str) -> Option<SeoFields> {
    let cleaned = strip_code_fences(reply);
    let start = cleaned.find('{')?;
    let end = cleaned.rfind('}')?;
    if end < start {
        return None;
    }
    let value: Value = serde_json::from_str(&cleaned[start..=end]).ok()?;
    let obj = value.as_object()?;

    let fields = SeoFields {
        title: text_field(obj, &["seo_title", "title"]),
        description: text_field(obj, &["seo_description", "seo_desc", "description"]),
        focus_keyword: text_field(obj, &["focus_keyword", "keyword"]),
        tags: text_field(obj, &["tags"]),
        secondary_keywords: text_field(obj, &["secondary_keywords", "auto_link_keywords"]),
    };
    if fields.title.is_empty() && fields.description.is_empty() {
        return None;
    }
    Some(fields)
}

/// Prompt asking for every field as one JSON object.
pub fn combined_prompt(content: &str) -> String {
    format!(
        "Analise este conteúdo e gere metadados SEO em Português do Brasil. \
         Retorne SOMENTE JSON válido com esta estrutura:\n\
         {{\n  \"seo_title\": \"Título chamativo com menos de 60 caracteres\",\n  \
         \"seo_description\": \"Descrição persuasiva com menos de 160 caracteres\",\n  \
         \"focus_keyword\": \"Frase-chave principal\",\n  \
         \"tags\": \"5 tags separadas por vírgula\",\n  \
         \"secondary_keywords\": \"3 palavras-chave secundárias para linkagem interna (separadas por vírgula)\"\n}}\n\n\
         Conteúdo: {}",
        content
    )
}

pub fn description_prompt(content: &str) -> String {
    format!(
        "Summarize the following text into a compelling SEO Meta Description (max 155 characters). Language: Portuguese. Text: {}",
        content
    )
}

pub fn title_prompt(content: &str) -> String {
    format!(
        "Create a catchy, click-worthy SEO Title (max 60 chars) for this text. Language: Portuguese. Text: {}",
        content
    )
}

/// Generates and stores SEO metadata for posts.
#[derive(Clone)]
pub struct SeoSynthesizer {
    db: Database,
    backend: Arc<dyn GenerationBackend>,
    mode: SynthesisMode,
}

impl SeoSynthesizer {
    pub fn new(db: Database, backend: Arc<dyn GenerationBackend>) -> Self {
        Self {
            db,
            backend,
            mode: SynthesisMode::default(),
        }
    }

    pub fn with_mode(mut self, mode: SynthesisMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn mode(&self) -> SynthesisMode {
        self.mode
    }

    /// Synthesize and persist metadata for one post.
    ///
    /// On a generation failure the attempt counter is incremented, nothing
    /// else is written and the error is returned.
    pub async fn synthesize(&self, post: &Post) -> Result<SynthesisOutcome> {
        let start = Instant::now();
        let content = clean_content(&post.content, SEO_DESCRIPTION_BUDGET);

        if content.chars().count() < SEO_MIN_CONTENT_CHARS {
            let marker = marker_value(Utc::now());
            self.db
                .meta
                .set_many(
                    post.id,
                    &[
                        (meta::SEO_DESCRIPTION, SEO_SKIPPED_SENTINEL),
                        (meta::SEO_DONE, marker.as_str()),
                    ],
                )
                .await?;
            debug!(
                subsystem = "seo",
                component = "synthesizer",
                post_id = post.id,
                "Content too short, marked as skipped"
            );
            return Ok(SynthesisOutcome::Skipped);
        }

        let fields = match self.generate(&content).await {
            Ok(fields) => fields,
            Err(e) => {
                let attempts = self.record_failure(post.id).await?;
                warn!(
                    subsystem = "seo",
                    component = "synthesizer",
                    op = "synthesize",
                    post_id = post.id,
                    attempts,
                    error = %e,
                    "Synthesis failed, post stays pending"
                );
                return Err(e);
            }
        };

        let marker = marker_value(Utc::now());
        let mut entries = fields.meta_entries();
        entries.push((meta::SEO_DONE, marker.as_str()));
        self.db.meta.set_many(post.id, &entries).await?;

        info!(
            subsystem = "seo",
            component = "synthesizer",
            op = "synthesize",
            post_id = post.id,
            mode = %self.mode,
            duration_ms = start.elapsed().as_millis() as u64,
            "SEO metadata stored"
        );
        Ok(SynthesisOutcome::Generated(fields))
    }

    async fn generate(&self, content: &str) -> Result<SeoFields> {
        if self.mode == SynthesisMode::Combined {
            let reply = self
                .backend
                .generate_with_system(SEO_SYSTEM_PROMPT, &combined_prompt(content))
                .await?;
            if let Some(fields) = parse_combined(&reply) {
                return Ok(fields);
            }
            debug!(
                subsystem = "seo",
                component = "synthesizer",
                reply_len = reply.len(),
                "Combined reply did not decode, falling back to per-field"
            );
        }
        self.generate_per_field(content).await
    }

    async fn generate_per_field(&self, content: &str) -> Result<SeoFields> {
        let description = clean_field(
            &self
                .backend
                .generate(&description_prompt(truncate_chars(content, SEO_DESCRIPTION_BUDGET)))
                .await?,
        );
        if description.is_empty() {
            return Err(Error::Inference("empty description".to_string()));
        }
        let title = clean_field(
            &self
                .backend
                .generate(&title_prompt(truncate_chars(content, SEO_TITLE_BUDGET)))
                .await?,
        );

        Ok(SeoFields {
            title,
            description,
            ..Default::default()
        })
    }

    async fn record_failure(&self, post_id: i64) -> Result<i64> {
        let attempts = self
            .db
            .meta
            .get(post_id, meta::SEO_ATTEMPTS)
            .await?
            .and_then(|v| v.trim().parse::<i64>().ok())
            .unwrap_or(0)
            + 1;
        self.db
            .meta
            .set(post_id, meta::SEO_ATTEMPTS, &attempts.to_string())
            .await?;
        Ok(attempts)
    }
}
