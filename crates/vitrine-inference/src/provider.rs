//! Provider configuration for the generation fallback chain.
//!
//! Providers are read from the settings store (`ai_config`) with
//! environment fallbacks for the API keys, and tried in a fixed order:
//!
//! ```text
//! pollinations-primary → pollinations-backup → openai → gemini
//! ```

use std::collections::BTreeMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use vitrine_core::defaults::{GENERATION_MODEL, GENERATION_TIMEOUT_SECS};
use vitrine_core::keys::config;

use crate::gemini::{DEFAULT_GEMINI_MODEL, DEFAULT_GEMINI_URL};
use crate::openai::{DEFAULT_OPENAI_URL, DEFAULT_POLLINATIONS_URL};

/// Model used for the direct OpenAI provider when the configured model is
/// not an OpenAI model.
pub const OPENAI_FALLBACK_MODEL: &str = "gpt-4o";

// ---------------------------------------------------------------------------
// Provider capability enum
// ---------------------------------------------------------------------------

/// Capabilities a provider can offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderCapability {
    /// Text generation from a system instruction and a prompt.
    Generation,
    /// Usable without an API key.
    Keyless,
}

impl std::fmt::Display for ProviderCapability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Generation => write!(f, "generation"),
            Self::Keyless => write!(f, "keyless"),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider kind
// ---------------------------------------------------------------------------

/// Wire protocol spoken by a provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// `/chat/completions` with Bearer auth.
    OpenAICompatible,
    /// `models/{model}:generateContent` with a `key` query parameter.
    Gemini,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::OpenAICompatible => write!(f, "openai_compatible"),
            Self::Gemini => write!(f, "gemini"),
        }
    }
}

// ---------------------------------------------------------------------------
// Provider configuration
// ---------------------------------------------------------------------------

/// Configuration of one provider in the chain.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    /// Provider name used in logs and aggregated errors.
    pub id: String,
    pub kind: ProviderKind,
    pub base_url: String,
    /// API key; `None` or empty means absent.
    pub api_key: Option<String>,
    pub model: String,
    pub capabilities: Vec<ProviderCapability>,
    pub timeout: Duration,
}

impl ProviderConfig {
    /// Whether the provider may run without an API key.
    pub fn is_keyless(&self) -> bool {
        self.capabilities.contains(&ProviderCapability::Keyless)
    }

    /// The API key, if present and non-blank.
    pub fn key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty())
    }

    /// Whether the chain should try this provider.
    pub fn is_usable(&self) -> bool {
        self.key().is_some() || self.is_keyless()
    }
}

// ---------------------------------------------------------------------------
// Provider settings
// ---------------------------------------------------------------------------

/// Raw provider keys and model, as stored in the settings table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderSettings {
    pub pollinations_key: Option<String>,
    pub pollinations_key_2: Option<String>,
    pub openai_key: Option<String>,
    pub gemini_key: Option<String>,
    pub text_model: Option<String>,
    pub timeout_secs: Option<u64>,
}

fn non_blank(value: Option<&String>) -> Option<String> {
    value
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn env_non_blank(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl ProviderSettings {
    /// Read provider settings from a settings map.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        Self {
            pollinations_key: non_blank(map.get(config::POLLINATIONS_API_KEY)),
            pollinations_key_2: non_blank(map.get(config::POLLINATIONS_API_KEY_2)),
            openai_key: non_blank(map.get(config::OPENAI_API_KEY)),
            gemini_key: non_blank(map.get(config::GEMINI_API_KEY)),
            text_model: non_blank(map.get(config::TEXT_MODEL)),
            timeout_secs: None,
        }
    }

    /// Fill absent keys from `POLLINATIONS_API_KEY`, `POLLINATIONS_API_KEY_2`,
    /// `OPENAI_API_KEY`, `GEMINI_API_KEY` and the timeout from `AI_TIMEOUT_SECS`.
    pub fn with_env_fallback(mut self) -> Self {
        self.pollinations_key = self
            .pollinations_key
            .or_else(|| env_non_blank("POLLINATIONS_API_KEY"));
        self.pollinations_key_2 = self
            .pollinations_key_2
            .or_else(|| env_non_blank("POLLINATIONS_API_KEY_2"));
        self.openai_key = self.openai_key.or_else(|| env_non_blank("OPENAI_API_KEY"));
        self.gemini_key = self.gemini_key.or_else(|| env_non_blank("GEMINI_API_KEY"));
        self.timeout_secs = self
            .timeout_secs
            .or_else(|| env_non_blank("AI_TIMEOUT_SECS").and_then(|v| v.parse().ok()));
        self
    }

    /// Model name for the chat providers.
    pub fn model(&self) -> &str {
        self.text_model.as_deref().unwrap_or(GENERATION_MODEL)
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.unwrap_or(GENERATION_TIMEOUT_SECS))
    }

    /// The four providers in fallback order.
    pub fn provider_configs(&self) -> Vec<ProviderConfig> {
        let timeout = self.timeout();
        let model = self.model().to_string();
        let openai_model = if model.contains("gpt") {
            model.clone()
        } else {
            OPENAI_FALLBACK_MODEL.to_string()
        };

        vec![
            ProviderConfig {
                id: "pollinations-primary".to_string(),
                kind: ProviderKind::OpenAICompatible,
                base_url: DEFAULT_POLLINATIONS_URL.to_string(),
                api_key: self.pollinations_key.clone(),
                model: model.clone(),
                capabilities: vec![ProviderCapability::Generation, ProviderCapability::Keyless],
                timeout,
            },
            ProviderConfig {
                id: "pollinations-backup".to_string(),
                kind: ProviderKind::OpenAICompatible,
                base_url: DEFAULT_POLLINATIONS_URL.to_string(),
                api_key: self.pollinations_key_2.clone(),
                model,
                capabilities: vec![ProviderCapability::Generation],
                timeout,
            },
            ProviderConfig {
                id: "openai".to_string(),
                kind: ProviderKind::OpenAICompatible,
                base_url: DEFAULT_OPENAI_URL.to_string(),
                api_key: self.openai_key.clone(),
                model: openai_model,
                capabilities: vec![ProviderCapability::Generation],
                timeout,
            },
            ProviderConfig {
                id: "gemini".to_string(),
                kind: ProviderKind::Gemini,
                base_url: DEFAULT_GEMINI_URL.to_string(),
                api_key: self.gemini_key.clone(),
                model: DEFAULT_GEMINI_MODEL.to_string(),
                capabilities: vec![ProviderCapability::Generation],
                timeout,
            },
        ]
    }
}
