//! Ordered provider fallback.
//!
//! A [`FallbackChain`] tries each configured provider in turn and returns
//! the first non-empty reply. When every provider fails the returned error
//! names each attempted provider with its failure reason.

use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use vitrine_core::{Error, GenerationBackend, Result};

use crate::error::reason;
use crate::gemini::{GeminiBackend, GeminiConfig};
use crate::openai::{OpenAIBackend, OpenAIConfig};
use crate::provider::{ProviderConfig, ProviderKind, ProviderSettings};

/// Message used when no provider could be attempted.
const NO_PROVIDER: &str = "no provider configured";

/// Generation backend that falls through an ordered list of providers.
#[derive(Clone, Default)]
pub struct FallbackChain {
    providers: Vec<(String, Arc<dyn GenerationBackend>)>,
}

impl FallbackChain {
    /// Empty chain; every call fails until a backend is added.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a backend under the given provider name.
    pub fn with_backend(mut self, name: impl Into<String>, backend: Arc<dyn GenerationBackend>) -> Self {
        self.providers.push((name.into(), backend));
        self
    }

    /// Build a chain from provider configs, skipping providers that need a
    /// key and have none.
    pub fn from_configs(configs: Vec<ProviderConfig>) -> Result<Self> {
        let mut chain = Self::new();
        for config in configs {
            if !config.is_usable() {
                debug!(
                    subsystem = "inference",
                    component = "fallback_chain",
                    provider = %config.id,
                    "Skipping provider without API key"
                );
                continue;
            }
            let backend = build_backend(&config)?;
            chain.providers.push((config.id, backend));
        }
        Ok(chain)
    }

    /// Chain for the stored provider settings in default order.
    pub fn from_settings(settings: &ProviderSettings) -> Result<Self> {
        Self::from_configs(settings.provider_configs())
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Provider names in the order they are tried.
    pub fn provider_names(&self) -> Vec<&str> {
        self.providers.iter().map(|(name, _)| name.as_str()).collect()
    }
}

fn build_backend(config: &ProviderConfig) -> Result<Arc<dyn GenerationBackend>> {
    let timeout_seconds = config.timeout.as_secs().max(1);
    let backend: Arc<dyn GenerationBackend> = match config.kind {
        ProviderKind::OpenAICompatible => Arc::new(OpenAIBackend::new(OpenAIConfig {
            base_url: config.base_url.clone(),
            api_key: config.key().map(str::to_string),
            gen_model: config.model.clone(),
            timeout_seconds,
            ..Default::default()
        })?),
        ProviderKind::Gemini => {
            let key = config
                .key()
                .ok_or_else(|| Error::Config(format!("{} requires an API key", config.id)))?;
            let mut gemini = GeminiConfig::new(key);
            gemini.base_url = config.base_url.clone();
            gemini.model = config.model.clone();
            gemini.timeout_seconds = timeout_seconds;
            Arc::new(GeminiBackend::new(gemini)?)
        }
    };
    Ok(backend)
}

#[async_trait]
impl GenerationBackend for FallbackChain {
    async fn generate(&self, prompt: &str) -> Result<String> {
        self.generate_with_system("", prompt).await
    }

    async fn generate_with_system(&self, system: &str, prompt: &str) -> Result<String> {
        let start = Instant::now();
        let mut failures = Vec::new();

        for (name, backend) in &self.providers {
            match backend.generate_with_system(system, prompt).await {
                Ok(text) if !text.trim().is_empty() => {
                    info!(
                        subsystem = "inference",
                        component = "fallback_chain",
                        op = "generate",
                        provider = %name,
                        failed_before = failures.len(),
                        duration_ms = start.elapsed().as_millis() as u64,
                        "Provider succeeded"
                    );
                    return Ok(text.trim().to_string());
                }
                Ok(_) => {
                    warn!(
                        subsystem = "inference",
                        component = "fallback_chain",
                        provider = %name,
                        "Provider returned an empty reply"
                    );
                    failures.push(format!("{}: empty reply", name));
                }
                Err(e) => {
                    let why = reason(&e);
                    warn!(
                        subsystem = "inference",
                        component = "fallback_chain",
                        provider = %name,
                        error = %why,
                        "Provider failed, trying next"
                    );
                    failures.push(format!("{}: {}", name, why));
                }
            }
        }

        let detail = if failures.is_empty() {
            NO_PROVIDER.to_string()
        } else {
            failures.join(" | ")
        };
        Err(Error::Inference(format!("all providers failed: {}", detail)))
    }

    fn model_name(&self) -> &str {
        self.providers
            .first()
            .map(|(_, backend)| backend.model_name())
            .unwrap_or("none")
    }
}
