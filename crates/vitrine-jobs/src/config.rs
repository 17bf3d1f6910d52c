//! Per-cycle configuration read from the settings store.

use std::collections::BTreeMap;
use std::time::Duration;

use serde::Serialize;
use tracing::warn;

use vitrine_core::defaults::{
    WORKER_BATCH_DELAY_SECS, WORKER_BATCH_SIZE, WORKER_MAX_ATTEMPTS, WORKER_MIN_DELAY_SECS,
};
use vitrine_core::keys::config;
use vitrine_core::{Result, SettingsRepository};
use vitrine_db::Database;
use vitrine_inference::ProviderSettings;
use vitrine_seo::SynthesisMode;

/// Tunables for one worker cycle. Loaded fresh at the start of every cycle.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CycleConfig {
    pub batch_size: i64,
    pub delay_secs: u64,
    /// Zero means unlimited.
    pub max_attempts: i64,
    pub mode: SynthesisMode,
    #[serde(skip)]
    pub providers: ProviderSettings,
}

impl Default for CycleConfig {
    fn default() -> Self {
        Self {
            batch_size: WORKER_BATCH_SIZE,
            delay_secs: WORKER_BATCH_DELAY_SECS,
            max_attempts: WORKER_MAX_ATTEMPTS,
            mode: SynthesisMode::default(),
            providers: ProviderSettings::default(),
        }
    }
}

fn parse_setting<T: std::str::FromStr>(map: &BTreeMap<String, String>, key: &str) -> Option<T> {
    let raw = map.get(key)?.trim();
    if raw.is_empty() {
        return None;
    }
    match raw.parse() {
        Ok(value) => Some(value),
        Err(_) => {
            warn!(
                subsystem = "jobs",
                component = "config",
                key,
                value = raw,
                "Ignoring unparseable setting"
            );
            None
        }
    }
}

impl CycleConfig {
    /// Build from a settings map. Missing or invalid values fall back to
    /// defaults; the delay is floored at five seconds.
    pub fn from_map(map: &BTreeMap<String, String>) -> Self {
        let batch_size = parse_setting::<i64>(map, config::BATCH_SIZE)
            .filter(|n| *n > 0)
            .unwrap_or(WORKER_BATCH_SIZE);
        let delay_secs = parse_setting::<u64>(map, config::BATCH_DELAY)
            .unwrap_or(WORKER_BATCH_DELAY_SECS)
            .max(WORKER_MIN_DELAY_SECS);
        let max_attempts = parse_setting::<i64>(map, config::MAX_ATTEMPTS)
            .filter(|n| *n >= 0)
            .unwrap_or(WORKER_MAX_ATTEMPTS);
        let mode = parse_setting::<SynthesisMode>(map, config::SYNTHESIS_MODE).unwrap_or_default();

        Self {
            batch_size,
            delay_secs,
            max_attempts,
            mode,
            providers: ProviderSettings::from_map(map),
        }
    }

    /// Read the settings table, with environment fallbacks for provider keys.
    pub async fn load(db: &Database) -> Result<Self> {
        let map = db.settings.all().await?;
        let mut cfg = Self::from_map(&map);
        cfg.providers = cfg.providers.with_env_fallback();
        Ok(cfg)
    }

    /// Like [`CycleConfig::load`], falling back to the defaults (plus
    /// provider keys from the environment) when the settings store fails.
    pub async fn load_or_default(db: &Database) -> Self {
        match Self::load(db).await {
            Ok(cfg) => cfg,
            Err(e) => {
                warn!(
                    subsystem = "jobs",
                    component = "config",
                    error = %e,
                    "Failed to load cycle config, using defaults"
                );
                let mut cfg = Self::default();
                cfg.providers = cfg.providers.with_env_fallback();
                cfg
            }
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_secs(self.delay_secs)
    }
}
