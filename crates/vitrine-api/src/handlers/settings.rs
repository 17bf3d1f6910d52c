//! `/vitrine/v1/settings`: worker tunables and provider keys.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::{json, Value};
use tracing::info;

use vitrine_core::keys::config;
use vitrine_core::SettingsRepository;
use vitrine_jobs::CycleConfig;
use vitrine_seo::SynthesisMode;

use super::meta_value;
use crate::error::ApiError;
use crate::state::AppState;

/// Keys accepted by `POST /settings`.
pub const KNOWN_KEYS: &[&str] = &[
    config::POLLINATIONS_API_KEY,
    config::POLLINATIONS_API_KEY_2,
    config::OPENAI_API_KEY,
    config::GEMINI_API_KEY,
    config::TEXT_MODEL,
    config::BATCH_SIZE,
    config::BATCH_DELAY,
    config::MAX_ATTEMPTS,
    config::SYNTHESIS_MODE,
];

const MASK: &str = "****";

fn is_secret(key: &str) -> bool {
    config::SECRET_KEYS.contains(&key)
}

/// Hide all but the last four characters of a secret.
pub fn mask_secret(value: &str) -> String {
    let count = value.chars().count();
    if count == 0 {
        return String::new();
    }
    if count <= 8 {
        return MASK.to_string();
    }
    let tail: String = value.chars().skip(count - 4).collect();
    format!("{}{}", MASK, tail)
}

fn validate(key: &str, value: &str) -> Result<(), ApiError> {
    let invalid = |why: &str| ApiError::BadRequest(format!("{}: {}", key, why));
    match key {
        config::BATCH_SIZE => match value.parse::<i64>() {
            Ok(n) if n > 0 => Ok(()),
            _ => Err(invalid("expected a positive integer")),
        },
        config::BATCH_DELAY | config::MAX_ATTEMPTS => match value.parse::<i64>() {
            Ok(n) if n >= 0 => Ok(()),
            _ => Err(invalid("expected a non-negative integer")),
        },
        config::SYNTHESIS_MODE => value.parse::<SynthesisMode>().map(|_| ()).map_err(ApiError::from),
        _ => Ok(()),
    }
}

async fn render(state: &AppState) -> Result<Value, ApiError> {
    let stored = state.db.settings.all().await?;
    let effective = CycleConfig::from_map(&stored);
    let masked: BTreeMap<String, String> = stored
        .into_iter()
        .map(|(k, v)| {
            let v = if is_secret(&k) { mask_secret(&v) } else { v };
            (k, v)
        })
        .collect();

    Ok(json!({
        "settings": masked,
        "effective": effective,
    }))
}

pub async fn get_settings(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(render(&state).await?))
}

/// Store the given keys. Masked secrets sent back unchanged are ignored.
pub async fn update_settings(
    State(state): State<AppState>,
    Json(body): Json<BTreeMap<String, Value>>,
) -> Result<impl IntoResponse, ApiError> {
    let mut entries = Vec::new();
    for (key, value) in &body {
        if !KNOWN_KEYS.contains(&key.as_str()) {
            return Err(ApiError::BadRequest(format!("unknown setting: {}", key)));
        }
        let value = meta_value(value).trim().to_string();
        if is_secret(key) && value.starts_with(MASK) {
            continue;
        }
        if !value.is_empty() {
            validate(key, &value)?;
        }
        entries.push((key.clone(), value));
    }

    state.db.settings.set_many(&entries).await?;
    info!(
        subsystem = "api",
        component = "settings",
        keys = ?entries.iter().map(|(k, _)| k.as_str()).collect::<Vec<_>>(),
        "Settings updated"
    );
    Ok(Json(render(&state).await?))
}
