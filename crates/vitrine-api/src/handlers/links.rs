//! `/vitrine/v1/links` handlers: preview, apply and the backlink map.

use axum::extract::{Query, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use vitrine_core::defaults::PREVIEW_LIMIT;
use vitrine_seo::{backlink_map, LinkSuggestion, PreviewMode};

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub mode: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyBody {
    #[serde(default)]
    pub suggestions: Vec<LinkSuggestion>,
}

pub async fn preview(
    State(state): State<AppState>,
    Query(query): Query<PreviewQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mode: PreviewMode = match query.mode.as_deref() {
        Some(raw) if !raw.trim().is_empty() => raw.parse()?,
        _ => PreviewMode::default(),
    };

    let mut suggestions = state.linker().preview(mode).await?;
    suggestions.truncate(PREVIEW_LIMIT);
    Ok(Json(json!({
        "mode": mode,
        "count": suggestions.len(),
        "suggestions": suggestions,
    })))
}

pub async fn apply(
    State(state): State<AppState>,
    Json(body): Json<ApplyBody>,
) -> Result<impl IntoResponse, ApiError> {
    if body.suggestions.is_empty() {
        return Err(ApiError::BadRequest("no suggestions given".to_string()));
    }
    let report = state.linker().apply_suggestions(&body.suggestions).await?;
    info!(
        subsystem = "api",
        component = "links",
        applied = report.applied,
        skipped = report.skipped,
        "Link suggestions applied"
    );
    Ok(Json(report))
}

pub async fn map(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(backlink_map(&state.db, &state.config.base_url).await?))
}
