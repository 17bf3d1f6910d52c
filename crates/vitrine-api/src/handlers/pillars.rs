//! `/vitrine/v1/pillars` handlers.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use vitrine_core::defaults::PILLAR_LIMIT;
use vitrine_core::text::split_keywords;
use vitrine_core::{PillarRepository, PillarSave};
use vitrine_seo::expand_pillar;

use crate::error::ApiError;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SavePillarBody {
    pub post_id: i64,
    #[serde(default)]
    pub keywords: String,
}

#[derive(Debug, Deserialize)]
pub struct ExpandPillarBody {
    pub post_id: i64,
}

pub async fn list_pillars(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let pillars = state.db.pillars.list().await?;
    Ok(Json(json!({
        "count": pillars.len(),
        "limit": PILLAR_LIMIT,
        "pillars": pillars,
    })))
}

pub async fn get_pillar(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let pillar = state
        .db
        .pillars
        .get(post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("post {} is not a pillar", post_id)))?;
    Ok(Json(pillar))
}

/// Create or update a pillar. Creating past the limit is a conflict.
pub async fn save_pillar(
    State(state): State<AppState>,
    Json(body): Json<SavePillarBody>,
) -> Result<impl IntoResponse, ApiError> {
    let keywords = split_keywords(&body.keywords).join(", ");
    if keywords.is_empty() {
        return Err(ApiError::BadRequest("keywords are required".to_string()));
    }

    let outcome = state.db.pillars.save(body.post_id, &keywords).await?;
    let pillar = state
        .db
        .pillars
        .get(body.post_id)
        .await?
        .ok_or_else(|| ApiError::not_found(format!("post {} is not a pillar", body.post_id)))?;

    info!(
        subsystem = "api",
        component = "pillars",
        post_id = body.post_id,
        outcome = ?outcome,
        "Pillar saved"
    );
    let status = match outcome {
        PillarSave::Created => StatusCode::CREATED,
        PillarSave::Updated => StatusCode::OK,
    };
    Ok((status, Json(json!({ "action": outcome, "pillar": pillar }))))
}

pub async fn delete_pillar(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    if !state.db.pillars.remove(post_id).await? {
        return Err(ApiError::not_found(format!("post {} is not a pillar", post_id)));
    }
    info!(subsystem = "api", component = "pillars", post_id, "Pillar removed");
    Ok(Json(json!({ "deleted": true, "post_id": post_id })))
}

/// Ask the generation backend for keyword variations and merge them in.
pub async fn expand(
    State(state): State<AppState>,
    Json(body): Json<ExpandPillarBody>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.pillars.get(body.post_id).await?.is_none() {
        return Err(ApiError::not_found(format!("post {} is not a pillar", body.post_id)));
    }
    let backend = state.generation_backend().await?;
    let pillar = expand_pillar(&state.db, backend.as_ref(), body.post_id).await?;
    Ok(Json(pillar))
}
