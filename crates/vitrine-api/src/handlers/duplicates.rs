//! `/vitrine/v1/duplicates` handlers.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde_json::json;

use vitrine_seo::{find_duplicates, fix_duplicates};

use crate::error::ApiError;
use crate::state::AppState;

pub async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let groups = find_duplicates(&state.db).await?;
    Ok(Json(json!({ "count": groups.len(), "groups": groups })))
}

pub async fn fix(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let fixes = fix_duplicates(&state.db).await?;
    Ok(Json(json!({ "fixed": fixes.len(), "changes": fixes })))
}
