//! `/wp/v2/media` handlers. Media is registered by URL; binaries are hosted
//! elsewhere.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use vitrine_core::{CreateMediaRequest, Error, MediaRepository, UpdateMediaRequest};

use super::{pagination_headers, PageQuery};
use crate::error::ApiError;
use crate::format::{format_media, WpMedia};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateMediaBody {
    #[serde(default)]
    pub title: String,
    pub source_url: String,
    #[serde(default)]
    pub file: String,
    pub mime_type: Option<String>,
    #[serde(default)]
    pub alt_text: String,
    #[serde(default)]
    pub caption: String,
    #[serde(default)]
    pub description: String,
    pub author: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateMediaBody {
    pub title: Option<String>,
    pub alt_text: Option<String>,
    pub caption: Option<String>,
    pub description: Option<String>,
}

pub async fn list_media(
    State(state): State<AppState>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let per_page = query.per_page();
    let total = state.db.media.count().await?;
    let items = state.db.media.list(per_page, query.offset()).await?;

    let body: Vec<WpMedia> = items
        .into_iter()
        .map(|m| format_media(&state.config, m))
        .collect();
    Ok((pagination_headers(total, per_page), Json(body)))
}

pub async fn get_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    match state.db.media.fetch(id).await {
        Ok(media) => Ok(Json(format_media(&state.config, media))),
        Err(Error::NotFound(_)) => Err(ApiError::media_not_found()),
        Err(e) => Err(e.into()),
    }
}

pub async fn create_media(
    State(state): State<AppState>,
    Json(body): Json<CreateMediaBody>,
) -> Result<impl IntoResponse, ApiError> {
    let id = state
        .db
        .media
        .insert(CreateMediaRequest {
            title: body.title,
            source_url: body.source_url,
            file: body.file,
            mime_type: body.mime_type,
            alt_text: body.alt_text,
            caption: body.caption,
            description: body.description,
            author_id: body.author.unwrap_or(1),
        })
        .await?;
    let media = state.db.media.fetch(id).await?;

    info!(subsystem = "api", media_id = id, title = %media.title, "Media registered");
    Ok((StatusCode::CREATED, Json(format_media(&state.config, media))))
}

pub async fn update_media(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<UpdateMediaBody>,
) -> Result<impl IntoResponse, ApiError> {
    let req = UpdateMediaRequest {
        title: body.title,
        alt_text: body.alt_text,
        caption: body.caption,
        description: body.description,
    };
    match state.db.media.update(id, req).await {
        Ok(media) => {
            info!(subsystem = "api", media_id = id, "Media updated");
            Ok(Json(format_media(&state.config, media)))
        }
        Err(Error::NotFound(_)) => Err(ApiError::media_not_found()),
        Err(e) => Err(e.into()),
    }
}
