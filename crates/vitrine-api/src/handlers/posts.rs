//! `/wp/v2/posts` handlers.

use std::collections::BTreeMap;

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use vitrine_core::{
    CreatePostRequest, ListPostsRequest, PostMetaRepository, PostRepository, PostStatus, PostType,
    Taxonomy, TermRepository, UpdatePostRequest,
};

use super::{meta_value, pagination_headers, parse_id_csv, parse_wp_date, IdList, PageQuery};
use crate::error::ApiError;
use crate::format::{format_post, format_posts};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct ListPostsQuery {
    pub page: Option<i64>,
    pub per_page: Option<i64>,
    pub status: Option<String>,
    pub search: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub categories: Option<String>,
    pub tags: Option<String>,
}

/// Create/update body. Every field is optional so the same shape serves
/// both partial updates and creation.
#[derive(Debug, Default, Deserialize)]
pub struct PostBody {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub slug: Option<String>,
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub post_type: Option<String>,
    pub author: Option<i64>,
    pub featured_media: Option<i64>,
    pub date: Option<String>,
    pub categories: Option<IdList>,
    pub tags: Option<IdList>,
    pub meta: Option<BTreeMap<String, serde_json::Value>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub force: bool,
}

fn parse_status(raw: &str) -> Result<PostStatus, ApiError> {
    raw.parse().map_err(ApiError::BadRequest)
}

fn parse_type(raw: &str) -> Result<PostType, ApiError> {
    raw.parse().map_err(ApiError::BadRequest)
}

/// Persist the taxonomy and metadata parts of a body.
async fn save_relations(state: &AppState, post_id: i64, body: &PostBody) -> Result<(), ApiError> {
    if let Some(categories) = &body.categories {
        state
            .db
            .terms
            .set_for_post(post_id, Taxonomy::Category, &categories.ids())
            .await?;
    }
    if let Some(tags) = &body.tags {
        state
            .db
            .terms
            .set_for_post(post_id, Taxonomy::Tag, &tags.ids())
            .await?;
    }
    if let Some(meta) = &body.meta {
        let values: Vec<(String, String)> = meta
            .iter()
            .map(|(k, v)| (k.clone(), meta_value(v)))
            .collect();
        let entries: Vec<(&str, &str)> = values
            .iter()
            .map(|(k, v)| (k.as_str(), v.as_str()))
            .collect();
        state.db.meta.set_many(post_id, &entries).await?;
    }
    Ok(())
}

pub async fn list_posts(
    State(state): State<AppState>,
    Query(query): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let status = match query.status.as_deref().map(str::trim) {
        None | Some("") | Some("any") => None,
        Some(raw) => Some(parse_status(raw)?),
    };
    let post_type = match query.post_type.as_deref().map(str::trim) {
        None | Some("") | Some("any") => None,
        Some(raw) => Some(parse_type(raw)?),
    };
    let paging = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let per_page = paging.per_page();

    let result = state
        .db
        .posts
        .list(ListPostsRequest {
            limit: Some(per_page),
            offset: Some(paging.offset()),
            status,
            post_type,
            search: query.search.clone(),
            categories: query.categories.as_deref().map(parse_id_csv).unwrap_or_default(),
            tags: query.tags.as_deref().map(parse_id_csv).unwrap_or_default(),
        })
        .await?;

    let headers = pagination_headers(result.total, per_page);
    let posts = format_posts(&state, result.posts).await?;
    Ok((headers, Json(posts)))
}

pub async fn get_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .posts
        .find(id)
        .await?
        .ok_or_else(ApiError::post_not_found)?;
    Ok(Json(format_post(&state, post).await?))
}

pub async fn create_post(
    State(state): State<AppState>,
    Json(body): Json<PostBody>,
) -> Result<impl IntoResponse, ApiError> {
    let title = body.title.clone().unwrap_or_default();
    let slug = body
        .slug
        .clone()
        .filter(|s| !s.trim().is_empty())
        .or_else(|| {
            title
                .trim()
                .is_empty()
                .then(|| format!("post-{}", Utc::now().timestamp_millis()))
        });
    let created_at = body.date.as_deref().map(parse_wp_date).transpose()?;

    let req = CreatePostRequest {
        title,
        content: body.content.clone().unwrap_or_default(),
        excerpt: body.excerpt.clone().unwrap_or_default(),
        slug,
        status: body.status.as_deref().map(parse_status).transpose()?.unwrap_or_default(),
        post_type: body.post_type.as_deref().map(parse_type).transpose()?.unwrap_or_default(),
        author_id: body.author.unwrap_or(1),
        featured_media: body.featured_media.unwrap_or(0),
        created_at,
    };

    let id = state.db.posts.insert(req).await?;
    save_relations(&state, id, &body).await?;

    let post = state.db.posts.fetch(id).await?;
    info!(subsystem = "api", post_id = id, title = %post.title, "Post created");
    Ok((StatusCode::CREATED, Json(format_post(&state, post).await?)))
}

pub async fn update_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(body): Json<PostBody>,
) -> Result<impl IntoResponse, ApiError> {
    if state.db.posts.find(id).await?.is_none() {
        return Err(ApiError::post_not_found());
    }

    let req = UpdatePostRequest {
        title: body.title.clone(),
        content: body.content.clone(),
        excerpt: body.excerpt.clone(),
        slug: body.slug.clone(),
        status: body.status.as_deref().map(parse_status).transpose()?,
        featured_media: body.featured_media,
    };
    let post = state.db.posts.update(id, req).await?;
    save_relations(&state, id, &body).await?;

    info!(subsystem = "api", post_id = id, "Post updated");
    Ok(Json(format_post(&state, post).await?))
}

/// Trash a post, or delete it for good with `?force=true`.
pub async fn delete_post(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<DeleteQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let post = state
        .db
        .posts
        .find(id)
        .await?
        .ok_or_else(ApiError::post_not_found)?;

    if query.force {
        let previous = format_post(&state, post).await?;
        state.db.posts.hard_delete(id).await?;
        info!(subsystem = "api", post_id = id, "Post deleted");
        return Ok(Json(json!({ "deleted": true, "previous": previous })));
    }

    state.db.posts.soft_delete(id).await?;
    let trashed = state.db.posts.fetch(id).await?;
    info!(subsystem = "api", post_id = id, "Post moved to trash");
    let body = serde_json::to_value(format_post(&state, trashed).await?)
        .map_err(vitrine_core::Error::from)?;
    Ok(Json(body))
}
