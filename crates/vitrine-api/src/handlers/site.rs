//! Site index, health and content statistics.

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use chrono::Utc;
use serde_json::json;

use vitrine_core::{ListPostsRequest, MediaRepository, PostRepository, Taxonomy, TermRepository};

use crate::error::ApiError;
use crate::state::AppState;

/// Routes advertised at `/wp-json`.
const ROUTES: &[(&str, &[&str])] = &[
    ("/wp/v2/posts", &["GET", "POST"]),
    ("/wp/v2/posts/<id>", &["GET", "POST", "PUT", "DELETE"]),
    ("/wp/v2/media", &["GET", "POST"]),
    ("/wp/v2/media/<id>", &["GET", "POST"]),
    ("/wp/v2/categories", &["GET", "POST"]),
    ("/wp/v2/tags", &["GET", "POST"]),
    ("/wp/v2/users", &["GET"]),
    ("/wp/v2/users/me", &["GET"]),
    ("/wp/v2/stats", &["GET"]),
    ("/wp/v2/stats/status", &["GET"]),
    ("/robo-seo-api-rest/v1/update-meta", &["POST"]),
    ("/vitrine/v1/pillars", &["GET", "POST"]),
    ("/vitrine/v1/pillars/<post_id>", &["GET", "DELETE"]),
    ("/vitrine/v1/pillars/expand", &["POST"]),
    ("/vitrine/v1/links/preview", &["GET"]),
    ("/vitrine/v1/links/apply", &["POST"]),
    ("/vitrine/v1/links/map", &["GET"]),
    ("/vitrine/v1/duplicates", &["GET"]),
    ("/vitrine/v1/duplicates/fix", &["POST"]),
    ("/vitrine/v1/settings", &["GET", "POST"]),
];

pub async fn index(State(state): State<AppState>) -> impl IntoResponse {
    let base = &state.config.base_url;
    let routes: serde_json::Map<String, serde_json::Value> = ROUTES
        .iter()
        .map(|(path, methods)| (path.to_string(), json!({ "methods": methods })))
        .collect();

    Json(json!({
        "name": state.config.site_name,
        "description": "API WordPress-compatible para Caas Express",
        "url": base,
        "home": base,
        "gmt_offset": -3,
        "timezone_string": "America/Sao_Paulo",
        "namespaces": ["wp/v2", "robo-seo-api-rest/v1", "vitrine/v1"],
        "authentication": {
            "application-passwords": {
                "endpoints": {
                    "authorization": format!("{}/wp-json/wp/v2/users/me", base),
                },
            },
        },
        "routes": routes,
    }))
}

pub async fn health_check(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    let posts = state
        .db
        .posts
        .list(ListPostsRequest {
            limit: Some(1),
            ..Default::default()
        })
        .await?
        .total;
    let media = state.db.media.count().await?;
    let categories = state.db.terms.list(Taxonomy::Category).await?.len();

    Ok(Json(json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
        "timestamp": Utc::now().to_rfc3339(),
        "posts": posts,
        "media": media,
        "categories": categories,
    })))
}

pub async fn stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.posts.content_counts().await?))
}

pub async fn status_stats(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(state.db.posts.status_counts().await?))
}
