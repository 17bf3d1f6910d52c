//! `POST /robo-seo-api-rest/v1/update-meta`: SEO fields pushed by an
//! external content robot.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::info;

use vitrine_core::keys::meta;
use vitrine_core::{PostMetaRepository, PostRepository};

use super::{meta_value, IdList};
use crate::error::ApiError;
use crate::state::AppState;

pub const DEFAULT_ARTICLE_TYPE: &str = "BlogPosting";

#[derive(Debug, Deserialize)]
pub struct UpdateMetaBody {
    pub post_id: IdList,
    pub keyword: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub link_internal: Option<Value>,
    pub faq: Option<Value>,
    pub faq_title: Option<String>,
    pub article_type: Option<String>,
    pub blog_posting_data: Option<Value>,
}

pub async fn update_meta(
    State(state): State<AppState>,
    Json(body): Json<UpdateMetaBody>,
) -> Result<Response, ApiError> {
    let post = match body.post_id.ids().first() {
        Some(id) => state.db.posts.find(*id).await?,
        None => None,
    };
    let Some(post) = post else {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Post não encontrado" })),
        )
            .into_response());
    };

    let faq = body.faq.clone().unwrap_or_else(|| json!([]));
    let blog_posting = body.blog_posting_data.clone().unwrap_or_else(|| json!({}));
    let article_type = body
        .article_type
        .clone()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_ARTICLE_TYPE.to_string());
    let faq_title = body.faq_title.clone().unwrap_or_default();
    let link_internal = body.link_internal.as_ref().map(meta_value);

    let faq_stored = meta_value(&faq);
    let blog_posting_stored = meta_value(&blog_posting);
    let mut entries: Vec<(&str, &str)> = vec![
        (meta::FAQ, faq_stored.as_str()),
        (meta::FAQ_TITLE, faq_title.as_str()),
        (meta::ARTICLE_TYPE, article_type.as_str()),
        (meta::BLOG_POSTING, blog_posting_stored.as_str()),
    ];
    if let Some(keyword) = &body.keyword {
        entries.push((meta::FOCUS_KEYWORD, keyword.as_str()));
    }
    if let Some(title) = &body.title {
        entries.push((meta::SEO_TITLE, title.as_str()));
    }
    if let Some(description) = &body.description {
        entries.push((meta::SEO_DESCRIPTION, description.as_str()));
    }
    if let Some(link) = &link_internal {
        entries.push((meta::LINK_INTERNAL, link.as_str()));
    }
    state.db.meta.set_many(post.id, &entries).await?;

    info!(
        subsystem = "api",
        component = "update_meta",
        post_id = post.id,
        keyword = body.keyword.as_deref().unwrap_or_default(),
        "SEO meta updated"
    );

    Ok(Json(json!({
        "success": true,
        "message": "Meta SEO atualizado com sucesso",
        "post_id": post.id,
        "data": {
            "focus_keyword": body.keyword,
            "seo_title": body.title,
            "seo_description": body.description,
            "link_internal": body.link_internal,
            "faq": faq,
            "faq_title": faq_title,
            "article_type": article_type,
            "blog_posting_data": blog_posting,
            "updated_at": Utc::now().to_rfc3339(),
        },
    }))
    .into_response())
}
