//! `/wp/v2/categories` and `/wp/v2/tags` handlers.

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use serde::Deserialize;
use tracing::info;

use vitrine_core::{CreateTermRequest, Taxonomy, TermRepository};

use crate::error::ApiError;
use crate::format::{format_term, WpTerm};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CreateTermBody {
    #[serde(default)]
    pub name: String,
    pub slug: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parent: i64,
}

async fn list(state: &AppState, taxonomy: Taxonomy) -> Result<Json<Vec<WpTerm>>, ApiError> {
    let terms = state.db.terms.list(taxonomy).await?;
    Ok(Json(
        terms
            .into_iter()
            .map(|t| format_term(&state.config, t))
            .collect(),
    ))
}

async fn create(
    state: &AppState,
    taxonomy: Taxonomy,
    body: CreateTermBody,
) -> Result<(StatusCode, Json<WpTerm>), ApiError> {
    let term = state
        .db
        .terms
        .create(
            taxonomy,
            CreateTermRequest {
                name: body.name,
                slug: body.slug,
                description: body.description,
                parent: body.parent,
            },
        )
        .await?;

    info!(subsystem = "api", taxonomy = %taxonomy, term_id = term.id, name = %term.name, "Term created");
    Ok((StatusCode::CREATED, Json(format_term(&state.config, term))))
}

pub async fn list_categories(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    list(&state, Taxonomy::Category).await
}

pub async fn create_category(
    State(state): State<AppState>,
    Json(body): Json<CreateTermBody>,
) -> Result<impl IntoResponse, ApiError> {
    create(&state, Taxonomy::Category, body).await
}

pub async fn list_tags(State(state): State<AppState>) -> Result<impl IntoResponse, ApiError> {
    list(&state, Taxonomy::Tag).await
}

pub async fn create_tag(
    State(state): State<AppState>,
    Json(body): Json<CreateTermBody>,
) -> Result<impl IntoResponse, ApiError> {
    create(&state, Taxonomy::Tag, body).await
}
