//! Route table.

use axum::middleware;
use axum::routing::{get, post};
use axum::Router;

use crate::auth::require_auth;
use crate::handlers::{
    duplicates, links, media, pillars, posts, seo_meta, settings, site, terms, users,
};
use crate::state::AppState;

/// Build the application router. Transport layers (tracing, CORS, request
/// ids, body limits) are added by the binary.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(site::health_check))
        .route("/wp-json", get(site::index))
        // WordPress v2
        .route(
            "/wp-json/wp/v2/posts",
            get(posts::list_posts).post(posts::create_post),
        )
        .route(
            "/wp-json/wp/v2/posts/:id",
            get(posts::get_post)
                .post(posts::update_post)
                .put(posts::update_post)
                .delete(posts::delete_post),
        )
        .route(
            "/wp-json/wp/v2/media",
            get(media::list_media).post(media::create_media),
        )
        .route(
            "/wp-json/wp/v2/media/:id",
            get(media::get_media).post(media::update_media),
        )
        .route(
            "/wp-json/wp/v2/categories",
            get(terms::list_categories).post(terms::create_category),
        )
        .route(
            "/wp-json/wp/v2/tags",
            get(terms::list_tags).post(terms::create_tag),
        )
        .route("/wp-json/wp/v2/users", get(users::list_users))
        .route("/wp-json/wp/v2/users/me", get(users::current_user))
        .route("/wp-json/wp/v2/stats", get(site::stats))
        .route("/wp-json/wp/v2/stats/status", get(site::status_stats))
        // SEO robot compatibility
        .route(
            "/wp-json/robo-seo-api-rest/v1/update-meta",
            post(seo_meta::update_meta),
        )
        // Automation
        .route(
            "/wp-json/vitrine/v1/pillars",
            get(pillars::list_pillars).post(pillars::save_pillar),
        )
        .route("/wp-json/vitrine/v1/pillars/expand", post(pillars::expand))
        .route(
            "/wp-json/vitrine/v1/pillars/:post_id",
            get(pillars::get_pillar).delete(pillars::delete_pillar),
        )
        .route("/wp-json/vitrine/v1/links/preview", get(links::preview))
        .route("/wp-json/vitrine/v1/links/apply", post(links::apply))
        .route("/wp-json/vitrine/v1/links/map", get(links::map))
        .route("/wp-json/vitrine/v1/duplicates", get(duplicates::list))
        .route("/wp-json/vitrine/v1/duplicates/fix", post(duplicates::fix))
        .route(
            "/wp-json/vitrine/v1/settings",
            get(settings::get_settings).post(settings::update_settings),
        )
        .layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
