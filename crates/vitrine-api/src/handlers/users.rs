use axum::extract::State;
use axum::Json;

use crate::format::{admin_user, WpUser};
use crate::state::AppState;

pub async fn list_users(State(state): State<AppState>) -> Json<Vec<WpUser>> {
    Json(vec![admin_user(&state.config)])
}

pub async fn current_user(State(state): State<AppState>) -> Json<WpUser> {
    Json(admin_user(&state.config))
}
