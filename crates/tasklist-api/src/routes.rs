use axum::{
    Json, Router,
    response::IntoResponse,
    routing::{delete, get, patch, post},
};

use crate::state::AppState;
use crate::{todos, users};

/// All routes, with state attached. Middleware layers are added by the caller.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route("/add-user", post(users::add_user))
        .route("/delete-user", delete(users::delete_user))
        .route("/add-todo", post(todos::add_todo))
        .route("/get-todos", get(todos::get_todos))
        .route("/update-todo", patch(todos::update_todo))
        .route("/delete-todo", delete(todos::delete_todo))
        .with_state(state)
}

async fn index() -> impl IntoResponse {
    Json("Welcome to this todo app!")
}

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}
