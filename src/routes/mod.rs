pub mod docs;
pub mod health;
pub mod project;
pub mod webhook;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub fn router(state: AppState, max_body_bytes: usize) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route("/openapi.json", get(docs::openapi))
        .route("/register", post(project::register_project))
        .route("/set-target/:project_id", post(project::set_target))
        .route("/projects/:project_id", get(project::get_project))
        .route("/hook/:project_id", post(webhook::receive_hook))
        .route("/logs/:project_id", get(webhook::list_logs))
        .route("/replay/:project_id", post(webhook::replay_logs))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(max_body_bytes))
}
