use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use super::handlers;
use super::static_files::static_handler;
use super::state::AppState;

// UI Routes - web interface
pub fn ui_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/", get(handlers::ui::index_handler))
        .route("/static/{*path}", get(static_handler))
}

// API Routes - consumed by the page's JavaScript
pub fn api_routes() -> Router<Arc<AppState>> {
    Router::new().nest(
        "/api",
        Router::new()
            // SQL generation
            .route("/generate", post(handlers::api::generate))
            // Session history
            .route("/history", get(handlers::api::history))
            // System status
            .route("/status", get(handlers::api::system_status)),
    )
}
