pub mod cache;
pub mod dashboard;
pub mod filters;
pub mod health;

use axum::{routing::get, routing::post, Router};
use std::sync::Arc;

use crate::app::AppState;

/// Build the API router with all routes
pub fn api_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/filters", get(filters::get_filter_options))
        .route("/dashboard", get(dashboard::get_dashboard))
        .route("/cache/refresh", post(cache::refresh_cache))
}
