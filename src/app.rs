use axum::{
    http::{HeaderName, HeaderValue, Method},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{AllowHeaders, AllowMethods, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::Settings;
use crate::routes;
use crate::services::{PgTenderSource, TableCache};

/// Header carrying the per-request id
pub const X_REQUEST_ID: &str = "x-request-id";

/// Shared application state
pub struct AppState {
    pub settings: Settings,
    pub tables: TableCache<PgTenderSource>,
}

impl AppState {
    pub fn new(settings: Settings, tables: TableCache<PgTenderSource>) -> Arc<Self> {
        Arc::new(Self { settings, tables })
    }
}

/// Build the complete application with all middleware
pub fn create_app(state: Arc<AppState>) -> Router {
    let cors = build_cors_layer(&state.settings);

    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
        .on_response(DefaultOnResponse::new().level(Level::DEBUG));

    let request_id = HeaderName::from_static(X_REQUEST_ID);

    Router::new()
        .merge(routes::api_router())
        // Middleware stack (applied bottom-up)
        .layer(PropagateRequestIdLayer::new(request_id.clone()))
        .layer(trace_layer)
        .layer(SetRequestIdLayer::new(request_id, MakeRequestUuid))
        .layer(cors)
        .with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins: Vec<HeaderValue> = settings
        .cors_allow_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    let max_age = if settings.env.is_dev() {
        Duration::from_secs(86400)
    } else {
        Duration::from_secs(3600)
    };

    // Read-only API apart from the cache refresh
    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods(AllowMethods::list([Method::GET, Method::POST, Method::OPTIONS]))
        .allow_headers(AllowHeaders::list([
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
            HeaderName::from_static(X_REQUEST_ID),
        ]))
        .max_age(max_age)
}
