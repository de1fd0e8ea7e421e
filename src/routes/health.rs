use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;
use crate::db;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    /// Seconds since the tender table was loaded, if one is cached.
    pub table_age_seconds: Option<u64>,
}

/// Health check endpoint
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let database_ok = db::health_check(state.tables.source().pool()).await;
    let table_age_seconds = state.tables.cached_age().map(|age| age.as_secs());

    // A cached table keeps the dashboard usable while the database is down
    let (status, status_code) = match (database_ok, table_age_seconds) {
        (true, _) => ("healthy", StatusCode::OK),
        (false, Some(_)) => ("degraded", StatusCode::OK),
        (false, None) => ("unhealthy", StatusCode::SERVICE_UNAVAILABLE),
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            database: if database_ok { "ok" } else { "error" }.to_string(),
            table_age_seconds,
        }),
    )
}
