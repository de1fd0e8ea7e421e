use axum::extract::State;
use std::sync::Arc;

use crate::api::MessageResponse;
use crate::app::AppState;
use crate::error::DashboardResult;
use crate::pipeline::format::format_count;

/// POST /cache/refresh
///
/// Drops the cached tender table and loads a fresh one.
pub async fn refresh_cache(State(state): State<Arc<AppState>>) -> DashboardResult<MessageResponse> {
    state.tables.invalidate();
    let snapshot = state.tables.fetch().await?;

    tracing::info!(rows = snapshot.tenders.len(), "Tender table refreshed on request");

    Ok(MessageResponse::with_code(
        format!("Loaded {} tender records", format_count(snapshot.tenders.len())),
        "CACHE_REFRESHED",
    ))
}
