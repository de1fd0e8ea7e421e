//! Dashboard endpoint
//!
//! Fetches the cached tender table, applies the caller's filters and returns
//! every figure the dashboard draws in one snapshot.

use axum::extract::{rejection::QueryRejection, Query, State};
use serde::Deserialize;
use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::error::{DashboardError, DashboardResult};
use crate::pipeline::{self, DashboardView};

pub const MAX_BUCKETS: usize = 500;

#[derive(Debug, Deserialize, Default)]
pub struct DashboardQuery {
    pub min_cost: Option<f64>,
    pub max_cost: Option<f64>,
    /// Sector code or `"All"`.
    pub sector: Option<String>,
    /// Procedure type code or `"All"`.
    pub procedure: Option<String>,
    pub buckets: Option<usize>,
}

impl DashboardQuery {
    fn bucket_count(&self, default: NonZeroUsize) -> DashboardResult<NonZeroUsize> {
        match self.buckets {
            None => Ok(default),
            Some(requested) => NonZeroUsize::new(requested)
                .filter(|count| count.get() <= MAX_BUCKETS)
                .ok_or_else(|| {
                    DashboardError::BadRequest(format!("buckets must be between 1 and {MAX_BUCKETS}"))
                }),
        }
    }
}

/// GET /dashboard
///
/// Malformed query strings are reported as `BAD_REQUEST` JSON like any other
/// validation failure.
pub async fn get_dashboard(
    State(state): State<Arc<AppState>>,
    query: Result<Query<DashboardQuery>, QueryRejection>,
) -> DashboardResult<DataResponse<DashboardView>> {
    let Query(query) = query?;
    let bucket_count = query.bucket_count(state.settings.cost_bucket_count)?;
    let snapshot = state.tables.fetch().await?;

    let filter = snapshot.options.resolve(
        query.min_cost,
        query.max_cost,
        query.sector.as_deref(),
        query.procedure.as_deref(),
    );

    tracing::info!(
        min_cost = filter.cost_range.min,
        max_cost = filter.cost_range.max,
        sector = ?filter.sector,
        procedure = ?filter.procedure,
        buckets = bucket_count.get(),
        "Rendering dashboard"
    );

    Ok(DataResponse::new(pipeline::render(
        &snapshot.tenders,
        filter,
        bucket_count,
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{StatusCode, Uri};
    use axum::response::IntoResponse;

    fn parse(uri: &str) -> Result<DashboardQuery, DashboardError> {
        let uri: Uri = uri.parse().unwrap();
        Ok(Query::<DashboardQuery>::try_from_uri(&uri)?.0)
    }

    fn default_buckets() -> NonZeroUsize {
        NonZeroUsize::new(50).unwrap()
    }

    #[test]
    fn bucket_count_defaults_to_configured_value() {
        let query = DashboardQuery::default();
        assert_eq!(query.bucket_count(default_buckets()).unwrap().get(), 50);
    }

    #[test]
    fn bucket_count_must_be_in_range() {
        for requested in [0, MAX_BUCKETS + 1] {
            let query = DashboardQuery {
                buckets: Some(requested),
                ..DashboardQuery::default()
            };
            assert!(matches!(
                query.bucket_count(default_buckets()),
                Err(DashboardError::BadRequest(_))
            ));
        }

        let query = DashboardQuery {
            buckets: Some(MAX_BUCKETS),
            ..DashboardQuery::default()
        };
        assert_eq!(query.bucket_count(default_buckets()).unwrap().get(), MAX_BUCKETS);
    }

    #[test]
    fn well_formed_query_is_parsed() {
        let query = parse("/dashboard?min_cost=1000&sector=PUBLIC%20&buckets=20").unwrap();
        assert_eq!(query.min_cost, Some(1000.0));
        assert_eq!(query.max_cost, None);
        assert_eq!(query.sector.as_deref(), Some("PUBLIC "));
        assert_eq!(query.buckets, Some(20));
    }

    #[tokio::test]
    async fn malformed_query_becomes_json_bad_request() {
        for uri in ["/dashboard?buckets=abc", "/dashboard?min_cost=", "/dashboard?buckets=-3"] {
            let err = parse(uri).unwrap_err();
            assert!(matches!(err, DashboardError::BadRequest(_)), "{uri}");

            let response = err.into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{uri}");
            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
            assert_eq!(json["code"], "BAD_REQUEST", "{uri}");
            assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()), "{uri}");
        }
    }
}
