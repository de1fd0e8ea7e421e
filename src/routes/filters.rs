use axum::extract::State;
use serde::Serialize;
use std::sync::Arc;

use crate::api::DataResponse;
use crate::app::AppState;
use crate::error::DashboardResult;
use crate::pipeline::filter::{CostRange, FilterOptions, ALL};

#[derive(Debug, Serialize)]
pub struct FilterOptionsResponse {
    /// Selectable sectors, `"All"` first.
    pub sectors: Vec<String>,
    /// Selectable procedure types, `"All"` first.
    pub procedures: Vec<String>,
    pub cost_bounds: Option<CostRange>,
    pub total_records: usize,
}

impl FilterOptionsResponse {
    fn new(options: &FilterOptions, total_records: usize) -> Self {
        Self {
            sectors: with_sentinel(&options.sectors),
            procedures: with_sentinel(&options.procedures),
            cost_bounds: options.cost_bounds,
            total_records,
        }
    }
}

fn with_sentinel(values: &[String]) -> Vec<String> {
    std::iter::once(ALL.to_string())
        .chain(values.iter().cloned())
        .collect()
}

/// GET /filters
pub async fn get_filter_options(
    State(state): State<Arc<AppState>>,
) -> DashboardResult<DataResponse<FilterOptionsResponse>> {
    let snapshot = state.tables.fetch().await?;
    Ok(DataResponse::new(FilterOptionsResponse::new(
        &snapshot.options,
        snapshot.tenders.len(),
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TenderRecord;

    #[test]
    fn option_lists_start_with_all() {
        let table = vec![
            TenderRecord {
                procurement_sector_code: Some("UTILITY".into()),
                ..TenderRecord::with_cost(10.0)
            },
            TenderRecord {
                procurement_sector_code: Some("PUBLIC".into()),
                procedure_type_code: Some("OPEN".into()),
                ..TenderRecord::with_cost(20.0)
            },
        ];
        let response = FilterOptionsResponse::new(&FilterOptions::from_table(&table), table.len());
        assert_eq!(response.sectors, vec!["All", "PUBLIC", "UTILITY"]);
        assert_eq!(response.procedures, vec!["All", "OPEN"]);
        assert_eq!(response.total_records, 2);
    }
}
