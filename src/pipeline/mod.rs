//! Filter & bucketing engine
//!
//! Pure, synchronous transformations from a loaded tender table to the
//! figures the dashboard draws. Nothing in here touches the data source.

pub mod buckets;
pub mod filter;
pub mod format;
pub mod stats;

use serde::Serialize;
use std::num::NonZeroUsize;

use crate::domain::{CategoryField, TenderRecord, TenderTable};

pub use buckets::{bucketize, CostHistogram};
pub use filter::{apply, FilterOptions, TenderFilter};
pub use stats::{CategoryRank, CostSummary, MonthlyCount, RecentTender, ValueCount};

pub const TOP_CATEGORY_LIMIT: usize = 10;
pub const RECENT_TENDER_LIMIT: usize = 20;

const NO_DATA_MESSAGE: &str = "No data available for the selected filters.";

#[derive(Debug, Clone, Serialize)]
pub struct DashboardView {
    /// Rows in the loaded table before filtering.
    pub total_records: usize,
    pub filter: TenderFilter,
    #[serde(flatten)]
    pub content: DashboardContent,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DashboardContent {
    /// The filter matched nothing; no statistics were attempted.
    Empty { message: String },
    Populated(Box<DashboardData>),
}

/// One filtered tender tagged with the histogram bucket it falls into.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketedTender {
    pub bucket: usize,
    #[serde(flatten)]
    pub tender: TenderRecord,
}

#[derive(Debug, Clone, Serialize)]
pub struct DashboardData {
    /// Filtered rows in table order, each with its `histogram.buckets` index.
    pub rows: Vec<BucketedTender>,
    pub summary: CostSummary,
    pub histogram: CostHistogram,
    pub top_categories: Vec<CategoryRank>,
    pub timeline: Vec<MonthlyCount>,
    pub sectors: Vec<ValueCount>,
    pub procedures: Vec<ValueCount>,
    pub recent_tenders: Vec<RecentTender>,
}

/// Runs filter → bucketize → aggregate over one loaded table.
pub fn render(table: &[TenderRecord], filter: TenderFilter, bucket_count: NonZeroUsize) -> DashboardView {
    let tenders = apply(table, &filter);

    tracing::debug!(
        loaded = table.len(),
        matched = tenders.len(),
        buckets = bucket_count.get(),
        "Applied dashboard filter"
    );

    let content = match summarize_all(&tenders, bucket_count) {
        Some((summary, histogram)) => {
            let top_categories = stats::top_categories(&tenders, TOP_CATEGORY_LIMIT);
            let timeline = stats::monthly_timeline(&tenders);
            let sectors = stats::value_counts(&tenders, CategoryField::Sector);
            let procedures = stats::value_counts(&tenders, CategoryField::ProcedureType);
            let recent_tenders = stats::recent_tenders(&tenders, RECENT_TENDER_LIMIT);

            DashboardContent::Populated(Box::new(DashboardData {
                rows: tag_buckets(tenders, &histogram.assignments),
                summary,
                histogram,
                top_categories,
                timeline,
                sectors,
                procedures,
                recent_tenders,
            }))
        }
        None => DashboardContent::Empty {
            message: NO_DATA_MESSAGE.to_string(),
        },
    };

    DashboardView {
        total_records: table.len(),
        filter,
        content,
    }
}

fn tag_buckets(tenders: TenderTable, assignments: &[usize]) -> Vec<BucketedTender> {
    tenders
        .into_iter()
        .zip(assignments)
        .map(|(tender, &bucket)| BucketedTender { bucket, tender })
        .collect()
}

fn summarize_all(tenders: &[TenderRecord], bucket_count: NonZeroUsize) -> Option<(CostSummary, CostHistogram)> {
    Some((stats::summarize(tenders)?, bucketize(tenders, bucket_count)?))
}
