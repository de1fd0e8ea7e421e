//! Summary figures, rankings and timelines over a filtered table.
//!
//! Everything here expects a non-empty table except where noted; the
//! pipeline skips this module entirely when a filter matches nothing.

use chrono::{Datelike, NaiveDateTime};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

use super::format::{format_count, format_cost, format_cost_full};
use crate::domain::{CategoryField, TenderRecord};

/// A raw figure with its dashboard rendering.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Metric {
    pub value: f64,
    pub display: String,
}

impl Metric {
    fn cost(value: f64) -> Self {
        Self {
            value,
            display: format_cost(value),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostSummary {
    pub count: usize,
    pub count_display: String,
    pub total: Metric,
    pub mean: Metric,
    pub median: Metric,
}

/// Count, sum, mean and median of `estimated_cost`; `None` for an empty table.
pub fn summarize(table: &[TenderRecord]) -> Option<CostSummary> {
    let count = table.len();
    if count == 0 {
        return None;
    }

    let mut costs: Vec<f64> = table.iter().map(|record| record.estimated_cost).collect();
    let total: f64 = costs.iter().sum();
    let mean = total / count as f64;

    costs.sort_by(f64::total_cmp);
    let middle = count / 2;
    let median = if count % 2 == 0 {
        (costs[middle - 1] + costs[middle]) / 2.0
    } else {
        costs[middle]
    };

    Some(CostSummary {
        count,
        count_display: format_count(count),
        total: Metric::cost(total),
        mean: Metric::cost(mean),
        median: Metric::cost(median),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryRank {
    /// `None` groups tenders without a CPV name.
    pub category: Option<String>,
    pub total_cost: Metric,
    pub count: usize,
}

/// Groups by `primary_cpv_name` and returns the `limit` largest groups by
/// summed cost. Equal sums keep the order in which groups first appear.
pub fn top_categories(table: &[TenderRecord], limit: usize) -> Vec<CategoryRank> {
    let mut positions: HashMap<Option<&str>, usize> = HashMap::new();
    let mut groups: Vec<(Option<&str>, f64, usize)> = Vec::new();

    for record in table {
        let key = record.primary_cpv_name.as_deref();
        let slot = *positions.entry(key).or_insert_with(|| {
            groups.push((key, 0.0, 0));
            groups.len() - 1
        });
        groups[slot].1 += record.estimated_cost;
        groups[slot].2 += 1;
    }

    // Stable: ties stay in encounter order
    groups.sort_by(|a, b| b.1.total_cmp(&a.1));
    groups
        .into_iter()
        .take(limit)
        .map(|(category, total, count)| CategoryRank {
            category: category.map(str::to_string),
            total_cost: Metric::cost(total),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MonthlyCount {
    pub year: i32,
    pub month: u32,
    /// `YYYY-MM`
    pub label: String,
    pub count: usize,
}

/// Submission deadlines per calendar month, oldest first. Rows without a
/// deadline are left out.
pub fn monthly_timeline(table: &[TenderRecord]) -> Vec<MonthlyCount> {
    let mut months: BTreeMap<(i32, u32), usize> = BTreeMap::new();
    for deadline in table.iter().filter_map(|record| record.submission_deadline) {
        *months.entry((deadline.year(), deadline.month())).or_default() += 1;
    }

    months
        .into_iter()
        .map(|((year, month), count)| MonthlyCount {
            year,
            month,
            label: format!("{year:04}-{month:02}"),
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: usize,
}

/// Occurrences of each non-null value of `field`, most frequent first.
pub fn value_counts(table: &[TenderRecord], field: CategoryField) -> Vec<ValueCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<ValueCount> = Vec::new();

    for value in table.iter().filter_map(|record| field.value(record)) {
        match positions.get(value) {
            Some(&slot) => counts[slot].count += 1,
            None => {
                positions.insert(value, counts.len());
                counts.push(ValueCount {
                    value: value.to_string(),
                    count: 1,
                });
            }
        }
    }

    counts.sort_by(|a, b| b.count.cmp(&a.count));
    counts
}

/// Row of the recent tenders table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecentTender {
    pub tender_name: Option<String>,
    pub estimated_cost: String,
    pub primary_cpv_name: Option<String>,
    pub procurement_sector_code: Option<String>,
    pub submission_deadline: Option<NaiveDateTime>,
}

/// Latest submission deadlines first; tenders without one come last.
pub fn recent_tenders(table: &[TenderRecord], limit: usize) -> Vec<RecentTender> {
    let mut rows: Vec<&TenderRecord> = table.iter().collect();
    // None < Some, so descending order puts missing deadlines at the end
    rows.sort_by(|a, b| b.submission_deadline.cmp(&a.submission_deadline));

    rows.into_iter()
        .take(limit)
        .map(|record| RecentTender {
            tender_name: record.tender_name.clone(),
            estimated_cost: format_cost_full(record.estimated_cost),
            primary_cpv_name: record.primary_cpv_name.clone(),
            procurement_sector_code: record.procurement_sector_code.clone(),
            submission_deadline: record.submission_deadline,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn costs(values: &[f64]) -> Vec<TenderRecord> {
        values.iter().copied().map(TenderRecord::with_cost).collect()
    }

    fn categorized(cost: f64, category: Option<&str>) -> TenderRecord {
        TenderRecord {
            primary_cpv_name: category.map(str::to_string),
            ..TenderRecord::with_cost(cost)
        }
    }

    fn deadline(y: i32, m: u32, d: u32) -> Option<NaiveDateTime> {
        NaiveDate::from_ymd_opt(y, m, d).and_then(|date| date.and_hms_opt(12, 0, 0))
    }

    fn due(cost: f64, at: Option<NaiveDateTime>) -> TenderRecord {
        TenderRecord {
            submission_deadline: at,
            ..TenderRecord::with_cost(cost)
        }
    }

    #[test]
    fn summary_of_empty_table_is_none() {
        assert!(summarize(&[]).is_none());
    }

    #[test]
    fn summary_odd_count() {
        let summary = summarize(&costs(&[100.0, 10_000.0, 1_000.0])).unwrap();
        assert_eq!(summary.count, 3);
        assert_eq!(summary.total.value, 11_100.0);
        assert_eq!(summary.mean.value, 3_700.0);
        assert_eq!(summary.median.value, 1_000.0);
        assert_eq!(summary.total.display, "€11K");
        assert_eq!(summary.median.display, "€1K");
    }

    #[test]
    fn summary_even_count_averages_middle_values() {
        let summary = summarize(&costs(&[100_000.0, 100.0, 10_000.0, 1_000.0])).unwrap();
        assert_eq!(summary.median.value, 5_500.0);
        assert_eq!(summary.mean.value, summary.total.value / 4.0);
    }

    #[test]
    fn median_ignores_row_order() {
        let values = [7.0, 3.0, 900.0, 12.5, 44.0, 3.0];
        let forward = summarize(&costs(&values)).unwrap();
        let mut reversed = values;
        reversed.reverse();
        let backward = summarize(&costs(&reversed)).unwrap();
        assert_eq!(forward.median, backward.median);
        assert_eq!(forward.median.value, 9.75);
    }

    #[test]
    fn count_display_groups_thousands() {
        let summary = summarize(&costs(&[1.0; 1_234])).unwrap();
        assert_eq!(summary.count_display, "1,234");
    }

    #[test]
    fn categories_rank_by_summed_cost() {
        let table = vec![
            categorized(100.0, Some("Roads")),
            categorized(5_000.0, Some("Software")),
            categorized(900.0, Some("Roads")),
            categorized(2_000.0, None),
        ];
        let ranking = top_categories(&table, 10);
        let names: Vec<Option<&str>> = ranking.iter().map(|r| r.category.as_deref()).collect();
        assert_eq!(names, vec![Some("Software"), None, Some("Roads")]);
        assert_eq!(ranking[2].count, 2);
        assert_eq!(ranking[2].total_cost.value, 1_000.0);
    }

    #[test]
    fn category_ties_keep_encounter_order() {
        let table = vec![
            categorized(50.0, Some("B")),
            categorized(50.0, Some("A")),
            categorized(50.0, Some("C")),
        ];
        let names: Vec<String> = top_categories(&table, 10)
            .into_iter()
            .filter_map(|r| r.category)
            .collect();
        assert_eq!(names, vec!["B", "A", "C"]);
    }

    #[test]
    fn categories_are_capped_at_limit() {
        let table: Vec<TenderRecord> = (0..15)
            .map(|i| categorized(f64::from(i + 1), Some(&format!("cat-{i}"))))
            .collect();
        let ranking = top_categories(&table, 10);
        assert_eq!(ranking.len(), 10);
        assert_eq!(ranking[0].category.as_deref(), Some("cat-14"));
        assert_eq!(ranking[9].category.as_deref(), Some("cat-5"));
    }

    #[test]
    fn timeline_groups_by_month_and_skips_missing_deadlines() {
        let table = vec![
            due(1.0, deadline(2024, 3, 30)),
            due(1.0, deadline(2023, 12, 1)),
            due(1.0, None),
            due(1.0, deadline(2024, 3, 2)),
            due(1.0, deadline(2024, 1, 15)),
        ];
        let timeline = monthly_timeline(&table);
        let labels: Vec<(&str, usize)> = timeline.iter().map(|m| (m.label.as_str(), m.count)).collect();
        assert_eq!(labels, vec![("2023-12", 1), ("2024-01", 1), ("2024-03", 2)]);
    }

    #[test]
    fn timeline_without_deadlines_is_empty() {
        assert!(monthly_timeline(&[due(1.0, None)]).is_empty());
    }

    #[test]
    fn value_counts_skip_nulls_and_sort_by_frequency() {
        let sector = |code: Option<&str>| TenderRecord {
            procurement_sector_code: code.map(str::to_string),
            ..TenderRecord::with_cost(1.0)
        };
        let table = vec![
            sector(Some("UTILITY")),
            sector(Some("PUBLIC")),
            sector(None),
            sector(Some("PUBLIC")),
            sector(Some("DEFENCE")),
        ];
        let counts = value_counts(&table, CategoryField::Sector);
        assert_eq!(
            counts,
            vec![
                ValueCount { value: "PUBLIC".into(), count: 2 },
                ValueCount { value: "UTILITY".into(), count: 1 },
                ValueCount { value: "DEFENCE".into(), count: 1 },
            ]
        );
    }

    #[test]
    fn recent_tenders_put_missing_deadlines_last() {
        let table = vec![
            due(1_500.0, None),
            due(2_000_000.0, deadline(2024, 5, 1)),
            due(10.0, deadline(2024, 6, 1)),
        ];
        let recent = recent_tenders(&table, 20);
        let shown: Vec<&str> = recent.iter().map(|r| r.estimated_cost.as_str()).collect();
        assert_eq!(shown, vec!["€10", "€2,000,000", "€1,500"]);
        assert_eq!(recent_tenders(&table, 1).len(), 1);
    }
}
