//! Logarithmic cost histogram.
//!
//! Procurement costs are heavy-tailed, so bucket edges are spaced evenly in
//! `log10` space between the smallest and largest cost. Buckets are
//! half-open `[low, high)` except the last one, which also includes its
//! upper edge so the most expensive tender is always counted.

use serde::Serialize;
use std::num::NonZeroUsize;

use super::format::format_cost;
use crate::domain::TenderRecord;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostBucket {
    pub index: usize,
    pub low: f64,
    pub high: f64,
    pub label: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostHistogram {
    /// `bucket_count + 1` non-decreasing edges.
    pub edges: Vec<f64>,
    /// Ascending by cost.
    pub buckets: Vec<CostBucket>,
    /// Bucket index of each input row, in input order.
    #[serde(skip)]
    pub assignments: Vec<usize>,
}

/// Partitions the table's costs into `bucket_count` log-spaced buckets.
///
/// Returns `None` for an empty table. When every cost is identical all edges
/// coincide and every row lands in bucket 0.
pub fn bucketize(table: &[TenderRecord], bucket_count: NonZeroUsize) -> Option<CostHistogram> {
    if table.is_empty() {
        return None;
    }

    let (min_cost, max_cost) = positive_bounds(table).unwrap_or((0.0, 0.0));
    let edges = log_edges(min_cost, max_cost, bucket_count.get());

    let assignments: Vec<usize> = table
        .iter()
        .map(|record| bucket_index(&edges, record.estimated_cost))
        .collect();

    let mut counts = vec![0usize; bucket_count.get()];
    for &index in &assignments {
        counts[index] += 1;
    }

    let buckets = edges
        .windows(2)
        .zip(counts)
        .enumerate()
        .map(|(index, (pair, count))| CostBucket {
            index,
            low: pair[0],
            high: pair[1],
            label: format!("{} - {}", format_cost(pair[0]), format_cost(pair[1])),
            count,
        })
        .collect();

    Some(CostHistogram {
        edges,
        buckets,
        assignments,
    })
}

/// Min and max over costs that can be placed on a log axis.
fn positive_bounds(table: &[TenderRecord]) -> Option<(f64, f64)> {
    table
        .iter()
        .map(|record| record.estimated_cost)
        .filter(|cost| cost.is_finite() && *cost > 0.0)
        .fold(None, |bounds, cost| match bounds {
            None => Some((cost, cost)),
            Some((lo, hi)) => Some((f64::min(lo, cost), f64::max(hi, cost))),
        })
}

/// `count + 1` edges evenly spaced between `log10(min)` and `log10(max)`.
///
/// The outer edges are exactly `min` and `max`; inner edges are clamped so
/// the sequence never decreases even when rounding misbehaves.
pub fn log_edges(min_cost: f64, max_cost: f64, count: usize) -> Vec<f64> {
    if !(min_cost < max_cost) {
        return vec![min_cost; count + 1];
    }

    let log_min = min_cost.log10();
    let log_max = max_cost.log10();
    let step = (log_max - log_min) / count as f64;

    let mut edges = Vec::with_capacity(count + 1);
    let mut previous = min_cost;
    for i in 0..=count {
        let edge = if i == 0 {
            min_cost
        } else if i == count {
            max_cost
        } else {
            10f64
                .powf(log_min + step * i as f64)
                .clamp(previous, max_cost)
        };
        edges.push(edge);
        previous = edge;
    }
    edges
}

/// Index `i` with `edges[i] <= cost < edges[i + 1]`; the top edge belongs to
/// the last bucket and anything at or below the bottom edge to the first.
fn bucket_index(edges: &[f64], cost: f64) -> usize {
    let last = edges.len() - 2;

    if !(cost > edges[0]) {
        return 0;
    }
    if cost >= edges[last + 1] {
        return last;
    }
    edges[1..=last].partition_point(|&edge| edge <= cost)
}
