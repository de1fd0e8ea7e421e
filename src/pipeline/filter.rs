//! Record filtering and filter option discovery.

use serde::Serialize;

use crate::domain::{CategoryField, TenderRecord, TenderTable};

/// Sentinel meaning "do not filter this column".
pub const ALL: &str = "All";

/// Inclusive cost bounds in euros.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CostRange {
    pub min: f64,
    pub max: f64,
}

impl CostRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// An inverted or NaN range contains nothing.
    pub fn contains(&self, cost: f64) -> bool {
        self.min <= cost && cost <= self.max
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryFilter {
    All,
    Only(String),
}

impl Serialize for CategoryFilter {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::All => serializer.serialize_str(ALL),
            Self::Only(value) => serializer.serialize_str(value),
        }
    }
}

impl CategoryFilter {
    /// Maps a user selection to a filter; missing, blank and `"All"` pass everything.
    ///
    /// Any other value is kept byte for byte, so padded codes still match.
    pub fn from_selection(selection: Option<&str>) -> Self {
        match selection {
            None | Some(ALL) => Self::All,
            Some(value) if value.trim().is_empty() => Self::All,
            Some(value) => Self::Only(value.to_string()),
        }
    }

    pub fn matches(&self, value: Option<&str>) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => value == Some(wanted.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TenderFilter {
    pub cost_range: CostRange,
    pub sector: CategoryFilter,
    pub procedure: CategoryFilter,
}

impl TenderFilter {
    pub fn matches(&self, record: &TenderRecord) -> bool {
        self.cost_range.contains(record.estimated_cost)
            && self.sector.matches(CategoryField::Sector.value(record))
            && self.procedure.matches(CategoryField::ProcedureType.value(record))
    }
}

/// Keeps the records matching every predicate of `filter`.
pub fn apply(table: &[TenderRecord], filter: &TenderFilter) -> TenderTable {
    table
        .iter()
        .filter(|record| filter.matches(record))
        .cloned()
        .collect()
}

/// Choices a caller can filter by, derived once per loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterOptions {
    pub sectors: Vec<String>,
    pub procedures: Vec<String>,
    /// `None` when the table is empty.
    pub cost_bounds: Option<CostRange>,
}

impl FilterOptions {
    pub fn from_table(table: &[TenderRecord]) -> Self {
        let cost_bounds = table
            .iter()
            .map(|record| record.estimated_cost)
            .filter(|cost| !cost.is_nan())
            .fold(None, |bounds: Option<CostRange>, cost| {
                Some(match bounds {
                    None => CostRange::new(cost, cost),
                    Some(b) => CostRange::new(b.min.min(cost), b.max.max(cost)),
                })
            });

        Self {
            sectors: distinct_values(table, CategoryField::Sector),
            procedures: distinct_values(table, CategoryField::ProcedureType),
            cost_bounds,
        }
    }

    /// Resolves a user selection against this table; omitted cost bounds
    /// default to the full table range.
    pub fn resolve(
        &self,
        min_cost: Option<f64>,
        max_cost: Option<f64>,
        sector: Option<&str>,
        procedure: Option<&str>,
    ) -> TenderFilter {
        let (default_min, default_max) = match self.cost_bounds {
            Some(bounds) => (bounds.min, bounds.max),
            None => (0.0, f64::INFINITY),
        };

        TenderFilter {
            cost_range: CostRange::new(
                min_cost.unwrap_or(default_min),
                max_cost.unwrap_or(default_max),
            ),
            sector: CategoryFilter::from_selection(sector),
            procedure: CategoryFilter::from_selection(procedure),
        }
    }
}

fn distinct_values(table: &[TenderRecord], field: CategoryField) -> Vec<String> {
    let mut values: Vec<String> = table
        .iter()
        .filter_map(|record| field.value(record))
        .map(str::to_string)
        .collect();
    values.sort();
    values.dedup();
    values
}
