//! Tender table loader.
//!
//! Issues the single dashboard query and coerces rows into
//! [`TenderRecord`]s. Timestamp and cost columns are read as text and parsed
//! here so one malformed value only affects its own row instead of failing the
//! load. Postgres `numeric` admits `'NaN'`, which passes `estimated_cost > 0`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use sqlx::PgPool;
use std::future::Future;
use std::str::FromStr;
use std::time::Instant;

use crate::domain::{TenderRecord, TenderTable};
use crate::error::DashboardResult;

/// Something that can produce the full tender table.
pub trait TenderSource: Send + Sync {
    fn load(&self) -> impl Future<Output = DashboardResult<TenderTable>> + Send;
}

const TENDER_QUERY: &str = r#"
SELECT
    procurement_id::text AS procurement_id,
    tender_name::text AS tender_name,
    short_description::text AS short_description,
    estimated_cost::text AS estimated_cost,
    is_cost_classified::boolean AS is_cost_classified,
    show_cost::boolean AS show_cost,
    procedure_type_code::text AS procedure_type_code,
    procurement_type_code::text AS procurement_type_code,
    procurement_sector_code::text AS procurement_sector_code,
    primary_cpv_code::text AS primary_cpv_code,
    primary_cpv_name::text AS primary_cpv_name,
    nuts_code::text AS nuts_code,
    location_additional_info::text AS location_additional_info,
    submission_deadline::text AS submission_deadline,
    publication_date::text AS publication_date,
    duration_in_months::int4 AS duration_in_months,
    is_eu_financing::boolean AS is_eu_financing,
    is_green::boolean AS is_green,
    has_social_aspects::boolean AS has_social_aspects,
    has_innovative_aspects::boolean AS has_innovative_aspects,
    created_at::text AS created_at
FROM estonian_tender_details
WHERE estimated_cost IS NOT NULL
AND estimated_cost > 0
ORDER BY estimated_cost DESC
"#;

#[derive(Debug, Default, sqlx::FromRow)]
struct TenderRow {
    procurement_id: Option<String>,
    tender_name: Option<String>,
    short_description: Option<String>,
    estimated_cost: Option<String>,
    is_cost_classified: Option<bool>,
    show_cost: Option<bool>,
    procedure_type_code: Option<String>,
    procurement_type_code: Option<String>,
    procurement_sector_code: Option<String>,
    primary_cpv_code: Option<String>,
    primary_cpv_name: Option<String>,
    nuts_code: Option<String>,
    location_additional_info: Option<String>,
    submission_deadline: Option<String>,
    publication_date: Option<String>,
    duration_in_months: Option<i32>,
    is_eu_financing: Option<bool>,
    is_green: Option<bool>,
    has_social_aspects: Option<bool>,
    has_innovative_aspects: Option<bool>,
    created_at: Option<String>,
}

/// Loads tenders from the `estonian_tender_details` table.
#[derive(Clone)]
pub struct PgTenderSource {
    pool: PgPool,
}

impl PgTenderSource {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl TenderSource for PgTenderSource {
    fn load(&self) -> impl Future<Output = DashboardResult<TenderTable>> + Send {
        async move {
            let started = Instant::now();

            let rows: Vec<TenderRow> = sqlx::query_as(TENDER_QUERY).fetch_all(&self.pool).await?;
            let fetched = rows.len();
            let (table, coercion) = coerce_rows(rows);

            if coercion.malformed_dates > 0 || coercion.missing_costs > 0 || coercion.invalid_costs > 0 {
                tracing::debug!(
                    malformed_dates = coercion.malformed_dates,
                    missing_costs = coercion.missing_costs,
                    invalid_costs = coercion.invalid_costs,
                    "Absorbed malformed tender fields"
                );
            }

            tracing::info!(
                fetched,
                loaded = table.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "Loaded tender table"
            );

            Ok(table)
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct Coercion {
    malformed_dates: usize,
    missing_costs: usize,
    invalid_costs: usize,
}

fn coerce_rows(rows: Vec<TenderRow>) -> (TenderTable, Coercion) {
    let mut coercion = Coercion::default();
    let table = rows
        .into_iter()
        .filter_map(|row| coerce_row(row, &mut coercion))
        .collect();
    (table, coercion)
}

fn coerce_row(row: TenderRow, coercion: &mut Coercion) -> Option<TenderRecord> {
    let procurement_id = row.procurement_id.as_deref().unwrap_or("<none>");
    let Some(raw_cost) = row.estimated_cost.as_deref() else {
        tracing::warn!(procurement_id, "Skipping tender without an estimated cost");
        coercion.missing_costs += 1;
        return None;
    };
    let Some(estimated_cost) = parse_cost(raw_cost) else {
        tracing::warn!(procurement_id, raw_cost, "Skipping tender with an unusable estimated cost");
        coercion.invalid_costs += 1;
        return None;
    };

    let mut timestamp = |raw: Option<String>| {
        let raw = raw?;
        let parsed = parse_timestamp(&raw);
        if parsed.is_none() {
            coercion.malformed_dates += 1;
        }
        parsed
    };

    Some(TenderRecord {
        submission_deadline: timestamp(row.submission_deadline),
        publication_date: timestamp(row.publication_date),
        created_at: timestamp(row.created_at),
        procurement_id: row.procurement_id,
        tender_name: row.tender_name,
        short_description: row.short_description,
        estimated_cost,
        is_cost_classified: row.is_cost_classified,
        show_cost: row.show_cost,
        procedure_type_code: row.procedure_type_code,
        procurement_type_code: row.procurement_type_code,
        procurement_sector_code: row.procurement_sector_code,
        primary_cpv_code: row.primary_cpv_code,
        primary_cpv_name: row.primary_cpv_name,
        nuts_code: row.nuts_code,
        location_additional_info: row.location_additional_info,
        duration_in_months: row.duration_in_months,
        is_eu_financing: row.is_eu_financing,
        is_green: row.is_green,
        has_social_aspects: row.has_social_aspects,
        has_innovative_aspects: row.has_innovative_aspects,
    })
}

/// Parses a `numeric` rendered as text; only finite positive amounts are usable.
fn parse_cost(raw: &str) -> Option<f64> {
    let raw = raw.trim();
    let decimal = Decimal::from_str(raw)
        .or_else(|_| Decimal::from_scientific(raw))
        .ok()?;
    decimal.to_f64().filter(|cost| cost.is_finite() && *cost > 0.0)
}

const OFFSET_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f%#z", "%Y-%m-%dT%H:%M:%S%.f%#z"];
const NAIVE_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Lenient timestamp parsing; offsets are dropped and the wall-clock time kept.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.naive_local());
    }
    if let Some(parsed) = OFFSET_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed.naive_local());
    }
    if let Some(parsed) = NAIVE_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
    {
        return Some(parsed);
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Timelike};

    fn ymd_hms(raw: &str) -> Option<(i32, u32, u32, u32, u32)> {
        parse_timestamp(raw).map(|t| (t.year(), t.month(), t.day(), t.hour(), t.minute()))
    }

    #[test]
    fn parses_postgres_text_timestamps() {
        assert_eq!(ymd_hms("2024-03-01 12:30:00+02"), Some((2024, 3, 1, 12, 30)));
        assert_eq!(ymd_hms("2024-03-01 12:30:00.123456+05:30"), Some((2024, 3, 1, 12, 30)));
        assert_eq!(ymd_hms("2024-03-01 12:30:00"), Some((2024, 3, 1, 12, 30)));
        assert_eq!(ymd_hms("2024-03-01 12:30:00.5"), Some((2024, 3, 1, 12, 30)));
    }

    #[test]
    fn parses_iso_and_bare_dates() {
        assert_eq!(ymd_hms("2024-03-01T23:59:00Z"), Some((2024, 3, 1, 23, 59)));
        assert_eq!(ymd_hms("2024-03-01T08:15"), Some((2024, 3, 1, 8, 15)));
        assert_eq!(ymd_hms(" 2023-12-31 "), Some((2023, 12, 31, 0, 0)));
    }

    #[test]
    fn garbage_becomes_absent() {
        for raw in ["", "   ", "not a date", "2024-02-30", "infinity", "31/12/2023"] {
            assert_eq!(parse_timestamp(raw), None, "{raw:?}");
        }
    }

    #[test]
    fn malformed_dates_keep_the_row() {
        let row = TenderRow {
            procurement_id: Some("7001".into()),
            estimated_cost: Some("12500.50".into()),
            submission_deadline: Some("sometime soon".into()),
            publication_date: Some("2024-01-05 09:00:00+02".into()),
            created_at: None,
            primary_cpv_name: Some("Construction work".into()),
            ..TenderRow::default()
        };

        let (table, coercion) = coerce_rows(vec![row]);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].estimated_cost, 12_500.5);
        assert_eq!(table[0].submission_deadline, None);
        assert!(table[0].publication_date.is_some());
        assert_eq!(table[0].created_at, None);
        assert_eq!(table[0].primary_cpv_name.as_deref(), Some("Construction work"));
        assert_eq!(
            coercion,
            Coercion {
                malformed_dates: 1,
                missing_costs: 0,
                invalid_costs: 0,
            }
        );
    }

    #[test]
    fn rows_without_cost_are_skipped() {
        let rows = vec![
            TenderRow::default(),
            TenderRow {
                estimated_cost: Some("900".into()),
                ..TenderRow::default()
            },
        ];
        let (table, coercion) = coerce_rows(rows);
        assert_eq!(table.len(), 1);
        assert_eq!(coercion.missing_costs, 1);
    }

    #[test]
    fn nan_cost_drops_only_its_row() {
        let row = |id: &str, cost: &str| TenderRow {
            procurement_id: Some(id.into()),
            estimated_cost: Some(cost.into()),
            ..TenderRow::default()
        };
        let rows = vec![
            row("1", "250000"),
            row("2", "NaN"),
            row("3", "1500.75"),
            row("4", "Infinity"),
            row("5", "0"),
        ];

        let (table, coercion) = coerce_rows(rows);
        let ids: Vec<_> = table.iter().filter_map(|t| t.procurement_id.as_deref()).collect();
        assert_eq!(ids, vec!["1", "3"]);
        assert_eq!(table[1].estimated_cost, 1_500.75);
        assert_eq!(coercion.invalid_costs, 3);
        assert_eq!(coercion.missing_costs, 0);
    }

    #[test]
    fn cost_text_parsing() {
        assert_eq!(parse_cost("12500.50"), Some(12_500.5));
        assert_eq!(parse_cost(" 42 "), Some(42.0));
        assert_eq!(parse_cost("1.5e3"), Some(1_500.0));
        for raw in ["NaN", "-Infinity", "-10", "0.00", "", "abc"] {
            assert_eq!(parse_cost(raw), None, "{raw:?}");
        }
    }
}
