use chrono::NaiveDateTime;
use serde::Serialize;

/// One published procurement from `estonian_tender_details`.
///
/// Costs are euros. Timestamps are naive wall-clock values; a value that
/// could not be parsed at load time is `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TenderRecord {
    pub procurement_id: Option<String>,
    pub tender_name: Option<String>,
    pub short_description: Option<String>,
    pub estimated_cost: f64,
    pub is_cost_classified: Option<bool>,
    pub show_cost: Option<bool>,
    pub procedure_type_code: Option<String>,
    pub procurement_type_code: Option<String>,
    pub procurement_sector_code: Option<String>,
    pub primary_cpv_code: Option<String>,
    pub primary_cpv_name: Option<String>,
    pub nuts_code: Option<String>,
    pub location_additional_info: Option<String>,
    pub submission_deadline: Option<NaiveDateTime>,
    pub publication_date: Option<NaiveDateTime>,
    pub duration_in_months: Option<i32>,
    pub is_eu_financing: Option<bool>,
    pub is_green: Option<bool>,
    pub has_social_aspects: Option<bool>,
    pub has_innovative_aspects: Option<bool>,
    pub created_at: Option<NaiveDateTime>,
}

/// The working table; row order carries no meaning after filtering.
pub type TenderTable = Vec<TenderRecord>;

/// Categorical columns that can be filtered or counted by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoryField {
    Sector,
    ProcedureType,
}

impl CategoryField {
    pub fn value<'a>(&self, record: &'a TenderRecord) -> Option<&'a str> {
        match self {
            Self::Sector => record.procurement_sector_code.as_deref(),
            Self::ProcedureType => record.procedure_type_code.as_deref(),
        }
    }
}

impl TenderRecord {
    #[cfg(test)]
    pub fn with_cost(estimated_cost: f64) -> Self {
        Self {
            estimated_cost,
            ..Self::default()
        }
    }
}
