use serde::Serialize;
use std::collections::HashMap;
use tabled::Tabled;

/// One complaint row after loading. All fields are kept as opaque strings;
/// grouping is by exact string equality, no normalization.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplaintRecord {
    pub row_id: String,
    pub category: String,
    pub subcategory: String,
    pub person_id: String,
    pub household_id: String,
    pub island: String,
    pub atoll: String,
}

/// The two independent geographic partitionings of the record set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationLevel {
    Atoll,
    Island,
}

impl LocationLevel {
    pub fn parse(s: &str) -> Option<LocationLevel> {
        match s.trim().to_lowercase().as_str() {
            "atoll" => Some(LocationLevel::Atoll),
            "island" => Some(LocationLevel::Island),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            LocationLevel::Atoll => "Atoll",
            LocationLevel::Island => "Island",
        }
    }
}

/// Reference totals for one location, from the optional population table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PopulationTotals {
    pub total_population: u64,
    pub total_households: u64,
}

/// Keyed by (location name, level); at most one entry per key.
pub type PopulationMap = HashMap<(String, LocationLevel), PopulationTotals>;

/// One ranked entry in an analysis table.
///
/// `pct_surveyed` is always present (groups with zero records are never
/// emitted, so the denominator is nonzero). `pct_population` is `None` when
/// no population entry matches the location or its total is zero; callers
/// must not conflate that with 0%.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRow {
    pub subcategory: String,
    pub count: usize,
    pub pct_surveyed: f64,
    pub pct_population: Option<f64>,
}

/// All three analyses for a single atoll or island.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationReport {
    pub name: String,
    pub total_complaints: usize,
    pub total_individuals: usize,
    pub total_households: usize,
    pub population: Option<PopulationTotals>,
    /// Top subcategories by raw complaint count.
    pub complaints: Vec<RankedRow>,
    /// Top subcategories by distinct person_id.
    pub individuals: Vec<RankedRow>,
    /// Top subcategories by distinct household_id.
    pub households: Vec<RankedRow>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryStats {
    pub total_complaints: usize,
    pub total_individuals: usize,
    pub total_households: usize,
    pub atolls: usize,
    pub islands: usize,
    pub skipped_rows: usize,
}

/// The full report: one pass of the aggregator over one loaded table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub summary: SummaryStats,
    pub by_atoll: Vec<LocationReport>,
    pub by_island: Vec<LocationReport>,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct ComplaintCountRow {
    #[serde(rename = "Subcategory")]
    #[tabled(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "Complaints")]
    #[tabled(rename = "Complaints")]
    pub count: String,
    #[serde(rename = "PctOfComplaints")]
    #[tabled(rename = "PctOfComplaints")]
    pub pct_surveyed: String,
}

#[derive(Debug, Serialize, Tabled, Clone)]
pub struct DistinctCountRow {
    #[serde(rename = "Subcategory")]
    #[tabled(rename = "Subcategory")]
    pub subcategory: String,
    #[serde(rename = "Count")]
    #[tabled(rename = "Count")]
    pub count: String,
    #[serde(rename = "PctOfSurveyed")]
    #[tabled(rename = "PctOfSurveyed")]
    pub pct_surveyed: String,
    #[serde(rename = "PctOfPopulation")]
    #[tabled(rename = "PctOfPopulation")]
    pub pct_population: String,
}
