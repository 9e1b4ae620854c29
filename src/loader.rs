use crate::types::{ComplaintRecord, LocationLevel, PopulationMap, PopulationTotals};
use crate::util::parse_u64_safe;
use csv::{ReaderBuilder, StringRecord};
use std::io::Read;
use thiserror::Error;

pub const COMPLAINT_COLUMNS: [&str; 7] = [
    "category",
    "subcategory",
    "person_id",
    "household_id",
    "row_id",
    "island",
    "atoll",
];

pub const POPULATION_COLUMNS: [&str; 4] = [
    "location_name",
    "level",
    "total_population",
    "total_households",
];

#[derive(Debug, Error)]
pub enum LoadError {
    /// Fatal: the input header is missing required columns. Surfaced before
    /// any row is read so the caller never sees a partial result.
    #[error("missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },
    #[error(transparent)]
    Csv(#[from] csv::Error),
}

/// Per-load diagnostics. Skipped rows are counted here and carried through
/// to the report's summary stats, never silently dropped.
#[derive(Debug, Clone, Default)]
pub struct LoadReport {
    pub total_rows: usize,
    pub loaded_rows: usize,
    pub skipped_rows: usize,
}

/// Map each required column name to its position in the header.
///
/// Matching is case-insensitive and order-independent; surrounding
/// whitespace in header cells is ignored. If any required column is absent
/// the whole load fails with a `Schema` error naming all of them at once.
fn resolve_columns(headers: &StringRecord, required: &[&str]) -> Result<Vec<usize>, LoadError> {
    let mut indices = Vec::with_capacity(required.len());
    let mut missing = Vec::new();
    for name in required {
        match headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
        {
            Some(i) => indices.push(i),
            None => missing.push((*name).to_string()),
        }
    }
    if missing.is_empty() {
        Ok(indices)
    } else {
        Err(LoadError::Schema { missing })
    }
}

/// Load complaint records from CSV.
///
/// Rows with any required field empty are skipped and counted in the
/// returned `LoadReport`; a malformed CSV row counts as skipped too.
pub fn load_complaints<R: Read>(input: R) -> Result<(Vec<ComplaintRecord>, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let cols = resolve_columns(rdr.headers()?, &COMPLAINT_COLUMNS)?;

    let mut report = LoadReport::default();
    let mut records = Vec::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let fields: Vec<&str> = cols
            .iter()
            .map(|&i| row.get(i).map(str::trim).unwrap_or(""))
            .collect();
        if fields.iter().any(|f| f.is_empty()) {
            report.skipped_rows += 1;
            continue;
        }
        records.push(ComplaintRecord {
            category: fields[0].to_string(),
            subcategory: fields[1].to_string(),
            person_id: fields[2].to_string(),
            household_id: fields[3].to_string(),
            row_id: fields[4].to_string(),
            island: fields[5].to_string(),
            atoll: fields[6].to_string(),
        });
    }
    report.loaded_rows = records.len();
    Ok((records, report))
}

/// Load the optional population reference table from CSV.
///
/// Rows with an unknown level or unparseable totals are skipped and
/// counted. At most one entry per (name, level) pair is kept: the first
/// occurrence wins and later duplicates count as skipped.
pub fn load_population<R: Read>(input: R) -> Result<(PopulationMap, LoadReport), LoadError> {
    let mut rdr = ReaderBuilder::new().flexible(true).from_reader(input);
    let cols = resolve_columns(rdr.headers()?, &POPULATION_COLUMNS)?;

    let mut report = LoadReport::default();
    let mut map = PopulationMap::new();
    for result in rdr.records() {
        report.total_rows += 1;
        let row = match result {
            Ok(r) => r,
            Err(_) => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let get = |slot: usize| row.get(cols[slot]).map(str::trim);
        let name = match get(0) {
            Some(n) if !n.is_empty() => n.to_string(),
            _ => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let level = match get(1).and_then(LocationLevel::parse) {
            Some(l) => l,
            None => {
                report.skipped_rows += 1;
                continue;
            }
        };
        let (total_population, total_households) =
            match (parse_u64_safe(get(2)), parse_u64_safe(get(3))) {
                (Some(p), Some(h)) => (p, h),
                _ => {
                    report.skipped_rows += 1;
                    continue;
                }
            };
        let key = (name, level);
        if map.contains_key(&key) {
            report.skipped_rows += 1;
            continue;
        }
        map.insert(
            key,
            PopulationTotals {
                total_population,
                total_households,
            },
        );
    }
    report.loaded_rows = map.len();
    Ok((map, report))
}
