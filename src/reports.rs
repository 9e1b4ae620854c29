use crate::types::{
    ComplaintRecord, LocationLevel, LocationReport, PopulationMap, RankedRow, Report, SummaryStats,
};
use std::collections::{BTreeMap, HashMap, HashSet};

/// Each analysis table keeps at most this many subcategories.
pub const TOP_N: usize = 20;

/// Build the full report from loaded records and the (possibly empty)
/// population reference. Pure: same inputs, same report, regardless of row
/// order.
pub fn aggregate(
    records: &[ComplaintRecord],
    population: &PopulationMap,
    skipped_rows: usize,
) -> Report {
    let by_atoll = analyze_level(records, LocationLevel::Atoll, population);
    let by_island = analyze_level(records, LocationLevel::Island, population);

    let individuals: HashSet<&str> = records.iter().map(|r| r.person_id.as_str()).collect();
    let households: HashSet<&str> = records.iter().map(|r| r.household_id.as_str()).collect();
    let summary = SummaryStats {
        total_complaints: records.len(),
        total_individuals: individuals.len(),
        total_households: households.len(),
        atolls: by_atoll.len(),
        islands: by_island.len(),
        skipped_rows,
    };

    Report {
        summary,
        by_atoll,
        by_island,
    }
}

fn location_of<'a>(r: &'a ComplaintRecord, level: LocationLevel) -> &'a str {
    match level {
        LocationLevel::Atoll => &r.atoll,
        LocationLevel::Island => &r.island,
    }
}

/// Partition the records by one geography level and analyze each group.
///
/// A `BTreeMap` keeps the location order deterministic (sorted by name).
/// Only locations actually observed in the data appear; there is no such
/// thing as an empty group.
fn analyze_level(
    records: &[ComplaintRecord],
    level: LocationLevel,
    population: &PopulationMap,
) -> Vec<LocationReport> {
    let mut groups: BTreeMap<&str, Vec<&ComplaintRecord>> = BTreeMap::new();
    for r in records {
        groups.entry(location_of(r, level)).or_default().push(r);
    }
    groups
        .into_iter()
        .map(|(name, rows)| analyze_location(name, &rows, level, population))
        .collect()
}

fn analyze_location(
    name: &str,
    rows: &[&ComplaintRecord],
    level: LocationLevel,
    population: &PopulationMap,
) -> LocationReport {
    let population = population.get(&(name.to_string(), level)).copied();

    // Raw complaint counts per subcategory. No population percentage here:
    // complaints are events, not people.
    let mut complaint_counts: HashMap<&str, usize> = HashMap::new();
    for r in rows {
        *complaint_counts.entry(r.subcategory.as_str()).or_default() += 1;
    }
    let total_complaints = rows.len();
    let complaints = rank(complaint_counts, total_complaints, None);

    let (individuals, total_individuals) = distinct_analysis(
        rows,
        |r| r.person_id.as_str(),
        population.map(|p| p.total_population),
    );
    let (households, total_households) = distinct_analysis(
        rows,
        |r| r.household_id.as_str(),
        population.map(|p| p.total_households),
    );

    LocationReport {
        name: name.to_string(),
        total_complaints,
        total_individuals,
        total_households,
        population,
        complaints,
        individuals,
        households,
    }
}

/// Count distinct ids (persons or households) per subcategory within one
/// location, and distinct ids across the whole location for the surveyed
/// denominator.
fn distinct_analysis<'a, F>(
    rows: &[&'a ComplaintRecord],
    id: F,
    population_total: Option<u64>,
) -> (Vec<RankedRow>, usize)
where
    F: Fn(&'a ComplaintRecord) -> &'a str,
{
    let mut per_subcategory: HashMap<&str, HashSet<&str>> = HashMap::new();
    let mut overall: HashSet<&str> = HashSet::new();
    for &r in rows {
        let i = id(r);
        per_subcategory
            .entry(r.subcategory.as_str())
            .or_default()
            .insert(i);
        overall.insert(i);
    }
    let counts: HashMap<&str, usize> = per_subcategory
        .into_iter()
        .map(|(k, ids)| (k, ids.len()))
        .collect();
    let surveyed_total = overall.len();
    (rank(counts, surveyed_total, population_total), surveyed_total)
}

/// Turn per-subcategory counts into ranked rows: sort by count descending,
/// tie-break by name ascending, truncate to `TOP_N`.
///
/// `surveyed_total` is nonzero for every emitted group. A missing or zero
/// population total leaves `pct_population` absent rather than dividing.
fn rank(
    counts: HashMap<&str, usize>,
    surveyed_total: usize,
    population_total: Option<u64>,
) -> Vec<RankedRow> {
    let population_total = population_total.filter(|&t| t > 0);
    let mut rows: Vec<RankedRow> = counts
        .into_iter()
        .map(|(subcategory, count)| RankedRow {
            subcategory: subcategory.to_string(),
            count,
            pct_surveyed: count as f64 / surveyed_total as f64 * 100.0,
            pct_population: population_total.map(|t| count as f64 / t as f64 * 100.0),
        })
        .collect();
    rows.sort_by(|a, b| {
        b.count
            .cmp(&a.count)
            .then_with(|| a.subcategory.cmp(&b.subcategory))
    });
    rows.truncate(TOP_N);
    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::PopulationTotals;

    fn rec(row_id: &str, subcategory: &str, person: &str, household: &str, atoll: &str) -> ComplaintRecord {
        ComplaintRecord {
            row_id: row_id.to_string(),
            category: "general".to_string(),
            subcategory: subcategory.to_string(),
            person_id: person.to_string(),
            household_id: household.to_string(),
            island: format!("{atoll}-island"),
            atoll: atoll.to_string(),
        }
    }

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn complaint_counts_sum_to_group_total() {
        let records = vec![
            rec("1", "noise", "P1", "H1", "A"),
            rec("2", "noise", "P2", "H2", "A"),
            rec("3", "theft", "P1", "H1", "A"),
            rec("4", "waste", "P3", "H3", "B"),
        ];
        let report = aggregate(&records, &PopulationMap::new(), 0);
        for loc in report.by_atoll.iter().chain(report.by_island.iter()) {
            let sum: usize = loc.complaints.iter().map(|r| r.count).sum();
            assert_eq!(sum, loc.total_complaints);
        }
    }

    #[test]
    fn three_record_scenario_matches_expected_tables() {
        let records = vec![
            rec("1", "noise", "P1", "H1", "A"),
            rec("2", "noise", "P2", "H2", "A"),
            rec("3", "theft", "P1", "H1", "A"),
        ];
        let report = aggregate(&records, &PopulationMap::new(), 0);
        assert_eq!(report.by_atoll.len(), 1);
        let a = &report.by_atoll[0];
        assert_eq!(a.name, "A");
        assert_eq!(a.total_complaints, 3);
        assert_eq!(a.total_individuals, 2);
        assert_eq!(a.total_households, 2);

        assert_eq!(a.complaints[0].subcategory, "noise");
        assert_eq!(a.complaints[0].count, 2);
        assert!(approx(a.complaints[0].pct_surveyed, 200.0 / 3.0));
        assert_eq!(a.complaints[1].subcategory, "theft");
        assert_eq!(a.complaints[1].count, 1);
        assert!(approx(a.complaints[1].pct_surveyed, 100.0 / 3.0));

        // Distinct persons: noise filed by P1 and P2, theft only by P1;
        // percentages over the 2 distinct individuals in the atoll.
        assert_eq!(a.individuals[0].subcategory, "noise");
        assert_eq!(a.individuals[0].count, 2);
        assert!(approx(a.individuals[0].pct_surveyed, 100.0));
        assert_eq!(a.individuals[1].count, 1);
        assert!(approx(a.individuals[1].pct_surveyed, 50.0));
        assert!(a.individuals[0].pct_population.is_none());
    }

    #[test]
    fn distinct_counts_never_exceed_group_totals() {
        let records = vec![
            rec("1", "noise", "P1", "H1", "A"),
            rec("2", "noise", "P1", "H1", "A"),
            rec("3", "theft", "P2", "H1", "A"),
        ];
        let report = aggregate(&records, &PopulationMap::new(), 0);
        let a = &report.by_atoll[0];
        assert!(a.total_individuals <= a.total_complaints);
        for row in &a.individuals {
            assert!(row.count <= a.total_complaints);
        }
        assert_eq!(a.total_households, 1);
    }

    #[test]
    fn top_20_truncation_with_name_tiebreak() {
        let mut records = Vec::new();
        for i in 0..25 {
            let sub = format!("sub{:02}", i);
            records.push(rec(&format!("{i}"), &sub, &format!("P{i}"), &format!("H{i}"), "A"));
        }
        let report = aggregate(&records, &PopulationMap::new(), 0);
        let a = &report.by_atoll[0];
        assert_eq!(a.complaints.len(), TOP_N);
        // All counts tie at 1, so the rows come out in name order.
        let names: Vec<&str> = a.complaints.iter().map(|r| r.subcategory.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert_eq!(names[0], "sub00");
        assert_eq!(names[19], "sub19");
    }

    #[test]
    fn aggregation_is_order_independent_and_idempotent() {
        let records = vec![
            rec("1", "noise", "P1", "H1", "A"),
            rec("2", "theft", "P2", "H2", "B"),
            rec("3", "noise", "P3", "H1", "A"),
            rec("4", "waste", "P1", "H3", "B"),
        ];
        let mut shuffled = records.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        let pop = PopulationMap::from([(
            ("A".to_string(), LocationLevel::Atoll),
            PopulationTotals {
                total_population: 50,
                total_households: 10,
            },
        )]);
        let first = aggregate(&records, &pop, 1);
        let second = aggregate(&records, &pop, 1);
        let reordered = aggregate(&shuffled, &pop, 1);
        assert_eq!(first, second);
        assert_eq!(first, reordered);
    }

    #[test]
    fn empty_input_yields_empty_report() {
        let report = aggregate(&[], &PopulationMap::new(), 0);
        assert!(report.by_atoll.is_empty());
        assert!(report.by_island.is_empty());
        assert_eq!(report.summary.total_complaints, 0);
        assert_eq!(report.summary.total_individuals, 0);
    }

    #[test]
    fn population_percentages_present_only_with_matching_entry() {
        let records = vec![
            rec("1", "noise", "P1", "H1", "A"),
            rec("2", "noise", "P2", "H2", "A"),
            rec("3", "noise", "P3", "H3", "B"),
        ];
        let pop = PopulationMap::from([
            (
                ("A".to_string(), LocationLevel::Atoll),
                PopulationTotals {
                    total_population: 100,
                    total_households: 40,
                },
            ),
            (
                ("C".to_string(), LocationLevel::Atoll),
                PopulationTotals {
                    total_population: 10,
                    total_households: 5,
                },
            ),
        ]);
        let report = aggregate(&records, &pop, 0);

        let a = &report.by_atoll[0];
        assert_eq!(a.name, "A");
        // 2 distinct individuals over a population of 100.
        assert!(approx(a.individuals[0].pct_population.unwrap(), 2.0));
        assert!(approx(a.households[0].pct_population.unwrap(), 5.0));
        // Complaint counts carry no population percentage at all.
        assert!(a.complaints[0].pct_population.is_none());

        let b = &report.by_atoll[1];
        assert_eq!(b.name, "B");
        assert!(b.individuals[0].pct_population.is_none());
        // Islands never match an atoll-level entry.
        assert!(report.by_island[0].individuals[0].pct_population.is_none());
    }

    #[test]
    fn zero_population_total_means_absent_not_zero() {
        let records = vec![rec("1", "noise", "P1", "H1", "A")];
        let pop = PopulationMap::from([(
            ("A".to_string(), LocationLevel::Atoll),
            PopulationTotals {
                total_population: 0,
                total_households: 0,
            },
        )]);
        let report = aggregate(&records, &pop, 0);
        let a = &report.by_atoll[0];
        assert!(a.individuals[0].pct_population.is_none());
        assert!(a.households[0].pct_population.is_none());
    }

    #[test]
    fn atoll_and_island_partition_independently() {
        let mut records = vec![
            rec("1", "noise", "P1", "H1", "A"),
            rec("2", "theft", "P2", "H2", "B"),
        ];
        // Two atolls sharing one island name.
        records[1].island = "A-island".to_string();
        let report = aggregate(&records, &PopulationMap::new(), 0);
        assert_eq!(report.by_atoll.len(), 2);
        assert_eq!(report.by_island.len(), 1);
        assert_eq!(report.by_island[0].total_complaints, 2);
        assert_eq!(report.summary.atolls, 2);
        assert_eq!(report.summary.islands, 1);
    }

    #[test]
    fn skipped_row_count_flows_into_summary() {
        let report = aggregate(&[rec("1", "noise", "P1", "H1", "A")], &PopulationMap::new(), 7);
        assert_eq!(report.summary.skipped_rows, 7);
    }
}
