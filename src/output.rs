use crate::types::{
    ComplaintCountRow, DistinctCountRow, LocationLevel, LocationReport, RankedRow, Report,
};
use crate::util::{escape_html, format_int, format_percent};
use serde::Serialize;
use std::error::Error;
use std::fmt::Write as _;
use tabled::{settings::Style, Table, Tabled};

pub fn write_json<T: Serialize>(path: &str, value: &T) -> Result<(), Box<dyn Error>> {
    let s = serde_json::to_string_pretty(value)?;
    std::fs::write(path, s)?;
    Ok(())
}

pub fn write_html(path: &str, report: &Report) -> Result<(), Box<dyn Error>> {
    std::fs::write(path, render_html(report))?;
    Ok(())
}

pub fn preview_table_rows<T>(rows: &[T], max_rows: usize)
where
    T: Tabled + Clone,
{
    let slice: Vec<T> = rows.iter().cloned().take(max_rows).collect();
    if slice.is_empty() {
        println!("(no rows)\n");
        return;
    }
    let table_str = Table::new(slice).with(Style::markdown()).to_string();
    println!("{}\n", table_str);
}

/// Console display rows for a complaint-count analysis.
pub fn complaint_rows(rows: &[RankedRow]) -> Vec<ComplaintCountRow> {
    rows.iter()
        .map(|r| ComplaintCountRow {
            subcategory: r.subcategory.clone(),
            count: format_int(r.count),
            pct_surveyed: format_percent(r.pct_surveyed),
        })
        .collect()
}

/// Console display rows for a distinct-individual or distinct-household
/// analysis. A missing population percentage renders as `-`.
pub fn distinct_rows(rows: &[RankedRow]) -> Vec<DistinctCountRow> {
    rows.iter()
        .map(|r| DistinctCountRow {
            subcategory: r.subcategory.clone(),
            count: format_int(r.count),
            pct_surveyed: format_percent(r.pct_surveyed),
            pct_population: r
                .pct_population
                .map(format_percent)
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

/// Render the full report as a self-contained HTML document: summary stats,
/// then per geography level and per location the three top-20 tables.
pub fn render_html(report: &Report) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<title>Citizen Complaint Analysis Report</title>\n\
<style>\n\
body {{ font-family: Arial, sans-serif; margin: 20px; }}\n\
h1, h2, h3 {{ color: #2c3e50; }}\n\
table {{ border-collapse: collapse; width: 100%; margin: 20px 0; }}\n\
th, td {{ border: 1px solid #ddd; padding: 8px; text-align: left; }}\n\
th {{ background-color: #3498db; color: white; }}\n\
.location-section {{ margin: 30px 0; }}\n\
.analysis-section {{ margin: 20px 0; }}\n\
</style>\n</head>\n<body>\n<h1>Citizen Complaint Analysis Report</h1>\n\
<p>Generated on: {}</p>\n",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );

    let s = &report.summary;
    let _ = write!(
        html,
        "<h2>Summary Statistics</h2>\n\
<p>Total Complaints: {}</p>\n<p>Total Individuals: {}</p>\n\
<p>Total Households: {}</p>\n<p>Atolls Represented: {}</p>\n\
<p>Islands Represented: {}</p>\n",
        format_int(s.total_complaints),
        format_int(s.total_individuals),
        format_int(s.total_households),
        format_int(s.atolls),
        format_int(s.islands),
    );
    if s.skipped_rows > 0 {
        let _ = write!(html, "<p>Rows Skipped: {}</p>\n", format_int(s.skipped_rows));
    }

    render_level(&mut html, LocationLevel::Atoll, &report.by_atoll);
    render_level(&mut html, LocationLevel::Island, &report.by_island);

    html.push_str("</body></html>");
    html
}

fn render_level(html: &mut String, level: LocationLevel, locations: &[LocationReport]) {
    let _ = write!(
        html,
        "<div class='location-section'>\n<h2>Analysis by {}</h2>\n",
        level.label()
    );
    for loc in locations {
        let _ = write!(html, "<h3>{}</h3>\n", escape_html(&loc.name));
        render_table(
            html,
            "Top 20 Complaint Subcategories (by total complaints)",
            &["Subcategory", "Count", "% of Total Complaints"],
            &loc.complaints,
        );
        render_table(
            html,
            "Top 20 Complaint Subcategories (by unique individuals)",
            &[
                "Subcategory",
                "Unique Individuals",
                "% of Surveyed Individuals",
                "% of Total Population",
            ],
            &loc.individuals,
        );
        render_table(
            html,
            "Top 20 Complaint Subcategories (by unique households)",
            &[
                "Subcategory",
                "Unique Households",
                "% of Surveyed Households",
                "% of Total Households",
            ],
            &loc.households,
        );
    }
    html.push_str("</div>\n");
}

fn render_table(html: &mut String, title: &str, headers: &[&str], rows: &[RankedRow]) {
    let _ = write!(html, "<div class='analysis-section'>\n<h4>{}</h4>\n<table><tr>", title);
    for h in headers {
        let _ = write!(html, "<th>{}</th>", h);
    }
    html.push_str("</tr>\n");
    // A three-column header means a complaint-count table with no
    // population column.
    let with_population = headers.len() == 4;
    for row in rows {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td>",
            escape_html(&row.subcategory),
            format_int(row.count),
            format_percent(row.pct_surveyed),
        );
        if with_population {
            let pop = row
                .pct_population
                .map(format_percent)
                .unwrap_or_else(|| "-".to_string());
            let _ = write!(html, "<td>{}</td>", pop);
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</table></div>\n");
}
