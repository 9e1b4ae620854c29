// Entry point and high-level CLI flow.
//
// - Option [1] loads the complaint CSV, printing load diagnostics.
// - Option [2] loads the optional population reference CSV.
// - Option [3] aggregates and writes the HTML report plus a JSON summary,
//   with Markdown previews of each atoll's tables on the console.
// - After generating the report, the user can choose to go back to the
//   selection menu or exit.
mod loader;
mod output;
mod reports;
mod types;
mod util;

use loader::LoadReport;
use once_cell::sync::Lazy;
use std::fs::File;
use std::io::{self, Write};
use std::sync::Mutex;
use types::{ComplaintRecord, PopulationMap};

// Simple in-memory app state so we only load the CSVs once but can
// generate the report multiple times in a single run.
static APP_STATE: Lazy<Mutex<AppState>> = Lazy::new(|| {
    Mutex::new(AppState {
        records: None,
        population: None,
    })
});

struct AppState {
    records: Option<(Vec<ComplaintRecord>, LoadReport)>,
    population: Option<PopulationMap>,
}

/// Read a single line of input after printing the common "Enter choice:" prompt.
fn read_choice() -> String {
    print!("Enter choice: ");
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    buf.trim().to_string()
}

/// Prompt for a file path, falling back to `default` on empty input.
fn prompt_path(what: &str, default: &str) -> String {
    print!("{} path [{}]: ", what, default);
    let _ = io::stdout().flush();
    let mut buf = String::new();
    io::stdin().read_line(&mut buf).ok();
    let trimmed = buf.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// Ask the user whether to go back to the report selection menu after
/// generating the report.
///
/// Returns `true` if the user chose `Y`, `false` if they chose `N`.
fn prompt_back_to_menu() -> bool {
    loop {
        print!("Back to Menu (Y/N): ");
        let _ = io::stdout().flush();
        let mut buf = String::new();
        io::stdin().read_line(&mut buf).ok();
        let resp = buf.trim().to_uppercase();
        match resp.as_str() {
            "Y" => return true,
            "N" => return false,
            _ => println!("Invalid choice. Please enter Y or N."),
        }
    }
}

/// Handle option [1]: load the complaint CSV.
///
/// On success, the records and their load report are stored in `APP_STATE`
/// and a short textual summary is printed. A schema error leaves any
/// previously loaded data untouched.
fn handle_load_complaints() {
    let path = prompt_path("Complaint CSV", "complaints.csv");
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open {}: {}\n", path, e);
            return;
        }
    };
    match loader::load_complaints(file) {
        Ok((records, report)) => {
            println!(
                "Processing dataset... ({} rows read, {} loaded)",
                util::format_int(report.total_rows as i64),
                util::format_int(report.loaded_rows as i64)
            );
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped due to missing required fields.",
                    util::format_int(report.skipped_rows as i64)
                );
            }
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.records = Some((records, report));
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [2]: load the optional population reference CSV.
fn handle_load_population() {
    let path = prompt_path("Population CSV", "population.csv");
    let file = match File::open(&path) {
        Ok(f) => f,
        Err(e) => {
            eprintln!("Failed to open {}: {}\n", path, e);
            return;
        }
    };
    match loader::load_population(file) {
        Ok((map, report)) => {
            println!(
                "Population reference loaded. ({} entries)",
                util::format_int(report.loaded_rows as i64)
            );
            if report.skipped_rows > 0 {
                println!(
                    "Note: {} rows skipped (bad level, totals, or duplicates).",
                    util::format_int(report.skipped_rows as i64)
                );
            }
            println!("");
            let mut state = APP_STATE.lock().unwrap();
            state.population = Some(map);
        }
        Err(e) => {
            eprintln!("Failed to load file: {}\n", e);
        }
    }
}

/// Handle option [3]: aggregate and write the report.
///
/// This function is intentionally side-effectful:
/// - writes the HTML report,
/// - writes a JSON summary,
/// - and prints Markdown previews of each atoll's tables to the console.
fn handle_generate_report() {
    let (records, load_report, population) = {
        let state = APP_STATE.lock().unwrap();
        let Some((records, load_report)) = state.records.clone() else {
            println!("Error: No data loaded. Please load the complaint CSV first (option 1).\n");
            return;
        };
        let population = state.population.clone().unwrap_or_default();
        (records, load_report, population)
    };

    println!("Generating report...");
    let report = reports::aggregate(&records, &population, load_report.skipped_rows);

    let html_file = "complaint_analysis_report.html";
    if let Err(e) = output::write_html(html_file, &report) {
        eprintln!("Write error: {}", e);
    }
    let summary_file = "summary.json";
    if let Err(e) = output::write_json(summary_file, &report.summary) {
        eprintln!("Write error: {}", e);
    }

    println!("Citizen Complaint Analysis");
    println!(
        "({} complaints, {} individuals, {} households across {} atolls / {} islands)\n",
        util::format_int(report.summary.total_complaints as i64),
        util::format_int(report.summary.total_individuals as i64),
        util::format_int(report.summary.total_households as i64),
        util::format_int(report.summary.atolls as i64),
        util::format_int(report.summary.islands as i64)
    );

    for loc in &report.by_atoll {
        println!("Atoll: {}", loc.name);
        println!("Top Subcategories by Complaints");
        output::preview_table_rows(&output::complaint_rows(&loc.complaints), 5);
        println!("Top Subcategories by Unique Individuals");
        output::preview_table_rows(&output::distinct_rows(&loc.individuals), 5);
        println!("Top Subcategories by Unique Households");
        output::preview_table_rows(&output::distinct_rows(&loc.households), 5);
    }

    println!("(Full report exported to {})", html_file);
    println!("(Summary stats exported to {})\n", summary_file);
}

fn main() {
    loop {
        println!("Citizen Complaint Analysis:");
        println!("[1] Load complaint CSV");
        println!("[2] Load population CSV (optional)");
        println!("[3] Generate Report\n");
        match read_choice().as_str() {
            "1" => {
                handle_load_complaints();
            }
            "2" => {
                handle_load_population();
            }
            "3" => {
                println!("");
                handle_generate_report();
                if !prompt_back_to_menu() {
                    println!("Exiting the program.");
                    break;
                }
            }
            _ => {
                println!("Invalid choice. Please enter 1, 2, or 3.\n");
            }
        }
    }
}
