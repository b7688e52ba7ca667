//! Library Linter - checks a persisted template library for problems.
//!
//! Usage: library_linter <library.json> [-v]

use log::debug;
use madlib_engine::core::engine::placeholders_in;
use madlib_engine::core::library::Library;
use madlib_engine::schema::template::TemplateRecord;
use rustc_hash::FxHashSet;
use std::path::Path;
use std::process;

fn main() {
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 || args[1] == "--help" || args[1] == "-h" {
        println!("Usage: library_linter <library.json> [-v]");
        process::exit(0);
    }

    let verbose = args.iter().skip(2).any(|a| a == "-v" || a == "--verbose");
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let path = Path::new(&args[1]);
    let contents = match std::fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) => {
            eprintln!("ERROR: Failed to read '{}': {}", path.display(), e);
            process::exit(1);
        }
    };

    // Parse the raw records rather than a Library so duplicate titles stay visible.
    let records: Vec<TemplateRecord> = match serde_json::from_str(&contents) {
        Ok(records) => records,
        Err(e) => {
            eprintln!("ERROR: Failed to parse library: {}", e);
            process::exit(1);
        }
    };

    println!("Loaded {} templates", records.len());
    let (errors, warnings) = lint_records(&records);

    println!("\n=== Library Lint Report ===\n");

    if errors.is_empty() && warnings.is_empty() {
        println!("All checks passed!");
    }

    for warning in &warnings {
        println!("WARNING: {}", warning);
    }

    for error in &errors {
        println!("ERROR: {}", error);
    }

    println!(
        "\nSummary: {} errors, {} warnings",
        errors.len(),
        warnings.len()
    );

    let kept = Library::from_records(records).len();
    debug!("{} templates would survive loading", kept);

    if errors.is_empty() {
        process::exit(0);
    } else {
        process::exit(1);
    }
}

fn lint_records(records: &[TemplateRecord]) -> (Vec<String>, Vec<String>) {
    let mut errors = Vec::new();
    let mut warnings = Vec::new();
    let mut titles = FxHashSet::default();

    for (i, record) in records.iter().enumerate() {
        let label = if record.title.trim().is_empty() {
            format!("#{}", i + 1)
        } else {
            format!("'{}'", record.title)
        };

        if !titles.insert(record.title.as_str()) {
            errors.push(format!(
                "Template {} repeats a title; only the first copy is loaded",
                label
            ));
        }
        if record.title.trim().is_empty() {
            errors.push(format!("Template {} has an empty title", label));
        }
        if record.body.trim().is_empty() {
            errors.push(format!("Template {} has an empty template text", label));
        }

        let found = placeholders_in(&record.body);
        if found.is_empty() {
            errors.push(format!("Template {} has no [placeholders]", label));
        }

        for declared in &record.placeholders {
            if !found.contains(declared) {
                errors.push(format!(
                    "Template {} lists placeholder '{}' which does not appear in its text",
                    label, declared
                ));
            }
        }

        for used in &found {
            if !record.placeholders.contains(used) {
                warnings.push(format!(
                    "Template {} uses [{}] but does not list it",
                    label, used
                ));
            }
        }

        let mut distinct = FxHashSet::default();
        if record.placeholders.iter().any(|p| !distinct.insert(p)) {
            warnings.push(format!(
                "Template {} lists the same placeholder more than once",
                label
            ));
        } else if found != record.placeholders
            && record.placeholders.iter().all(|p| found.contains(p))
            && found.iter().all(|p| record.placeholders.contains(p))
        {
            warnings.push(format!(
                "Template {} lists placeholders out of first-appearance order",
                label
            ));
        }

        if found.iter().any(|p| p.is_empty()) {
            warnings.push(format!("Template {} contains an empty [] placeholder", label));
        }
    }

    (errors, warnings)
}
