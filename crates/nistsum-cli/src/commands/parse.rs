//! One-shot parsing of individual NIST output files.

use std::path::{Path, PathBuf};

use nistsum_core::{
    assessments_csv, battery_csv, parse_assessment_report, parse_battery_report,
    timefmt::now_iso8601, BatteryReport, EntropyAssessment, OverallResults, OverallStatus,
};
use serde_json::json;

/// One parsed input file. The dialect is chosen by filename: the canonical
/// STS report name means battery; `entropy` or `90b` in the path means a
/// consolidated 90B document; anything else goes through the battery
/// extractor, which treats unrecognized lines as noise.
enum Parsed {
    Battery(BatteryReport),
    Entropy(Vec<EntropyAssessment>),
}

pub fn run(files: &[String], format: &str, output: Option<&str>, merge: bool) {
    let mut results: Vec<(PathBuf, Parsed)> = Vec::new();

    for file in files {
        let path = PathBuf::from(file);
        if !path.exists() {
            eprintln!("Warning: file not found: {file}");
            continue;
        }
        println!("Processing: {file}");
        let text = match std::fs::read_to_string(&path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading {file}: {e}");
                continue;
            }
        };
        results.push((path.clone(), parse_file(&path, &text)));
    }

    if results.is_empty() {
        eprintln!("No files parsed.");
        std::process::exit(1);
    }

    match format {
        "csv" => write_csv(&results, output),
        "pretty" => {
            for (path, parsed) in &results {
                print_pretty(path, parsed);
            }
        }
        _ => write_json(&results, output, merge),
    }
}

fn parse_file(path: &Path, text: &str) -> Parsed {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let full = path.to_string_lossy().to_lowercase();

    if !name.contains("finalAnalysisReport")
        && (name.to_lowercase().contains("entropy") || full.contains("90b"))
    {
        Parsed::Entropy(parse_assessment_report(text))
    } else {
        Parsed::Battery(parse_battery_report(text))
    }
}

// ---------------------------------------------------------------------------
// JSON output
// ---------------------------------------------------------------------------

fn to_json(path: &Path, parsed: &Parsed) -> serde_json::Value {
    match parsed {
        Parsed::Battery(report) => json!({
            "file": path.to_string_lossy(),
            "generated": now_iso8601(),
            "tests": report.by_name,
            "overall_results": OverallResults::from_report(report),
        }),
        Parsed::Entropy(assessments) => json!({
            "file": path.to_string_lossy(),
            "generated": now_iso8601(),
            "assessments": assessments,
        }),
    }
}

fn write_json(results: &[(PathBuf, Parsed)], output: Option<&str>, merge: bool) {
    let values: Vec<serde_json::Value> =
        results.iter().map(|(p, r)| to_json(p, r)).collect();

    let document = if merge {
        json!({ "merged_results": values })
    } else if values.len() == 1 {
        values.into_iter().next().expect("one value")
    } else {
        serde_json::Value::Array(values)
    };

    let text = serde_json::to_string_pretty(&document).expect("summary JSON serializes");
    match output {
        Some(path) => match std::fs::write(path, &text) {
            Ok(()) => println!("Results saved to: {path}"),
            Err(e) => {
                eprintln!("Failed to write {path}: {e}");
                std::process::exit(1);
            }
        },
        None => println!("{text}"),
    }
}

// ---------------------------------------------------------------------------
// CSV output
// ---------------------------------------------------------------------------

fn write_csv(results: &[(PathBuf, Parsed)], output: Option<&str>) {
    let base = PathBuf::from(output.unwrap_or("output.csv"));

    for (i, (_, parsed)) in results.iter().enumerate() {
        let csv = match parsed {
            Parsed::Battery(report) => battery_csv(report),
            Parsed::Entropy(assessments) => assessments_csv(assessments),
        };
        let path = if results.len() == 1 {
            base.clone()
        } else {
            numbered(&base, i)
        };
        match std::fs::write(&path, csv) {
            Ok(()) => println!("CSV saved to: {}", path.display()),
            Err(e) => eprintln!("Failed to write {}: {e}", path.display()),
        }
    }
}

/// `output.csv` → `output_2.csv` for the third input, and so on.
fn numbered(base: &Path, index: usize) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "output".to_string());
    let ext = base
        .extension()
        .map(|e| e.to_string_lossy().into_owned())
        .unwrap_or_else(|| "csv".to_string());
    base.with_file_name(format!("{stem}_{index}.{ext}"))
}

// ---------------------------------------------------------------------------
// Pretty output
// ---------------------------------------------------------------------------

fn print_pretty(path: &Path, parsed: &Parsed) {
    println!("\n{}", "=".repeat(60));
    println!("File: {}", path.display());
    println!("{}", "=".repeat(60));

    match parsed {
        Parsed::Battery(report) => {
            let overall = OverallResults::from_report(report);
            println!("\nSummary:");
            println!("  Total Tests: {}", overall.total_individual_tests);
            println!("  Passed: {}", overall.passed_individual_tests);
            println!("  Failed: {}", overall.failed_individual_tests);
            println!("  Pass Rate: {}", overall.pass_percentage);
            println!(
                "  Meets NIST: {}",
                if overall.meets_nist_requirement { "YES" } else { "NO" }
            );

            println!("\nIndividual Tests:");
            for record in &report.records {
                let mark = if record.meets_requirement { "✓" } else { "✗" };
                println!(
                    "  {mark} {}: {} ({}/{})",
                    record.test_name, record.percentage, record.passed, record.total
                );
            }
        }
        Parsed::Entropy(assessments) => {
            println!("\nEntropy Assessments:");
            for a in assessments {
                println!("\n  File: {}", a.filename);
                if let Some(h) = a.min_entropy {
                    println!("    Min Entropy: {h:.6} bits/byte");
                }
                let (mark, label) = match a.overall_status {
                    OverallStatus::Passed => ("✓", "PASSED"),
                    OverallStatus::Failed => ("✗", "FAILED"),
                    OverallStatus::Unknown => ("?", "UNKNOWN"),
                };
                println!("    Status: {mark} {label}");
            }
        }
    }
}
