//! Batch summarization of an evaluation tree.

use std::path::Path;

use nistsum_core::{
    find_entropy_dir, run_batch, BatchOptions, BatchResult, MASTER_SUMMARY_FILENAME,
    SUMMARY_FILENAME,
};

pub fn run(root: &str, checksums: bool) {
    let root = Path::new(root);
    if !root.is_dir() {
        eprintln!("Error: directory does not exist: {}", root.display());
        std::process::exit(1);
    }

    println!("{}", "=".repeat(60));
    println!("nistsum summarize v{}", nistsum_core::VERSION);
    println!("{}", "=".repeat(60));
    println!("Root directory: {}", root.display());

    match find_entropy_dir(root) {
        Some(dir) => println!(
            "✓ Found entropy results folder: {}",
            dir.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default()
        ),
        None => {
            println!("⚠ No entropy results folder found");
            println!("  Entropy assessment data will not be included");
        }
    }

    let result = match run_batch(root, BatchOptions { checksums }) {
        Ok(result) => result,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    write_artifacts(root, &result);

    println!("\n{}", "=".repeat(60));
    println!(
        "Summary generation complete: {} configuration(s), all pass: {}",
        result.master.metadata.total_test_configurations,
        if result.master.metadata.all_configurations_pass { "YES" } else { "NO" }
    );
    println!("{}", "=".repeat(60));
}

fn write_artifacts(root: &Path, result: &BatchResult) {
    for (rel, summary) in &result.summaries {
        println!("\n📂 {rel}");
        println!(
            "  {} individual tests ({} unique test types), {}/{} passed ({})",
            summary.overall_results.total_individual_tests,
            summary.overall_results.unique_test_types,
            summary.overall_results.passed_individual_tests,
            summary.overall_results.total_individual_tests,
            summary.overall_results.pass_percentage,
        );
        if let Some(entropy) = &summary.entropy_assessment {
            if let Some(h) = entropy.min_entropy {
                println!("  min_entropy = {h:.6} bits/byte");
            }
        }

        let path = root.join(rel).join(SUMMARY_FILENAME);
        match serde_json::to_string_pretty(summary) {
            Ok(json) => match std::fs::write(&path, json) {
                Ok(()) => println!("  ✓ wrote {SUMMARY_FILENAME}"),
                Err(e) => eprintln!("  ❌ could not write {}: {e}", path.display()),
            },
            Err(e) => eprintln!("  ❌ could not serialize summary: {e}"),
        }
    }

    let master_path = root.join(MASTER_SUMMARY_FILENAME);
    match serde_json::to_string_pretty(&result.master) {
        Ok(json) => match std::fs::write(&master_path, json) {
            Ok(()) => println!("\n✓ Created master summary: {}", master_path.display()),
            Err(e) => eprintln!("\n❌ could not write {}: {e}", master_path.display()),
        },
        Err(e) => eprintln!("\n❌ could not serialize master summary: {e}"),
    }
}
