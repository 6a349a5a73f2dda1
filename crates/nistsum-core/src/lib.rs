//! # nistsum-core
//!
//! **Turn NIST randomness lab reports into machine-checkable results.**
//!
//! `nistsum-core` interprets the plaintext output of two statistical test
//! suites — the SP 800-22 battery (`finalAnalysisReport.txt`) and the
//! SP 800-90B entropy assessment (consolidated per-sample documents) — and
//! aggregates them per test configuration against the 96% compliance rule.
//!
//! ## Quick Start
//!
//! ```
//! use nistsum_core::parse_battery_report;
//!
//! let report = parse_battery_report("  0.534521   96/100      BlockFrequency\n");
//! assert_eq!(report.total_individual_tests(), 1);
//! assert!(report.records[0].meets_requirement);
//! ```
//!
//! ## Architecture
//!
//! Report text → classify/extract → records → aggregate → summary JSON
//!
//! The two dialects flow through separate front ends:
//! - **Battery**: line classifier → proportion extractor → record builder,
//!   one [`battery::TestResultRecord`] per result line, duplicates kept.
//! - **Entropy**: section splitter → key-size matcher → field extractor,
//!   one [`assessment::EntropyAssessment`] per matched sample section.
//!
//! [`scan::run_batch`] drives both over an evaluation tree and folds every
//! directory's [`summary::Summary`] into a [`summary::MasterSummary`].
//!
//! These are targeted heuristics over semi-structured text, not a grammar;
//! the heuristics themselves (last token is the test name, `*` marks a
//! uniformity failure, first matching section wins) are part of the
//! contract with the report formats.

pub mod assessment;
pub mod battery;
pub mod checksum;
pub mod config;
pub mod export;
pub mod scan;
pub mod summary;
pub mod timefmt;

pub use assessment::{
    extract_assessment, match_section, parse_assessment_report, split_sections,
    EntropyAssessment, OverallStatus, Section, SectionMatchError, TestStatus,
};
pub use battery::{
    classify_line, parse_battery_report, parse_battery_report_with, BatteryReport,
    ExtractedProportion, LineClass, ResultLineRules, StsLineRules, TestResultRecord,
};
pub use checksum::{sample_checksums, sha256_file, FileChecksum, MAX_SAMPLE_CHECKSUMS};
pub use config::{infer_configuration, Configuration, KeySize, SecurityLevel, KEY_SIZES};
pub use export::{assessments_csv, battery_csv};
pub use scan::{
    discover_test_dirs, find_entropy_dir, find_report_file, run_batch, summarize_dir,
    BatchOptions, BatchResult, NoTestDirectories, MASTER_SUMMARY_FILENAME, SUMMARY_FILENAME,
};
pub use summary::{
    categorize, Category, ConfigurationRollup, MasterSummary, OverallResults, Summary,
    SummaryMeta, TestCategories,
};

/// Minimum proportion of individual tests that must pass, per NIST SP
/// 800-22 acceptance. Used identically per result line and per directory.
pub const NIST_MIN_PASS_RATE: f64 = 0.96;

/// Library version (from Cargo.toml).
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
