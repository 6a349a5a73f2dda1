//! Per-directory summaries and the master rollup.
//!
//! One [`Summary`] aggregates everything known about a single test
//! configuration: the battery compliance numbers, the inferred
//! configuration, the matched entropy assessment, categorized results, and
//! sample checksums. All directory summaries fold into one
//! [`MasterSummary`] keyed by relative path.
//!
//! The compliance rule is per *individual* test: the report may print the
//! same test name on many lines (one per parameterization) and every line
//! counts once. `unique_test_types` is carried for reference display only.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::assessment::EntropyAssessment;
use crate::battery::{BatteryReport, TestResultRecord};
use crate::checksum::FileChecksum;
use crate::config::Configuration;
use crate::NIST_MIN_PASS_RATE;

// ---------------------------------------------------------------------------
// Overall results
// ---------------------------------------------------------------------------

/// Directory-level compliance statistics.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverallResults {
    pub total_individual_tests: usize,
    pub passed_individual_tests: usize,
    pub failed_individual_tests: usize,
    pub overall_pass_rate: f64,
    pub pass_percentage: String,
    pub meets_nist_requirement: bool,
    pub status: &'static str,
    pub unique_test_types: usize,
}

impl OverallResults {
    /// Compute compliance statistics over the full ordered record sequence.
    /// Zero parsed lines is a defined state: pass rate 0, requirement unmet.
    pub fn from_report(report: &BatteryReport) -> Self {
        let total = report.total_individual_tests();
        let passed = report.passed_individual_tests();
        let overall_pass_rate = if total > 0 {
            passed as f64 / total as f64
        } else {
            0.0
        };
        let meets = total > 0 && overall_pass_rate >= NIST_MIN_PASS_RATE;

        Self {
            total_individual_tests: total,
            passed_individual_tests: passed,
            failed_individual_tests: total - passed,
            overall_pass_rate,
            pass_percentage: format!("{:.2}%", overall_pass_rate * 100.0),
            meets_nist_requirement: meets,
            status: if meets { "PASSED" } else { "FAILED" },
            unique_test_types: report.unique_test_types(),
        }
    }
}

// ---------------------------------------------------------------------------
// Categorization
// ---------------------------------------------------------------------------

/// The five result buckets, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Category {
    Frequency,
    Runs,
    Template,
    Complexity,
    Other,
}

impl Category {
    /// Bucket a record by name keyword. Buckets are mutually exclusive by
    /// priority: the first keyword family that matches wins.
    pub fn of(test_name: &str) -> Self {
        if test_name.contains("Frequency") {
            Category::Frequency
        } else if test_name.contains("Runs") || test_name.contains("Run") {
            Category::Runs
        } else if test_name.contains("Template") {
            Category::Template
        } else if test_name.contains("Complexity") || test_name.contains("Linear") {
            Category::Complexity
        } else {
            Category::Other
        }
    }
}

/// Records grouped by category, document order preserved within each bucket.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TestCategories {
    pub frequency_tests: Vec<TestResultRecord>,
    pub runs_tests: Vec<TestResultRecord>,
    pub template_tests: Vec<TestResultRecord>,
    pub complexity_tests: Vec<TestResultRecord>,
    pub other_tests: Vec<TestResultRecord>,
}

/// Place every record of the ordered sequence into exactly one bucket.
pub fn categorize(records: &[TestResultRecord]) -> TestCategories {
    let mut cats = TestCategories::default();
    for record in records {
        let bucket = match Category::of(&record.test_name) {
            Category::Frequency => &mut cats.frequency_tests,
            Category::Runs => &mut cats.runs_tests,
            Category::Template => &mut cats.template_tests,
            Category::Complexity => &mut cats.complexity_tests,
            Category::Other => &mut cats.other_tests,
        };
        bucket.push(record.clone());
    }
    cats
}

// ---------------------------------------------------------------------------
// Summary
// ---------------------------------------------------------------------------

/// Provenance block for one summary.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryMeta {
    pub generated: String,
    pub generator: String,
    /// Directory path relative to the batch root.
    pub directory: String,
    pub report_file: String,
}

/// Full aggregate for one test directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub metadata: SummaryMeta,
    pub configuration: Configuration,
    pub overall_results: OverallResults,
    pub entropy_assessment: Option<EntropyAssessment>,
    /// Deduplicated-by-name index, first occurrence wins. Reference only.
    pub individual_tests: BTreeMap<String, TestResultRecord>,
    pub test_categories: TestCategories,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_checksums: Option<BTreeMap<String, FileChecksum>>,
}

impl Summary {
    /// Assemble a summary from its parts. Compliance counting comes from
    /// the report's ordered sequence; the dedup index is carried verbatim.
    pub fn build(
        meta: SummaryMeta,
        configuration: Configuration,
        report: &BatteryReport,
        entropy_assessment: Option<EntropyAssessment>,
        file_checksums: Option<BTreeMap<String, FileChecksum>>,
    ) -> Self {
        Self {
            metadata: meta,
            configuration,
            overall_results: OverallResults::from_report(report),
            entropy_assessment,
            individual_tests: report.by_name.clone(),
            test_categories: categorize(&report.records),
            file_checksums,
        }
    }
}

// ---------------------------------------------------------------------------
// Master rollup
// ---------------------------------------------------------------------------

/// One configuration's row in the master rollup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConfigurationRollup {
    #[serde(flatten)]
    pub overall: OverallResults,
    pub configuration: Configuration,
    /// `entropy_assessment.min_entropy` of the matched section, if any.
    pub entropy_min: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterMeta {
    pub generated: String,
    pub total_test_configurations: usize,
    pub all_configurations_pass: bool,
}

/// Rollup over every processed directory, keyed by relative path.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MasterSummary {
    pub metadata: MasterMeta,
    pub test_configurations: BTreeMap<String, ConfigurationRollup>,
}

impl MasterSummary {
    /// Fold directory summaries into the master rollup.
    ///
    /// `all_configurations_pass` is a strict AND, which is vacuously true
    /// over zero configurations; the batch driver refuses to emit a master
    /// summary in that case rather than assert an empty pass.
    pub fn fold<'a>(
        summaries: impl IntoIterator<Item = (&'a str, &'a Summary)>,
        generated: String,
    ) -> Self {
        let mut test_configurations = BTreeMap::new();
        for (path, summary) in summaries {
            test_configurations.insert(
                path.to_string(),
                ConfigurationRollup {
                    overall: summary.overall_results.clone(),
                    configuration: summary.configuration.clone(),
                    entropy_min: summary
                        .entropy_assessment
                        .as_ref()
                        .and_then(|a| a.min_entropy),
                },
            );
        }

        let all_pass = test_configurations
            .values()
            .all(|c| c.overall.meets_nist_requirement);

        Self {
            metadata: MasterMeta {
                generated,
                total_test_configurations: test_configurations.len(),
                all_configurations_pass: all_pass,
            },
            test_configurations,
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
