//! SP 800-22 battery report parsing.
//!
//! A `finalAnalysisReport.txt` is free-form text, not a grammar: result rows
//! are whitespace-separated columns mixed with prose, separators, and footer
//! boilerplate. Parsing is a deliberate heuristic pipeline:
//!
//! 1. Classify each line (blank / separator / result candidate / other)
//! 2. Extract a `passed/total` proportion, p-value, name, uniformity flag
//! 3. Build one [`TestResultRecord`] per accepted line
//!
//! The ordered record sequence preserves duplicate test names on purpose.
//! NIST acceptance is evaluated per individual statistical trial, and two
//! trials may legitimately print the same name (e.g. 148 NonOverlapping
//! Template rows). The deduplicated name index is for display only and must
//! never feed compliance counting.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::NIST_MIN_PASS_RATE;

// ---------------------------------------------------------------------------
// Line classification
// ---------------------------------------------------------------------------

/// Coarse classification of one raw report line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineClass {
    /// Empty after trimming.
    Blank,
    /// Decorative separator (`----------...`).
    Separator,
    /// Carries a `/` and may hold a proportion; worth extracting.
    ResultCandidate,
    /// Narrative or boilerplate text.
    Other,
}

/// Classify a single report line.
///
/// Any line containing `/` is a candidate unless it is the `RESULTS` banner,
/// so path fragments in prose can reach the extractor; extraction failure on
/// such lines is silent by contract.
pub fn classify_line(line: &str) -> LineClass {
    if line.trim().is_empty() {
        return LineClass::Blank;
    }
    if line.starts_with('-') {
        return LineClass::Separator;
    }
    if line.contains('/') && !line.starts_with("RESULTS") {
        return LineClass::ResultCandidate;
    }
    LineClass::Other
}

// ---------------------------------------------------------------------------
// Proportion extraction
// ---------------------------------------------------------------------------

/// Raw fields pulled from one result-candidate line, before thresholding.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedProportion {
    pub test_name: String,
    pub passed: u64,
    pub total: u64,
    pub p_value: Option<f64>,
    pub uniformity_warning: bool,
}

/// Positional extraction rules for one report dialect.
///
/// The STS layout is columns-by-convention, not grammar: the *last*
/// whitespace token is the test name, the token immediately before the first
/// valid `n/m` token is the p-value, and a literal `*` anywhere marks a
/// uniformity failure. Dialect variants override these positions without
/// touching the classifier or the record builder.
pub trait ResultLineRules {
    /// Extract fields from a candidate line, or `None` when the line carries
    /// no valid proportion (expected noise, not an error).
    fn extract(&self, line: &str) -> Option<ExtractedProportion>;
}

/// Rules for the NIST STS `finalAnalysisReport` dialect.
#[derive(Debug, Clone, Copy, Default)]
pub struct StsLineRules;

impl ResultLineRules for StsLineRules {
    fn extract(&self, line: &str) -> Option<ExtractedProportion> {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        let test_name = (*tokens.last()?).to_string();

        // First token parsing as integer/integer wins; later `/` tokens on
        // the same line are ignored.
        let (idx, passed, total) = tokens
            .iter()
            .enumerate()
            .filter(|(_, t)| t.contains('/'))
            .find_map(|(i, t)| parse_proportion(t).map(|(p, q)| (i, p, q)))?;

        let p_value = idx
            .checked_sub(1)
            .and_then(|i| tokens[i].parse::<f64>().ok());

        Some(ExtractedProportion {
            test_name,
            passed,
            total,
            p_value,
            uniformity_warning: line.contains('*'),
        })
    }
}

/// Parse `"96/100"` into `(96, 100)`. Totals of zero are rejected so a
/// pass rate is always well defined.
fn parse_proportion(token: &str) -> Option<(u64, u64)> {
    let (num, den) = token.split_once('/')?;
    let passed: u64 = num.parse().ok()?;
    let total: u64 = den.parse().ok()?;
    if total == 0 {
        return None;
    }
    Some((passed, total))
}

// ---------------------------------------------------------------------------
// Result records
// ---------------------------------------------------------------------------

/// One individual statistical trial from a battery report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestResultRecord {
    pub test_name: String,
    pub passed: u64,
    pub total: u64,
    pub pass_rate: f64,
    /// Display form of `pass_rate`, e.g. `"96.00%"`.
    pub percentage: String,
    pub p_value: Option<f64>,
    pub uniformity_warning: bool,
    pub meets_requirement: bool,
}

impl TestResultRecord {
    /// Build a record from extracted fields, applying the 96% threshold and
    /// the uniformity override. Pure; `total` is guaranteed nonzero upstream.
    pub fn from_extracted(e: ExtractedProportion) -> Self {
        let pass_rate = e.passed as f64 / e.total as f64;
        Self {
            test_name: e.test_name,
            passed: e.passed,
            total: e.total,
            pass_rate,
            percentage: format!("{:.2}%", pass_rate * 100.0),
            p_value: e.p_value,
            uniformity_warning: e.uniformity_warning,
            meets_requirement: pass_rate >= NIST_MIN_PASS_RATE && !e.uniformity_warning,
        }
    }
}

// ---------------------------------------------------------------------------
// Report parser
// ---------------------------------------------------------------------------

/// Parsed battery report: the ordered trial sequence plus a display index.
#[derive(Debug, Clone, Default)]
pub struct BatteryReport {
    /// Every accepted result line, in document order, duplicates preserved.
    /// This is the only valid input for compliance counting.
    pub records: Vec<TestResultRecord>,
    /// First occurrence per printed test name. Display/reference only.
    pub by_name: BTreeMap<String, TestResultRecord>,
}

impl BatteryReport {
    /// Number of individual trials (result lines).
    pub fn total_individual_tests(&self) -> usize {
        self.records.len()
    }

    /// Number of individual trials meeting the requirement.
    pub fn passed_individual_tests(&self) -> usize {
        self.records.iter().filter(|r| r.meets_requirement).count()
    }

    /// Number of distinct printed test names.
    pub fn unique_test_types(&self) -> usize {
        self.by_name.len()
    }
}

/// Parse a full battery report with the given dialect rules.
pub fn parse_battery_report_with(text: &str, rules: &dyn ResultLineRules) -> BatteryReport {
    let mut report = BatteryReport::default();

    for line in text.lines() {
        if classify_line(line) != LineClass::ResultCandidate {
            continue;
        }
        let Some(extracted) = rules.extract(line) else {
            continue; // malformed numeric content is noise, not an error
        };
        let record = TestResultRecord::from_extracted(extracted);
        report
            .by_name
            .entry(record.test_name.clone())
            .or_insert_with(|| record.clone());
        report.records.push(record);
    }

    report
}

/// Parse a full battery report in the default STS dialect.
pub fn parse_battery_report(text: &str) -> BatteryReport {
    parse_battery_report_with(text, &StsLineRules)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // -----------------------------------------------------------------------
    // Line classification tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_classify_blank() {
        assert_eq!(classify_line(""), LineClass::Blank);
        assert_eq!(classify_line("   \t  "), LineClass::Blank);
    }

    #[test]
    fn test_classify_separator() {
        assert_eq!(classify_line("---------------------"), LineClass::Separator);
    }

    #[test]
    fn test_classify_results_banner_excluded() {
        assert_eq!(
            classify_line("RESULTS FOR THE UNIFORMITY OF P-VALUES AND /PROPORTION"),
            LineClass::Other
        );
    }

    #[test]
    fn test_classify_candidate() {
        assert_eq!(
            classify_line("  0.534521   96/100      BlockFrequency"),
            LineClass::ResultCandidate
        );
        // Path fragments in prose are candidates too; extraction handles them.
        assert_eq!(
            classify_line("generator is </data/stream.bin>"),
            LineClass::ResultCandidate
        );
    }

    #[test]
    fn test_classify_other() {
        assert_eq!(classify_line("The minimum pass rate is 96"), LineClass::Other);
    }

    // -----------------------------------------------------------------------
    // Proportion extraction tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_extract_spec_scenario() {
        let e = StsLineRules.extract("0.534521   96/100      BlockFrequency").unwrap();
        assert_eq!(e.test_name, "BlockFrequency");
        assert_eq!((e.passed, e.total), (96, 100));
        assert_eq!(e.p_value, Some(0.534521));
        assert!(!e.uniformity_warning);
    }

    #[test]
    fn test_extract_uniformity_star() {
        let e = StsLineRules
            .extract(" 0.000001 *  96/100      Runs")
            .unwrap();
        assert!(e.uniformity_warning);
    }

    #[test]
    fn test_extract_no_proportion_is_none() {
        assert!(StsLineRules.extract("generator is </data/stream.bin>").is_none());
        assert!(StsLineRules.extract("abc/def 1.0 Frequency").is_none());
    }

    #[test]
    fn test_extract_zero_total_rejected() {
        assert!(StsLineRules.extract("0.5 96/0 Frequency").is_none());
    }

    #[test]
    fn test_extract_zero_passed_accepted() {
        let e = StsLineRules.extract("0.000000  0/100  Universal").unwrap();
        assert_eq!(e.passed, 0);
    }

    #[test]
    fn test_extract_first_valid_proportion_wins() {
        let e = StsLineRules
            .extract("a/b 0.1 95/100 88/100 Serial")
            .unwrap();
        assert_eq!((e.passed, e.total), (95, 100));
        assert_eq!(e.p_value, Some(0.1));
    }

    #[test]
    fn test_extract_missing_p_value() {
        // Token before proportion does not parse as float.
        let e = StsLineRules.extract("foo 96/100 Frequency").unwrap();
        assert_eq!(e.p_value, None);
        // Proportion is the first token: no preceding token at all.
        let e = StsLineRules.extract("96/100 Frequency").unwrap();
        assert_eq!(e.p_value, None);
    }

    #[test]
    fn test_extract_last_token_is_name_unconditionally() {
        let e = StsLineRules.extract("0.2 99/100").unwrap();
        // Column convention: the last token, meaningful or not.
        assert_eq!(e.test_name, "99/100");
    }

    // -----------------------------------------------------------------------
    // Record builder tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_record_exact_threshold_passes() {
        let r = TestResultRecord::from_extracted(ExtractedProportion {
            test_name: "BlockFrequency".into(),
            passed: 96,
            total: 100,
            p_value: Some(0.534521),
            uniformity_warning: false,
        });
        assert_eq!(r.pass_rate, 0.96);
        assert_eq!(r.percentage, "96.00%");
        assert!(r.meets_requirement);
    }

    #[test]
    fn test_record_uniformity_overrides_numeric_pass() {
        let r = TestResultRecord::from_extracted(ExtractedProportion {
            test_name: "Runs".into(),
            passed: 96,
            total: 100,
            p_value: Some(0.0001),
            uniformity_warning: true,
        });
        assert_eq!(r.pass_rate, 0.96);
        assert!(!r.meets_requirement);
    }

    #[test]
    fn test_record_below_threshold_fails() {
        let r = TestResultRecord::from_extracted(ExtractedProportion {
            test_name: "Serial".into(),
            passed: 95,
            total: 100,
            p_value: None,
            uniformity_warning: false,
        });
        assert!(!r.meets_requirement);
    }

    // -----------------------------------------------------------------------
    // Report parser tests
    // -----------------------------------------------------------------------

    const REPORT: &str = "\
------------------------------------------------------------------------------
RESULTS FOR THE UNIFORMITY OF P-VALUES AND THE PROPORTION OF PASSING SEQUENCES
------------------------------------------------------------------------------
   generator is <data/sqef_256bit.bin>
------------------------------------------------------------------------------
  0.534146    99/100     Frequency
  0.066882    97/100     BlockFrequency
  0.213309    96/100     CumulativeSums
  0.122325    95/100     CumulativeSums
  0.000001 *  96/100     Runs
  0.739918    98/100     NonOverlappingTemplate
  0.911413    99/100     NonOverlappingTemplate
  0.350485   100/100     NonOverlappingTemplate

The minimum pass rate for each statistical test is approximately = 96
";

    #[test]
    fn test_parse_counts_every_line() {
        let report = parse_battery_report(REPORT);
        assert_eq!(report.total_individual_tests(), 8);
        // CumulativeSums x2 and NonOverlappingTemplate x3 collapse in the index.
        assert_eq!(report.unique_test_types(), 5);
        assert!(report.total_individual_tests() >= report.unique_test_types());
    }

    #[test]
    fn test_parse_passed_count_uses_full_sequence() {
        let report = parse_battery_report(REPORT);
        // 95/100 fails the threshold and the starred Runs line is overridden.
        assert_eq!(report.passed_individual_tests(), 6);
    }

    #[test]
    fn test_parse_dedup_keeps_first_occurrence() {
        let report = parse_battery_report(REPORT);
        let first = &report.by_name["CumulativeSums"];
        assert_eq!(first.passed, 96);
        assert_eq!(first.p_value, Some(0.213309));
    }

    #[test]
    fn test_parse_preserves_document_order() {
        let report = parse_battery_report(REPORT);
        assert_eq!(report.records[0].test_name, "Frequency");
        assert_eq!(report.records[7].test_name, "NonOverlappingTemplate");
    }

    #[test]
    fn test_parse_empty_report() {
        let report = parse_battery_report("no results here\n\n----\n");
        assert_eq!(report.total_individual_tests(), 0);
        assert_eq!(report.passed_individual_tests(), 0);
    }

    #[test]
    fn test_parse_skips_noise_candidates() {
        // Contains '/', classified as candidate, yields no proportion.
        let report = parse_battery_report("see /usr/share/sts/readme for details\n");
        assert!(report.records.is_empty());
    }
}
