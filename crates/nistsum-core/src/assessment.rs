//! SP 800-90B entropy assessment parsing.
//!
//! A consolidated entropy file concatenates the assessment tool's output for
//! many sample files into one document. Each sample starts with a header
//! line of the exact shape `<name>.bin <bits-per-symbol>`; everything up to
//! the next header is that sample's body. This module splits the document,
//! matches a section to a requested key size by header substring, and pulls
//! the named entropy fields and sub-test verdicts out of a section body.

use serde::Serialize;
use std::fmt;

use crate::config::KeySize;

// ---------------------------------------------------------------------------
// Section splitting
// ---------------------------------------------------------------------------

/// One per-sample section of a consolidated entropy file.
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Full header line, e.g. `sqef_sliced_256bit_1keys.bin 8`.
    pub header: String,
    pub filename: String,
    pub bits_per_symbol: u32,
    /// Text between this header and the next (or end of document).
    pub body: String,
}

/// Split a consolidated entropy report into per-sample sections.
///
/// A header stands alone on its own line: a `.bin`-suffixed name followed by
/// an integer symbol width. A document with zero headers yields zero
/// sections; text before the first header is discarded.
pub fn split_sections(text: &str) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut body = String::new();

    for line in text.lines() {
        if let Some((filename, bits)) = parse_header(line) {
            if let Some(prev) = sections.last_mut() {
                prev.body = std::mem::take(&mut body);
            }
            sections.push(Section {
                header: line.trim().to_string(),
                filename,
                bits_per_symbol: bits,
                body: String::new(),
            });
            body.clear();
        } else if !sections.is_empty() {
            body.push_str(line);
            body.push('\n');
        }
    }
    if let Some(last) = sections.last_mut() {
        last.body = body;
    }

    sections
}

/// Parse a candidate header line into `(filename, bits_per_symbol)`.
fn parse_header(line: &str) -> Option<(String, u32)> {
    let trimmed = line.trim();
    let (name, bits) = trimmed.rsplit_once(char::is_whitespace)?;
    let name = name.trim_end();
    if !name.ends_with(".bin") {
        return None;
    }
    let bits: u32 = bits.parse().ok()?;
    Some((name.to_string(), bits))
}

// ---------------------------------------------------------------------------
// Section matching
// ---------------------------------------------------------------------------

/// No section of the document matched the requested key size.
///
/// Distinct from "file not found": the document existed but named none of
/// the expected sample files. Carries the first few headers actually present
/// for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct SectionMatchError {
    pub requested: KeySize,
    pub patterns: Vec<&'static str>,
    /// Up to the first five header strings present in the document.
    pub available: Vec<String>,
}

impl fmt::Display for SectionMatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "no entropy section matches {} (patterns {:?}); available headers: {}",
            self.requested.label(),
            self.patterns,
            if self.available.is_empty() {
                "none".to_string()
            } else {
                self.available.join(", ")
            }
        )
    }
}

impl std::error::Error for SectionMatchError {}

/// Select the section for a key size: first section, in document order,
/// whose header contains any of the key size's patterns (case-insensitive).
///
/// Deterministic by construction — repeated calls over the same document
/// return the same section.
pub fn match_section<'a>(
    sections: &'a [Section],
    key_size: KeySize,
) -> Result<&'a Section, SectionMatchError> {
    let patterns = key_size.section_patterns();
    for section in sections {
        let header = section.header.to_lowercase();
        if patterns.iter().any(|p| header.contains(&p.to_lowercase())) {
            return Ok(section);
        }
    }
    Err(SectionMatchError {
        requested: key_size,
        patterns: patterns.to_vec(),
        available: sections.iter().take(5).map(|s| s.header.clone()).collect(),
    })
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// Verdict of one 90B sub-test as printed in the report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TestStatus {
    Passed,
    Failed,
}

/// Overall assessment status derived from the three sub-tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OverallStatus {
    Passed,
    Failed,
    Unknown,
}

/// Entropy assessment for one sample file. Every field is independently
/// optional; the report omits what a given estimator run did not produce.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntropyAssessment {
    pub filename: String,
    pub bits_per_symbol: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_original: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub h_bitstring: Option<f64>,
    /// Assessed minimum entropy in bits/byte (0..8).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_entropy: Option<f64>,
    /// `min_entropy / 8 * 100`, present whenever `min_entropy` is.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entropy_percentage: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub chi_square_test: Option<TestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iid_test: Option<TestStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lrs_test: Option<TestStatus>,
    pub overall_status: OverallStatus,
}

/// The three sub-test labels exactly as the 90B tool prints them.
const SUBTEST_LABELS: [&str; 3] = [
    "chi square tests",
    "IID permutation tests",
    "length of longest repeated substring test",
];

/// Extract named fields from one section.
pub fn extract_assessment(section: &Section) -> EntropyAssessment {
    let body = section.body.as_str();

    let min_entropy = min_entropy_value(body);
    let chi_square_test = subtest_status(body, SUBTEST_LABELS[0]);
    let iid_test = subtest_status(body, SUBTEST_LABELS[1]);
    let lrs_test = subtest_status(body, SUBTEST_LABELS[2]);

    EntropyAssessment {
        filename: section.filename.clone(),
        bits_per_symbol: section.bits_per_symbol,
        h_original: value_after(body, "H_original:"),
        h_bitstring: value_after(body, "H_bitstring:"),
        min_entropy,
        entropy_percentage: min_entropy.map(|h| h / 8.0 * 100.0),
        chi_square_test,
        iid_test,
        lrs_test,
        overall_status: overall_status(chi_square_test, iid_test, lrs_test),
    }
}

/// Parse every section of a consolidated document, in document order.
pub fn parse_assessment_report(text: &str) -> Vec<EntropyAssessment> {
    split_sections(text).iter().map(extract_assessment).collect()
}

/// PASSED iff all three sub-tests are present and passed; FAILED if any
/// present sub-test failed; UNKNOWN otherwise.
fn overall_status(
    chi: Option<TestStatus>,
    iid: Option<TestStatus>,
    lrs: Option<TestStatus>,
) -> OverallStatus {
    let statuses = [chi, iid, lrs];
    if statuses.iter().all(|s| *s == Some(TestStatus::Passed)) {
        OverallStatus::Passed
    } else if statuses.contains(&Some(TestStatus::Failed)) {
        OverallStatus::Failed
    } else {
        OverallStatus::Unknown
    }
}

/// Status of one sub-test: the report prints `Passed <label>` or
/// `Failed <label>`, or nothing if the test did not run.
fn subtest_status(body: &str, label: &str) -> Option<TestStatus> {
    if body.contains(&format!("Passed {label}")) {
        Some(TestStatus::Passed)
    } else if body.contains(&format!("Failed {label}")) {
        Some(TestStatus::Failed)
    } else {
        None
    }
}

/// Numeric value following a literal label, e.g. `H_original: 7.912345`.
fn value_after(body: &str, label: &str) -> Option<f64> {
    let start = body.find(label)? + label.len();
    parse_leading_number(&body[start..])
}

/// Minimum entropy follows a `min(...)`-prefixed label ending in `:`,
/// e.g. `min(H_original, 8 X H_bitstring): 7.1421`.
fn min_entropy_value(body: &str) -> Option<f64> {
    let open = body.find("min(")?;
    let rest = &body[open..];
    let close = rest.find("):")?;
    parse_leading_number(&rest[close + 2..])
}

/// Parse the first whitespace-delimited numeric token after a label.
fn parse_leading_number(s: &str) -> Option<f64> {
    let s = s.trim_start();
    let end = s
        .find(|c: char| !c.is_ascii_digit() && c != '.')
        .unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    s[..end].parse().ok()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = "\
sqef_sliced_256bit_1keys.bin 8
Calculating baseline statistics...
H_original: 7.912345
H_bitstring: 0.998712
min(H_original, 8 X H_bitstring): 7.142100
Passed chi square tests
Passed IID permutation tests
Passed length of longest repeated substring test

sqef_sliced_512bit_1keys.bin 8
Calculating baseline statistics...
H_original: 7.891200
min(H_original, 8 X H_bitstring): 6.990000
Passed chi square tests
Failed IID permutation tests
";

    // -----------------------------------------------------------------------
    // Splitter tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_split_two_sections_in_order() {
        let sections = split_sections(DOC);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].filename, "sqef_sliced_256bit_1keys.bin");
        assert_eq!(sections[0].bits_per_symbol, 8);
        assert_eq!(sections[1].filename, "sqef_sliced_512bit_1keys.bin");
    }

    #[test]
    fn test_split_bodies_bounded_by_headers() {
        let sections = split_sections(DOC);
        assert!(sections[0].body.contains("H_bitstring: 0.998712"));
        assert!(!sections[0].body.contains("7.891200"));
        assert!(sections[1].body.contains("Failed IID permutation tests"));
        assert!(!sections[1].body.contains("512bit_1keys.bin"));
    }

    #[test]
    fn test_split_no_headers_yields_nothing() {
        assert!(split_sections("just some text\nH_original: 7.0\n").is_empty());
    }

    #[test]
    fn test_split_preamble_before_first_header_discarded() {
        let doc = "tool version 1.0\nsample.bin 8\nH_original: 7.5\n";
        let sections = split_sections(doc);
        assert_eq!(sections.len(), 1);
        assert!(!sections[0].body.contains("tool version"));
    }

    #[test]
    fn test_header_shape_is_strict() {
        assert!(parse_header("sample.bin 8").is_some());
        assert!(parse_header("  sample.bin   8  ").is_some());
        assert!(parse_header("sample.txt 8").is_none());
        assert!(parse_header("sample.bin eight").is_none());
        assert!(parse_header("sample.bin").is_none());
    }

    // -----------------------------------------------------------------------
    // Matcher tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_match_256bit_section() {
        let sections = split_sections(DOC);
        let m = match_section(&sections, KeySize::Bits256).unwrap();
        assert_eq!(m.filename, "sqef_sliced_256bit_1keys.bin");
    }

    #[test]
    fn test_match_is_exact_per_key_size() {
        let sections = split_sections(DOC);
        // The 256bit header must not satisfy a 512-bit request and vice versa.
        let m = match_section(&sections, KeySize::Bits512).unwrap();
        assert_eq!(m.filename, "sqef_sliced_512bit_1keys.bin");
        assert!(match_section(&sections, KeySize::Bits1024).is_err());
    }

    #[test]
    fn test_match_deterministic() {
        let sections = split_sections(DOC);
        let a = match_section(&sections, KeySize::Bits256).unwrap().header.clone();
        let b = match_section(&sections, KeySize::Bits256).unwrap().header.clone();
        assert_eq!(a, b);
    }

    #[test]
    fn test_match_error_lists_available_headers() {
        let sections = split_sections(DOC);
        let err = match_section(&sections, KeySize::Mb16).unwrap_err();
        assert_eq!(err.available.len(), 2);
        assert!(err.available[0].contains("256bit"));
        let msg = err.to_string();
        assert!(msg.contains("16MB"));
        assert!(msg.contains("sqef_sliced_256bit_1keys.bin"));
    }

    #[test]
    fn test_match_error_caps_headers_at_five() {
        let doc: String = (0..8)
            .map(|i| format!("sample_{i}_64KB_x.bin 8\nH_original: 7.0\n"))
            .collect();
        let sections = split_sections(&doc);
        let err = match_section(&sections, KeySize::Bits128).unwrap_err();
        assert_eq!(err.available.len(), 5);
    }

    #[test]
    fn test_match_case_insensitive() {
        let doc = "SQEF_SLICED_1kb_4KEYS.BIN 8\nH_original: 7.0\n";
        // Header filename keeps the `.bin` suffix check case-sensitive, so
        // lower-case it the way the assessment tool emits it.
        let doc = doc.to_lowercase();
        let sections = split_sections(&doc);
        assert!(match_section(&sections, KeySize::Kb1).is_ok());
    }

    // -----------------------------------------------------------------------
    // Field extraction tests
    // -----------------------------------------------------------------------

    #[test]
    fn test_extract_all_fields() {
        let sections = split_sections(DOC);
        let a = extract_assessment(&sections[0]);
        assert_eq!(a.h_original, Some(7.912345));
        assert_eq!(a.h_bitstring, Some(0.998712));
        assert_eq!(a.min_entropy, Some(7.1421));
        let pct = a.entropy_percentage.unwrap();
        assert!((pct - 89.27625).abs() < 1e-9);
        assert_eq!(a.chi_square_test, Some(TestStatus::Passed));
        assert_eq!(a.iid_test, Some(TestStatus::Passed));
        assert_eq!(a.lrs_test, Some(TestStatus::Passed));
        assert_eq!(a.overall_status, OverallStatus::Passed);
    }

    #[test]
    fn test_extract_failed_subtest_fails_overall() {
        let sections = split_sections(DOC);
        let a = extract_assessment(&sections[1]);
        assert_eq!(a.chi_square_test, Some(TestStatus::Passed));
        assert_eq!(a.iid_test, Some(TestStatus::Failed));
        assert_eq!(a.lrs_test, None);
        assert_eq!(a.overall_status, OverallStatus::Failed);
        assert_eq!(a.h_bitstring, None);
    }

    #[test]
    fn test_overall_unknown_when_no_subtests() {
        assert_eq!(overall_status(None, None, None), OverallStatus::Unknown);
    }

    #[test]
    fn test_overall_missing_subtest_is_not_passed() {
        // Two passes and one absent sub-test must not report PASSED.
        assert_eq!(
            overall_status(Some(TestStatus::Passed), Some(TestStatus::Passed), None),
            OverallStatus::Unknown
        );
    }

    #[test]
    fn test_parse_assessment_report_all_sections() {
        let all = parse_assessment_report(DOC);
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].overall_status, OverallStatus::Passed);
        assert_eq!(all[1].overall_status, OverallStatus::Failed);
    }

    #[test]
    fn test_value_after_missing_label() {
        assert_eq!(value_after("nothing here", "H_original:"), None);
        assert_eq!(value_after("H_original: not-a-number", "H_original:"), None);
    }

    #[test]
    fn test_min_entropy_label_variants() {
        assert_eq!(
            min_entropy_value("min(H_original, 8 X H_bitstring): 6.5"),
            Some(6.5)
        );
        assert_eq!(min_entropy_value("min(H_r, H_c, H_I): 0.912"), Some(0.912));
        assert_eq!(min_entropy_value("minimum: 6.5"), None);
    }
}
