//! CSV rendering of parsed results.
//!
//! JSON export is `serde_json` directly over the data model; CSV is built
//! by hand here since the column sets are small and fixed.

use std::fmt::Write;

use crate::assessment::{EntropyAssessment, OverallStatus, TestStatus};
use crate::battery::BatteryReport;

/// Render battery records as CSV, one row per individual test in document
/// order.
pub fn battery_csv(report: &BatteryReport) -> String {
    let mut out = String::from("Test Name,Passed,Total,Pass Rate,P-Value,Meets Requirement\n");
    for r in &report.records {
        let p_value = r
            .p_value
            .map(|p| p.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        writeln!(
            out,
            "{},{},{},{},{},{}",
            r.test_name,
            r.passed,
            r.total,
            r.pass_rate,
            p_value,
            if r.meets_requirement { "YES" } else { "NO" }
        )
        .expect("writing to a String cannot fail");
    }
    out
}

/// Render entropy assessments as CSV, one row per sample section.
pub fn assessments_csv(assessments: &[EntropyAssessment]) -> String {
    let mut out =
        String::from("Filename,Min Entropy,Chi-Square,IID Test,LRS Test,Overall Status\n");
    for a in assessments {
        writeln!(
            out,
            "{},{},{},{},{},{}",
            a.filename,
            a.min_entropy
                .map(|h| h.to_string())
                .unwrap_or_else(|| "N/A".to_string()),
            status_cell(a.chi_square_test),
            status_cell(a.iid_test),
            status_cell(a.lrs_test),
            overall_cell(a.overall_status),
        )
        .expect("writing to a String cannot fail");
    }
    out
}

fn status_cell(status: Option<TestStatus>) -> &'static str {
    match status {
        Some(TestStatus::Passed) => "PASSED",
        Some(TestStatus::Failed) => "FAILED",
        None => "N/A",
    }
}

fn overall_cell(status: OverallStatus) -> &'static str {
    match status {
        OverallStatus::Passed => "PASSED",
        OverallStatus::Failed => "FAILED",
        OverallStatus::Unknown => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assessment::parse_assessment_report;
    use crate::battery::parse_battery_report;

    #[test]
    fn test_battery_csv_rows() {
        let report = parse_battery_report(
            "0.534521 96/100 BlockFrequency\n0.000001 10/100 Runs\n",
        );
        let csv = battery_csv(&report);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Test Name,Passed,Total,Pass Rate,P-Value,Meets Requirement"
        );
        assert_eq!(lines[1], "BlockFrequency,96,100,0.96,0.534521,YES");
        assert!(lines[2].ends_with(",NO"));
    }

    #[test]
    fn test_battery_csv_missing_p_value() {
        let report = parse_battery_report("96/100 Frequency\n");
        let csv = battery_csv(&report);
        assert!(csv.lines().nth(1).unwrap().contains(",N/A,"));
    }

    #[test]
    fn test_assessments_csv_rows() {
        let assessments = parse_assessment_report(
            "a.bin 8\nmin(H_original, 8 X H_bitstring): 7.5\nPassed chi square tests\n",
        );
        let csv = assessments_csv(&assessments);
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(lines[1], "a.bin,7.5,PASSED,N/A,N/A,UNKNOWN");
    }
}
