//! Batch discovery and per-directory aggregation.
//!
//! Walks an evaluation root, finds every directory holding a battery
//! report, and assembles a [`Summary`] for each: battery results from the
//! report file, configuration from the directory path, and the entropy
//! assessment for the inferred key size from the security level's
//! consolidated 90B file.
//!
//! The batch is single-threaded and per-directory: a missing or unreadable
//! file degrades that one directory's summary (absent fields, a `warn!`),
//! never the rest of the batch. The only fatal condition is discovering no
//! test directories at all.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::assessment::{extract_assessment, match_section, split_sections, EntropyAssessment};
use crate::battery::parse_battery_report;
use crate::checksum::sample_checksums;
use crate::config::{infer_configuration, Configuration, SecurityLevel};
use crate::summary::{MasterSummary, Summary, SummaryMeta};
use crate::timefmt::now_iso8601;

/// Name of the per-directory summary artifact.
pub const SUMMARY_FILENAME: &str = "summary.json";
/// Name of the root rollup artifact.
pub const MASTER_SUMMARY_FILENAME: &str = "MASTER_SUMMARY.json";

/// Candidate folder names for consolidated 90B output, tried in order.
const ENTROPY_DIR_CANDIDATES: [&str; 3] =
    ["sp800-90b-results", "SP800-90B-results", "entropy-assessment"];

/// Report filename heuristics, tried in order: the canonical STS name
/// first, then looser fallbacks.
const REPORT_NAME_HINTS: [&str; 3] = ["finalAnalysisReport", "final", "Analysis"];

// ---------------------------------------------------------------------------
// Discovery
// ---------------------------------------------------------------------------

/// Does this filename look like a battery report?
fn is_report_name(name: &str, hint: &str) -> bool {
    name.ends_with(".txt") && name.contains(hint)
}

/// Paths under the 90B results tree (or other entropy output) never count
/// as test directories even when their filenames match a report hint.
fn is_entropy_path(path: &Path) -> bool {
    let lower = path.to_string_lossy().to_lowercase();
    lower.contains("sp800-90b") || lower.contains("entropy")
}

/// Find the battery report inside one directory, trying each name hint in
/// order and picking the lexicographically first match per hint.
pub fn find_report_file(dir: &Path) -> Option<PathBuf> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .ok()?
        .filter_map(|e| e.ok())
        .filter(|e| e.path().is_file())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();

    for hint in REPORT_NAME_HINTS {
        if let Some(name) = names.iter().find(|n| is_report_name(n, hint)) {
            return Some(dir.join(name));
        }
    }
    None
}

/// Recursively collect every directory under `root` containing a battery
/// report, excluding entropy output trees. Sorted for deterministic batch
/// order.
pub fn discover_test_dirs(root: &Path) -> Vec<PathBuf> {
    let mut dirs = Vec::new();
    walk(root, &mut dirs);
    dirs.sort();
    dirs.dedup();
    dirs
}

fn walk(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("cannot read {}: {e}", dir.display());
            return;
        }
    };

    let mut has_report = false;
    for entry in entries.filter_map(|e| e.ok()) {
        let path = entry.path();
        if path.is_dir() {
            walk(&path, out);
        } else if !has_report && !is_entropy_path(&path) {
            let name = entry.file_name().to_string_lossy().into_owned();
            has_report = REPORT_NAME_HINTS.iter().any(|h| is_report_name(&name, h));
        }
    }
    if has_report {
        out.push(dir.to_path_buf());
    }
}

/// Locate the consolidated entropy folder under the evaluation root.
pub fn find_entropy_dir(root: &Path) -> Option<PathBuf> {
    ENTROPY_DIR_CANDIDATES
        .iter()
        .map(|name| root.join(name))
        .find(|p| p.is_dir())
}

// ---------------------------------------------------------------------------
// Per-directory aggregation
// ---------------------------------------------------------------------------

/// Pull the matching entropy assessment for one configuration out of the
/// security level's consolidated file. Every miss is a degradation, not an
/// error: absent folder, absent file, unreadable file, unknown level or key
/// size, and unmatched section all yield `None`.
pub fn entropy_for_configuration(root: &Path, config: &Configuration) -> Option<EntropyAssessment> {
    let filename = match config.security_level {
        SecurityLevel::Unknown => {
            log::warn!("security level unknown; skipping entropy lookup");
            return None;
        }
        level => level.entropy_filename()?,
    };
    let key_size = config.key_size.or_else(|| {
        log::warn!("key size unknown; skipping entropy lookup");
        None
    })?;

    let entropy_dir = find_entropy_dir(root).or_else(|| {
        log::warn!("no entropy results folder under {}", root.display());
        None
    })?;

    let path = entropy_dir.join(filename);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("cannot read {}: {e}", path.display());
            return None;
        }
    };

    let sections = split_sections(&text);
    match match_section(&sections, key_size) {
        Ok(section) => {
            log::debug!("matched entropy section: {}", section.header);
            Some(extract_assessment(section))
        }
        Err(e) => {
            log::warn!("{e}");
            None
        }
    }
}

/// Options for one batch run.
#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    /// Hash up to five `.bin` artifacts per directory into the summary.
    pub checksums: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self { checksums: true }
    }
}

/// Build the summary for one test directory, or `None` when no report is
/// present or readable there.
pub fn summarize_dir(root: &Path, dir: &Path, options: BatchOptions) -> Option<Summary> {
    let report_path = find_report_file(dir)?;
    let text = match fs::read_to_string(&report_path) {
        Ok(text) => text,
        Err(e) => {
            log::warn!("cannot read {}: {e}", report_path.display());
            return None;
        }
    };

    let report = parse_battery_report(&text);
    let rel = dir.strip_prefix(root).unwrap_or(dir);
    let config = infer_configuration(&rel.to_string_lossy());
    let entropy = entropy_for_configuration(root, &config);

    let checksums = if options.checksums {
        let sums = sample_checksums(dir);
        (!sums.is_empty()).then_some(sums)
    } else {
        None
    };

    let meta = SummaryMeta {
        generated: now_iso8601(),
        generator: format!("nistsum v{}", crate::VERSION),
        directory: rel.to_string_lossy().into_owned(),
        report_file: report_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };

    Some(Summary::build(meta, config, &report, entropy, checksums))
}

// ---------------------------------------------------------------------------
// Batch driver
// ---------------------------------------------------------------------------

/// Result of a whole batch run: per-directory summaries (keyed by relative
/// path, in deterministic order) and the folded master rollup.
#[derive(Debug, Clone)]
pub struct BatchResult {
    pub summaries: BTreeMap<String, Summary>,
    pub master: MasterSummary,
}

/// The process-level failure: nothing under the root looked like a test
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoTestDirectories {
    pub root: PathBuf,
}

impl std::fmt::Display for NoTestDirectories {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "no test directories found under {}", self.root.display())
    }
}

impl std::error::Error for NoTestDirectories {}

/// Process every discovered test directory under `root`.
///
/// Accumulation is a value threaded through the loop; no module state. A
/// directory whose summary cannot be built is skipped with a warning. Zero
/// discovered directories is the one fatal outcome, surfaced as
/// [`NoTestDirectories`] so the caller never receives a vacuously passing
/// master summary.
pub fn run_batch(root: &Path, options: BatchOptions) -> Result<BatchResult, NoTestDirectories> {
    let dirs = discover_test_dirs(root);
    if dirs.is_empty() {
        return Err(NoTestDirectories {
            root: root.to_path_buf(),
        });
    }

    let mut summaries = BTreeMap::new();
    for dir in &dirs {
        let rel = dir
            .strip_prefix(root)
            .unwrap_or(dir)
            .to_string_lossy()
            .into_owned();
        match summarize_dir(root, dir, options) {
            Some(summary) => {
                summaries.insert(rel, summary);
            }
            None => log::warn!("skipping {rel}: no parseable report"),
        }
    }

    let master = MasterSummary::fold(
        summaries.iter().map(|(k, v)| (k.as_str(), v)),
        now_iso8601(),
    );

    Ok(BatchResult { summaries, master })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
