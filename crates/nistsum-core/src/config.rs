//! Configuration inference from directory naming conventions.
//!
//! Test runs are organized as directories whose names encode the security
//! level, key size, and key count (e.g. `ENHANCED-128/sqef_256bit_4keys`).
//! Nothing inside the report text repeats this metadata, so it is inferred
//! from the path with an ordered set of substring and regex rules. Absence
//! of a match leaves a field UNKNOWN rather than failing.

use regex::RegexBuilder;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::LazyLock;

// ---------------------------------------------------------------------------
// Security level
// ---------------------------------------------------------------------------

/// Key-derivation strength tier, named in the directory path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum SecurityLevel {
    Standard,
    Enhanced,
    Maximum,
    Unknown,
}

impl SecurityLevel {
    /// Output-size multiplier for this tier.
    pub fn expansion_ratio(self) -> &'static str {
        match self {
            SecurityLevel::Standard => "1:512",
            SecurityLevel::Enhanced => "1:128",
            SecurityLevel::Maximum => "1:32",
            SecurityLevel::Unknown => "UNKNOWN",
        }
    }

    /// Consolidated entropy file holding this tier's 90B assessments.
    pub fn entropy_filename(self) -> Option<&'static str> {
        match self {
            SecurityLevel::Standard => Some("entropy-assessment-standard.txt"),
            SecurityLevel::Enhanced => Some("entropy-assessment-enhanced.txt"),
            SecurityLevel::Maximum => Some("entropy-assessment-maximum.txt"),
            SecurityLevel::Unknown => None,
        }
    }

    /// Infer the tier from a path string. Rules fire in priority order:
    /// the level name (any case) or its ratio suffix (`-512`, `-128`, `-32`).
    pub fn from_path(path: &str) -> Self {
        let upper = path.to_uppercase();
        if upper.contains("STANDARD") || path.contains("-512") {
            SecurityLevel::Standard
        } else if upper.contains("ENHANCED") || path.contains("-128") {
            SecurityLevel::Enhanced
        } else if upper.contains("MAXIMUM") || path.contains("-32") {
            SecurityLevel::Maximum
        } else {
            SecurityLevel::Unknown
        }
    }
}

impl fmt::Display for SecurityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SecurityLevel::Standard => "STANDARD",
            SecurityLevel::Enhanced => "ENHANCED",
            SecurityLevel::Maximum => "MAXIMUM",
            SecurityLevel::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

// ---------------------------------------------------------------------------
// Key size
// ---------------------------------------------------------------------------

/// The fixed set of sample key/slice sizes the evaluation covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeySize {
    Bits128,
    Bits256,
    Bits512,
    Bits1024,
    Bits2048,
    Bits4096,
    Kb1,
    Kb4,
    Mb1,
    Mb16,
    Mb256,
    Mb512,
}

/// Inference order matters: evaluated first match wins against a path.
pub const KEY_SIZES: [KeySize; 12] = [
    KeySize::Bits128,
    KeySize::Bits256,
    KeySize::Bits512,
    KeySize::Bits1024,
    KeySize::Bits2048,
    KeySize::Bits4096,
    KeySize::Kb1,
    KeySize::Kb4,
    KeySize::Mb1,
    KeySize::Mb16,
    KeySize::Mb256,
    KeySize::Mb512,
];

impl KeySize {
    /// Display label, e.g. `256-bit` or `16MB`.
    pub fn label(self) -> &'static str {
        match self {
            KeySize::Bits128 => "128-bit",
            KeySize::Bits256 => "256-bit",
            KeySize::Bits512 => "512-bit",
            KeySize::Bits1024 => "1024-bit",
            KeySize::Bits2048 => "2048-bit",
            KeySize::Bits4096 => "4096-bit",
            KeySize::Kb1 => "1KB",
            KeySize::Kb4 => "4KB",
            KeySize::Mb1 => "1MB",
            KeySize::Mb16 => "16MB",
            KeySize::Mb256 => "256MB",
            KeySize::Mb512 => "512MB",
        }
    }

    /// Substring patterns identifying this size in an entropy section
    /// header. Underscore-delimited to avoid false matches between sizes
    /// that share digits (`_512bit_` vs `_512MB_`).
    pub fn section_patterns(self) -> &'static [&'static str] {
        match self {
            KeySize::Bits128 => &["_128bit_"],
            KeySize::Bits256 => &["_256bit_"],
            KeySize::Bits512 => &["_512bit_"],
            KeySize::Bits1024 => &["_1024bit_"],
            KeySize::Bits2048 => &["_2048bit_"],
            KeySize::Bits4096 => &["_4096bit_"],
            KeySize::Kb1 => &["_1KB_"],
            KeySize::Kb4 => &["_4KB_"],
            KeySize::Mb1 => &["_1MB_"],
            KeySize::Mb16 => &["_16MB_"],
            KeySize::Mb256 => &["_256MB_"],
            KeySize::Mb512 => &["_512MB_"],
        }
    }

    /// Path-inference pattern, tolerant of `-`/`_` separators.
    fn path_pattern(self) -> &'static str {
        match self {
            KeySize::Bits128 => r"128[-_]?bit",
            KeySize::Bits256 => r"256[-_]?bit",
            KeySize::Bits512 => r"512[-_]?bit",
            KeySize::Bits1024 => r"1024[-_]?bit",
            KeySize::Bits2048 => r"2048[-_]?bit",
            KeySize::Bits4096 => r"4096[-_]?bit",
            KeySize::Kb1 => r"1[-_]?KB",
            KeySize::Kb4 => r"4[-_]?KB",
            KeySize::Mb1 => r"1[-_]?MB",
            KeySize::Mb16 => r"16[-_]?MB",
            KeySize::Mb256 => r"256[-_]?MB",
            KeySize::Mb512 => r"512[-_]?MB",
        }
    }

    /// Infer the key size from a path string, first matching pattern wins.
    pub fn from_path(path: &str) -> Option<Self> {
        KEY_SIZE_PATTERNS
            .iter()
            .find(|(re, _)| re.is_match(path))
            .map(|&(_, size)| size)
    }
}

impl fmt::Display for KeySize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

static KEY_SIZE_PATTERNS: LazyLock<Vec<(regex::Regex, KeySize)>> = LazyLock::new(|| {
    KEY_SIZES
        .iter()
        .map(|&size| {
            let re = RegexBuilder::new(size.path_pattern())
                .case_insensitive(true)
                .build()
                .expect("key size pattern is a valid regex");
            (re, size)
        })
        .collect()
});

static KEY_COUNT_PATTERN: LazyLock<regex::Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"(\d+)keys")
        .case_insensitive(true)
        .build()
        .expect("key count pattern is a valid regex")
});

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration metadata derived once from a directory path; immutable
/// afterward.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Configuration {
    pub security_level: SecurityLevel,
    pub expansion_ratio: &'static str,
    #[serde(serialize_with = "ser_key_size")]
    pub key_size: Option<KeySize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_keys: Option<u32>,
}

fn ser_key_size<S: Serializer>(size: &Option<KeySize>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(size.map(KeySize::label).unwrap_or("UNKNOWN"))
}

/// Derive the full configuration from a directory path. Rules are
/// independent; any field without a match stays UNKNOWN/absent.
pub fn infer_configuration(path: &str) -> Configuration {
    let security_level = SecurityLevel::from_path(path);
    let num_keys = KEY_COUNT_PATTERN
        .captures(path)
        .and_then(|c| c[1].parse().ok());

    Configuration {
        security_level,
        expansion_ratio: security_level.expansion_ratio(),
        key_size: KeySize::from_path(path),
        num_keys,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
