//! SHA-256 checksums of sample binary artifacts.
//!
//! Summaries carry hashes of a handful of the `.bin` sample files in each
//! test directory so a published summary can be tied back to the exact
//! artifacts that were tested. Capped at five files per directory.

use serde::Serialize;
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// How many `.bin` artifacts to hash per directory.
pub const MAX_SAMPLE_CHECKSUMS: usize = 5;

/// Digest and size of one sample artifact.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FileChecksum {
    pub sha256: String,
    pub size_bytes: u64,
}

/// Hash a single file, streaming in 4 KiB chunks.
pub fn sha256_file(path: &Path) -> std::io::Result<FileChecksum> {
    let mut file = File::open(path)?;
    let size_bytes = file.metadata()?.len();

    let mut hasher = Sha256::new();
    let mut buf = [0u8; 4096];
    loop {
        let n = file.read(&mut buf)?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
    }

    let digest = hasher.finalize();
    let mut sha256 = String::with_capacity(64);
    for byte in digest {
        use std::fmt::Write;
        write!(sha256, "{byte:02x}").expect("writing to a String cannot fail");
    }

    Ok(FileChecksum { sha256, size_bytes })
}

/// Checksum up to [`MAX_SAMPLE_CHECKSUMS`] `.bin` files in a directory,
/// sorted by name for determinism. Unreadable files are logged and skipped;
/// an empty result maps to an absent field in the summary.
pub fn sample_checksums(dir: &Path) -> BTreeMap<String, FileChecksum> {
    let mut bins: Vec<_> = match std::fs::read_dir(dir) {
        Ok(entries) => entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().is_some_and(|ext| ext == "bin"))
            .collect(),
        Err(e) => {
            log::warn!("cannot list {}: {e}", dir.display());
            return BTreeMap::new();
        }
    };
    bins.sort();

    let mut checksums = BTreeMap::new();
    for path in bins.into_iter().take(MAX_SAMPLE_CHECKSUMS) {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        match sha256_file(&path) {
            Ok(sum) => {
                checksums.insert(name, sum);
            }
            Err(e) => log::warn!("could not hash {name}: {e}"),
        }
    }
    checksums
}
