//! Determinism helpers.
//!
//! Two pipeline runs over unchanged input must write byte-identical files.
//! These helpers hash output trees and pinpoint the first differing byte.

use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

use walkdir::WalkDir;

/// Computes the BLAKE3 hash of data, hex encoded.
pub fn compute_hash(data: &[u8]) -> String {
    blake3::hash(data).to_hex().to_string()
}

/// Information about the first byte difference found between runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffInfo {
    /// Byte offset where the difference was found.
    pub offset: usize,
    /// Value from the first run; `None` past its end.
    pub expected: Option<u8>,
    /// Value from the differing run; `None` past its end.
    pub actual: Option<u8>,
    /// Which run (0-indexed) produced the differing output.
    pub run_index: usize,
}

impl fmt::Display for DiffInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let byte = |b: Option<u8>| b.map(|b| format!("0x{:02X}", b)).unwrap_or("EOF".into());
        write!(
            f,
            "Difference at byte {}: expected {}, got {} (run {})",
            self.offset,
            byte(self.expected),
            byte(self.actual),
            self.run_index
        )
    }
}

/// Result of a determinism verification.
#[derive(Debug, Clone)]
pub struct DeterminismResult {
    pub is_deterministic: bool,
    pub runs: usize,
    /// Size of the first run's output in bytes.
    pub output_size: usize,
    /// BLAKE3 hash of the first run's output.
    pub hash: String,
    pub diff_info: Option<DiffInfo>,
}

impl DeterminismResult {
    /// Panic with a detailed message if not deterministic.
    pub fn assert_deterministic(&self) {
        if let Some(diff) = &self.diff_info {
            panic!(
                "Non-deterministic output detected!\n\
                 Runs: {}\n\
                 Output size: {} bytes\n\
                 Hash: {}\n\
                 {}",
                self.runs, self.output_size, self.hash, diff
            );
        }
    }
}

fn first_difference(a: &[u8], b: &[u8]) -> Option<usize> {
    a.iter()
        .zip(b)
        .position(|(x, y)| x != y)
        .or_else(|| (a.len() != b.len()).then(|| a.len().min(b.len())))
}

/// Runs `generate_fn` `runs` times and compares every output with the first.
pub fn verify_determinism<F, O>(generate_fn: F, runs: usize) -> DeterminismResult
where
    F: Fn() -> O,
    O: AsRef<[u8]>,
{
    assert!(runs >= 2, "Must run at least 2 times to verify determinism");

    let reference = generate_fn();
    let reference = reference.as_ref();
    let hash = compute_hash(reference);

    for run_index in 1..runs {
        let output = generate_fn();
        let output = output.as_ref();
        if let Some(offset) = first_difference(reference, output) {
            return DeterminismResult {
                is_deterministic: false,
                runs,
                output_size: reference.len(),
                hash,
                diff_info: Some(DiffInfo {
                    offset,
                    expected: reference.get(offset).copied(),
                    actual: output.get(offset).copied(),
                    run_index,
                }),
            };
        }
    }

    DeterminismResult {
        is_deterministic: true,
        runs,
        output_size: reference.len(),
        hash,
        diff_info: None,
    }
}

/// Hashes every file under `dir`, keyed by `/`-separated relative path.
pub fn hash_tree(dir: &Path) -> BTreeMap<String, String> {
    WalkDir::new(dir)
        .sort_by_file_name()
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| {
            let rel = entry
                .path()
                .strip_prefix(dir)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .replace('\\', "/");
            let data = std::fs::read(entry.path()).expect("Failed to read output file");
            (rel, compute_hash(&data))
        })
        .collect()
}
