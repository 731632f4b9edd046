//! Membership-based line comparison tolerant of a small mismatch count
//!
//! Generated stylesheets carry a few volatile lines (codepoint
//! assignments, generated comments) that legitimately differ between
//! runs, so exact file equality would make the suite flaky. Instead the
//! comparator counts expected lines that appear nowhere in the actual
//! file and allows up to a fixed number of them.

use std::collections::HashSet;
use std::path::Path;

use crate::error::HarnessResult;
use crate::fixture;

/// Default number of missing lines a comparison may tolerate.
pub const DEFAULT_LINE_THRESHOLD: usize = 3;

/// Line-level comparison of one actual/expected file pair.
#[derive(Debug, Clone)]
pub struct LineDiff {
    /// Expected lines absent from the actual file
    pub missing: Vec<String>,

    /// Threshold the comparison was made against (inclusive)
    pub threshold: usize,
}

impl LineDiff {
    pub fn within_threshold(&self) -> bool {
        self.missing.len() <= self.threshold
    }
}

/// Compares text files by line membership, not positional alignment.
#[derive(Debug, Clone)]
pub struct LineComparator {
    pub threshold: usize,
}

impl Default for LineComparator {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_LINE_THRESHOLD,
        }
    }
}

impl LineComparator {
    pub fn new(threshold: usize) -> Self {
        Self { threshold }
    }

    /// Expected lines absent anywhere in the actual sequence. Order
    /// within the file is not enforced.
    pub fn missing_lines(&self, expected: &[String], actual: &[String]) -> Vec<String> {
        let actual: HashSet<&str> = actual.iter().map(String::as_str).collect();
        expected
            .iter()
            .filter(|line| !actual.contains(line.as_str()))
            .cloned()
            .collect()
    }

    /// Load both files and diff them, with an optional per-file
    /// threshold override.
    pub fn compare_files(
        &self,
        actual_path: &Path,
        expected_path: &Path,
        threshold: Option<usize>,
    ) -> HarnessResult<LineDiff> {
        let actual = fixture::load_lines(actual_path)?;
        let expected = fixture::load_lines(expected_path)?;

        Ok(LineDiff {
            missing: self.missing_lines(&expected, &actual),
            threshold: threshold.unwrap_or(self.threshold),
        })
    }
}
