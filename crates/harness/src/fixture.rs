//! Fixture tree management
//!
//! Each scenario run owns a disposable "actual" output tree that is
//! wiped before the build tool regenerates it. The "expected" tree is
//! the golden fixture set and is never written to.

use std::path::{Path, PathBuf};
use tracing::debug;

use crate::error::{HarnessError, HarnessResult};

/// Remove a generated output tree, tolerating its absence.
pub fn clean_output_tree(dir: &Path) -> HarnessResult<()> {
    match std::fs::remove_dir_all(dir) {
        Ok(()) => {
            debug!("Removed {}", dir.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

/// Read a generated text file as owned lines.
pub fn load_lines(path: &Path) -> HarnessResult<Vec<String>> {
    if !path.exists() {
        return Err(HarnessError::MissingOutput(path.to_path_buf()));
    }
    let content = std::fs::read_to_string(path)?;
    Ok(content.lines().map(str::to_owned).collect())
}

/// Read a generated binary file.
pub fn load_bytes(path: &Path) -> HarnessResult<Vec<u8>> {
    if !path.exists() {
        return Err(HarnessError::MissingOutput(path.to_path_buf()));
    }
    Ok(std::fs::read(path)?)
}

/// Actual and expected roots for one suite run.
#[derive(Debug, Clone)]
pub struct FixtureLayout {
    pub actual_root: PathBuf,
    pub expected_root: PathBuf,
}

impl FixtureLayout {
    /// Conventional layout: `actual_files/` and `expected_files/` under
    /// one fixture root.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            actual_root: root.join("actual_files"),
            expected_root: root.join("expected_files"),
        }
    }

    pub fn actual(&self, relative: &str) -> PathBuf {
        self.actual_root.join(relative)
    }

    pub fn expected(&self, relative: &str) -> PathBuf {
        self.expected_root.join(relative)
    }
}
