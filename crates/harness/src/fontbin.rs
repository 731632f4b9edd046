//! Binary font comparison
//!
//! Generated font binaries are compared byte-for-byte against the
//! golden set, backed by SHA-256 digests so mismatch reports are easy
//! to correlate with checked-in fixtures. An empty actual font is
//! always a failure regardless of the comparison mode.

use sha2::{Digest, Sha256};
use std::path::Path;

use crate::error::{HarnessError, HarnessResult};
use crate::fixture;

/// Byte-level comparison of one actual/expected font pair.
#[derive(Debug, Clone)]
pub struct FontDiff {
    pub identical: bool,
    pub actual_len: u64,
    pub expected_len: u64,
    pub actual_sha256: String,
    pub expected_sha256: String,
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

/// Compare two font files byte-for-byte.
pub fn compare(actual: &Path, expected: &Path) -> HarnessResult<FontDiff> {
    let actual_bytes = fixture::load_bytes(actual)?;
    if actual_bytes.is_empty() {
        return Err(HarnessError::EmptyFont {
            file: actual.to_path_buf(),
        });
    }

    let expected_bytes = fixture::load_bytes(expected)?;

    Ok(FontDiff {
        identical: actual_bytes == expected_bytes,
        actual_len: actual_bytes.len() as u64,
        expected_len: expected_bytes.len() as u64,
        actual_sha256: sha256_hex(&actual_bytes),
        expected_sha256: sha256_hex(&expected_bytes),
    })
}
