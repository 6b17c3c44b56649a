//! SHA-256 digests of binaries and provenance files.

use std::path::Path;

use sha2::{Digest, Sha256};

use crate::error::VerificationError;

/// Compute the SHA-256 hex digest of a file.
pub fn sha256_file(path: &Path) -> Result<String, VerificationError> {
    let data = std::fs::read(path)?;
    Ok(sha256_bytes(&data))
}

/// Compute the SHA-256 hex digest of a byte slice.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}

/// Check that a binary on disk has the digest a provenance recorded for it.
pub fn check_binary_digest(path: &Path, expected: &str) -> Result<(), VerificationError> {
    let actual = sha256_file(path)?;
    if actual != expected {
        return Err(VerificationError::ReferenceMismatch {
            field: "binary sha256 digest",
            expected: expected.to_owned(),
            actual,
        });
    }
    Ok(())
}
