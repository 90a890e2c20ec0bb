//! SHA-256 content fingerprints
//!
//! The fingerprint is the sole change-detection primitive: modification
//! times and file sizes are unreliable across copies and clock skew, so
//! source and mirror are compared by digest only.

use sha2::{Digest, Sha256};
use std::path::Path;

/// Compute the SHA-256 digest of a byte buffer.
///
/// Returns the 64-character lower-case hex encoding.
pub fn hash_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Compute the SHA-256 digest of a file's contents.
///
/// Reads the file fully into memory then delegates to [`hash_bytes`].
/// Watched files are capped at 10 MiB upstream, so a streaming read is
/// not needed.
///
/// # Errors
///
/// Returns an error if the file cannot be read.
pub fn hash_file(path: &Path) -> std::io::Result<String> {
    let data = std::fs::read(path)?;
    Ok(hash_bytes(&data))
}
