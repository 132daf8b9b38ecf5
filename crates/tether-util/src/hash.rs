use sha2::{Digest, Sha256};

/// Compute the SHA-256 hash of a byte slice, returning a lowercase hex string.
pub fn sha256_bytes(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Format a hex digest as a Subresource-Integrity style string (`sha256-<hex>`).
pub fn integrity_string(hex: &str) -> String {
    format!("sha256-{hex}")
}
