//! SHA-256 helpers used for shared-key authentication.
//!
//! Agent keys are compared by digest so the comparison time does not depend
//! on how many leading bytes of the presented key are correct.

use sha2::{Digest, Sha256};

/// Compute a SHA-256 hex digest of the given bytes.
pub fn sha256_hex(data: &[u8]) -> String {
    let hash = Sha256::digest(data);
    format!("{hash:x}")
}

/// Compare a presented key against the expected key.
///
/// Both sides are hashed first and the fixed-length digests are compared
/// without short-circuiting.
pub fn keys_match(presented: &str, expected: &str) -> bool {
    let a = Sha256::digest(presented.as_bytes());
    let b = Sha256::digest(expected.as_bytes());
    a.iter().zip(b.iter()).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}
