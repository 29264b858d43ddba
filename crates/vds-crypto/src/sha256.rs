//! # SHA-256 Fingerprints
//!
//! Certificates are identified in trust status lists by the SHA-256 of
//! their exact bytes as fetched, not of a re-serialization. This is the one
//! digest path that hashes raw bytes; JSON bodies go through
//! `vds_core::sha256_digest` over `CanonicalBytes`.

use sha2::{Digest, Sha256};
use vds_core::ContentDigest;

/// SHA-256 fingerprint of raw bytes.
pub fn sha256_fingerprint(bytes: &[u8]) -> ContentDigest {
    let hash = Sha256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&hash);
    ContentDigest::new(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_vector() {
        assert_eq!(
            sha256_fingerprint(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_single_byte_change_changes_fingerprint() {
        assert_ne!(sha256_fingerprint(b"cert-a"), sha256_fingerprint(b"cert-b"));
    }
}
