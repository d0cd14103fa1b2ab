//! Content fingerprinting for incremental builds.
//!
//! Fingerprints detect change only; document identity is always the slug.

/// Blake3 digest of a document's raw bytes, hex encoded.
pub fn fingerprint(bytes: &[u8]) -> String {
    blake3::hash(bytes).to_hex().to_string()
}
