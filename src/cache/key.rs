//! Cache key generation using SHA-256 hashes

use std::fmt;

use sha2::{Digest, Sha256};

use crate::models::RequestDescriptor;

/// Opaque cache key: lowercase hex SHA-256 of a request descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether `name` looks like a key this crate produced (64 lowercase hex chars).
    pub fn is_key(name: &str) -> bool {
        name.len() == 64 && name.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Generate a deterministic cache key from a request descriptor.
///
/// The key is a SHA-256 hash of the command and its normalized parameters in
/// sorted order, so equivalent requests always share a key.
pub fn fingerprint(descriptor: &RequestDescriptor) -> CacheKey {
    let mut hasher = Sha256::new();

    hasher.update(descriptor.command().as_str().as_bytes());
    hasher.update(b"|");

    // BTreeMap iterates in key order
    for (k, v) in descriptor.params() {
        hasher.update(k.as_bytes());
        hasher.update(b"=");
        hasher.update(v.len().to_string().as_bytes());
        hasher.update(b":");
        hasher.update(v.as_bytes());
        hasher.update(b"&");
    }

    CacheKey(format!("{:x}", hasher.finalize()))
}
