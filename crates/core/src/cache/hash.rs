//! Request identity keys.

use sha2::{Digest, Sha256};

/// Key of a cached entry: SHA-256 over method and URL.
///
/// The URL must already be canonical (fragment removed); the query string
/// is part of the identity.
pub fn request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b" ");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}
