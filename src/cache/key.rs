//! Storage key derivation.

use sha2::{Digest, Sha256};

/// Separator placed between a configured prefix and the hashed key.
pub const PREFIX_SEPARATOR: &str = "__";

/// Hash a logical key into a fixed-width, backend-safe token.
///
/// Uses the first 128 bits of SHA-256, hex encoded.
pub fn hash_key(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    hex::encode(&digest[..16])
}

/// Compute the key actually used against the driver.
///
/// With a non-empty prefix the result is `prefix + "__" + hash(key)`,
/// otherwise just `hash(key)`.
pub fn storage_key(prefix: Option<&str>, key: &str) -> String {
    match prefix {
        Some(prefix) if !prefix.is_empty() => {
            format!("{}{}{}", prefix, PREFIX_SEPARATOR, hash_key(key))
        }
        _ => hash_key(key),
    }
}
