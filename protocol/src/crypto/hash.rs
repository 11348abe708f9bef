//! # Hashing Utilities
//!
//! Raw SHA-256 helpers shared by the providers. These work on bytes and
//! know nothing about blocks, readiness, or provider identity; that all
//! lives one layer up in [`provider`](super::provider).

use sha2::{Digest, Sha256};

use crate::config::DIGEST_LENGTH;

/// Compute the SHA-256 hash of the input data.
///
/// # Example
///
/// ```
/// use hashchain::crypto::sha256;
///
/// let hash = sha256(b"hashchain");
/// assert_eq!(hash.len(), 32);
/// ```
pub fn sha256(data: &[u8]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// SHA-256 of `data`, lowercase hex encoded.
pub fn sha256_hex(data: &[u8]) -> String {
    hex::encode(sha256(data))
}

/// Hash multiple parts together without concatenating them first.
///
/// Feeding parts into the hasher one by one gives exactly the digest of
/// their concatenation, minus the temporary buffer. Takes anything
/// byte-like, so `&[&str]` preimage parts go in as they are.
pub fn sha256_multi<P: AsRef<[u8]>>(parts: &[P]) -> [u8; DIGEST_LENGTH] {
    let mut hasher = Sha256::new();
    for part in parts {
        hasher.update(part.as_ref());
    }
    hasher.finalize().into()
}
