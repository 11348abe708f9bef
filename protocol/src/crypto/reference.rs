//! Reference SHA-256 provider.

use super::hash::sha256_hex;
use super::provider::{HashProvider, ProviderId};
use crate::error::ProviderError;

/// The plain `sha2` path: encode, hash, hex. Always ready.
///
/// This is the implementation every other provider is checked against.
#[derive(Clone, Copy, Debug, Default)]
pub struct ReferenceSha256;

impl HashProvider for ReferenceSha256 {
    fn id(&self) -> ProviderId {
        ProviderId::Reference
    }

    fn is_ready(&self) -> bool {
        true
    }

    fn hash(&self, input: &str) -> Result<String, ProviderError> {
        Ok(sha256_hex(input.as_bytes()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SELF_TEST_DIGEST, SELF_TEST_INPUT};

    #[test]
    fn known_answer() {
        assert_eq!(ReferenceSha256.hash(SELF_TEST_INPUT).unwrap(), SELF_TEST_DIGEST);
    }

    #[test]
    fn output_is_lowercase_hex() {
        let digest = ReferenceSha256.hash("Hello, chain").unwrap();
        assert_eq!(digest.len(), 64);
        assert!(digest.chars().all(|c| matches!(c, '0'..='9' | 'a'..='f')));
    }

    #[test]
    fn hashes_utf8_bytes() {
        // "é" is two bytes in UTF-8; the digest must cover both.
        assert_eq!(
            ReferenceSha256.hash("é").unwrap(),
            hex::encode(crate::crypto::sha256("é".as_bytes()))
        );
    }
}
