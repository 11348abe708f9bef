//! Error types for the hash chain.
//!
//! Every fallible operation returns a [`ChainError`]. Provider-level failures
//! live in [`ProviderError`] and convert into `ChainError` with `?`.
//!
//! Note what is *not* here: a chain that fails validation is not an error.
//! Tampered data is an expected outcome, so `Chain::validate` answers with
//! `Ok(false)` and keeps errors for things that stopped it from answering.

use thiserror::Error;

use crate::crypto::ProviderId;

/// Errors raised by a [`HashProvider`](crate::crypto::HashProvider).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    /// The provider has not finished loading. Nothing was hashed.
    #[error("hash provider {0} is not ready")]
    NotReady(ProviderId),

    /// The backend produced the wrong digest for the known-answer vector
    /// and refused to come up.
    #[error("hash provider self test failed: expected {expected}, computed {computed}")]
    SelfTestFailed {
        /// Digest the vector is supposed to produce.
        expected: String,
        /// Digest the backend actually produced.
        computed: String,
    },
}

/// Errors raised by block construction, mining, and chain operations.
#[derive(Debug, Error)]
pub enum ChainError {
    /// The hash provider failed. Mining stops; no stale digest is kept.
    #[error(transparent)]
    Provider(#[from] ProviderError),

    /// The block offered as genesis is not self-consistent.
    #[error("invalid genesis block: {reason}")]
    InvalidGenesis {
        /// What was wrong with it.
        reason: String,
    },

    /// The chain has no blocks. Unreachable through `Chain::new`.
    #[error("chain is empty")]
    ChainEmpty,

    /// The payload could not be converted into a JSON value.
    #[error("payload serialization failed: {0}")]
    Payload(#[from] serde_json::Error),

    /// The requested difficulty needs more zeros than a digest has digits.
    #[error("difficulty {difficulty} exceeds the maximum of {max}")]
    DifficultyTooHigh {
        /// Difficulty the caller asked for.
        difficulty: usize,
        /// Longest satisfiable prefix.
        max: usize,
    },

    /// Every `u64` nonce was tried without success.
    #[error("nonce space exhausted without finding a qualifying digest")]
    NonceExhausted,

    /// The caller cancelled the search.
    #[error("mining cancelled at nonce {nonce}")]
    MiningCancelled {
        /// Last nonce tried.
        nonce: u64,
    },

    /// The search ran past its deadline.
    #[error("mining timed out at nonce {nonce} after {elapsed_ms}ms")]
    MiningTimedOut {
        /// Last nonce tried.
        nonce: u64,
        /// Milliseconds spent searching.
        elapsed_ms: u64,
    },
}

/// Shorthand used throughout the crate.
pub type ChainResult<T> = Result<T, ChainError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_error_converts_into_chain_error() {
        fn fails() -> ChainResult<()> {
            Err(ProviderError::NotReady(ProviderId::Accelerated))?
        }

        match fails() {
            Err(ChainError::Provider(ProviderError::NotReady(ProviderId::Accelerated))) => {}
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn messages_name_the_provider() {
        let err = ChainError::from(ProviderError::NotReady(ProviderId::Accelerated));
        assert_eq!(err.to_string(), "hash provider accelerated is not ready");
    }
}
