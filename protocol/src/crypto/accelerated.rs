//! # Accelerated SHA-256 Provider
//!
//! Same algorithm as the reference provider, different plumbing: the
//! preimage parts are streamed into the hasher instead of being joined into
//! one string first. In the mining loop that saves a copy of the whole
//! preimage per nonce, which adds up when the loop runs a million times.
//!
//! ## Readiness
//!
//! The backend starts cold. [`AcceleratedSha256::load`] runs a known-answer
//! test and only then flips the readiness signal. Until that happens every
//! hash call fails with [`ProviderError::NotReady`]; nothing queues. Async
//! callers can park on [`AcceleratedSha256::wait_ready`] instead of polling.

use tokio::sync::watch;
use tracing::{info, warn};

use super::hash::sha256_multi;
use super::provider::{HashProvider, ProviderId};
use crate::config::{SELF_TEST_DIGEST, SELF_TEST_INPUT};
use crate::error::ProviderError;

/// Streaming SHA-256 behind an explicit readiness gate.
#[derive(Debug)]
pub struct AcceleratedSha256 {
    ready: watch::Sender<bool>,
}

impl AcceleratedSha256 {
    /// A provider that has not been loaded yet.
    pub fn new() -> Self {
        let (ready, _) = watch::channel(false);
        Self { ready }
    }

    /// Bring the backend up.
    ///
    /// Runs the known-answer test and marks the provider ready if it passes.
    /// Calling it again on a ready provider is a no-op.
    ///
    /// # Errors
    ///
    /// [`ProviderError::SelfTestFailed`] if the backend computes the wrong
    /// digest. The provider stays not-ready.
    pub fn load(&self) -> Result<(), ProviderError> {
        if self.is_ready() {
            return Ok(());
        }

        let computed = digest_parts(&[SELF_TEST_INPUT]);
        if computed != SELF_TEST_DIGEST {
            warn!(%computed, "accelerated sha-256 self test failed");
            return Err(ProviderError::SelfTestFailed {
                expected: SELF_TEST_DIGEST.to_string(),
                computed,
            });
        }

        self.ready.send_replace(true);
        info!("accelerated sha-256 backend ready");
        Ok(())
    }

    /// Resolves once [`load`](Self::load) has succeeded.
    ///
    /// Returns immediately if the provider is already ready. Wrap it in a
    /// timeout if the loader might never run.
    pub async fn wait_ready(&self) {
        let mut rx = self.ready.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|ready| *ready).await;
    }
}

impl Default for AcceleratedSha256 {
    fn default() -> Self {
        Self::new()
    }
}

impl HashProvider for AcceleratedSha256 {
    fn id(&self) -> ProviderId {
        ProviderId::Accelerated
    }

    fn is_ready(&self) -> bool {
        *self.ready.borrow()
    }

    fn hash(&self, input: &str) -> Result<String, ProviderError> {
        self.hash_parts(&[input])
    }

    fn hash_parts(&self, parts: &[&str]) -> Result<String, ProviderError> {
        if !self.is_ready() {
            return Err(ProviderError::NotReady(ProviderId::Accelerated));
        }
        Ok(digest_parts(parts))
    }
}

/// Streams `parts` through SHA-256 and hex-encodes the result.
fn digest_parts(parts: &[&str]) -> String {
    hex::encode(sha256_multi(parts))
}
