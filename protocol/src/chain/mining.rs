//! Mining knobs and results.
//!
//! By default the nonce search is unbounded: it runs until it finds a digest
//! or the provider fails. [`MiningOptions`] adds the two escape hatches a
//! long-running search needs, a cancellation token and a wall-clock deadline.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Shared flag for stopping a search from another thread.
///
/// Clones share the flag. Once cancelled, a token stays cancelled.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// A fresh, uncancelled token.
    pub fn new() -> Self {
        Self::default()
    }

    /// Ask every search holding this token to stop.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Bounds on a single nonce search. The default has none.
#[derive(Clone, Debug, Default)]
pub struct MiningOptions {
    /// Checked before every nonce.
    pub cancel: Option<CancelToken>,
    /// Checked every [`DEADLINE_CHECK_INTERVAL`](crate::config::DEADLINE_CHECK_INTERVAL) nonces.
    pub deadline: Option<Instant>,
}

impl MiningOptions {
    /// No cancellation, no deadline.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Stop when `token` is cancelled.
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Stop once `deadline` has passed.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Stop `timeout` from now.
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    pub(crate) fn is_cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub(crate) fn is_past_deadline(&self) -> bool {
        self.deadline.is_some_and(|deadline| Instant::now() >= deadline)
    }
}

/// What a successful search cost.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MiningReport {
    /// Difficulty the block was mined at.
    pub difficulty: usize,
    /// Winning nonce.
    pub nonce: u64,
    /// Digests computed after the baseline, i.e. how many times the nonce
    /// was bumped. Zero when the baseline already qualified.
    pub iterations: u64,
    /// Wall-clock time spent in the search.
    pub elapsed: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancel_is_shared_between_clones() {
        let token = CancelToken::new();
        let clone = token.clone();
        assert!(!clone.is_cancelled());
        token.cancel();
        assert!(clone.is_cancelled());
    }

    #[test]
    fn default_options_never_stop() {
        let options = MiningOptions::unbounded();
        assert!(!options.is_cancelled());
        assert!(!options.is_past_deadline());
    }

    #[test]
    fn past_deadline_is_detected() {
        let options = MiningOptions::unbounded().with_deadline(Instant::now());
        assert!(options.is_past_deadline());

        let options = MiningOptions::unbounded().with_timeout(Duration::from_secs(3600));
        assert!(!options.is_past_deadline());
    }
}
