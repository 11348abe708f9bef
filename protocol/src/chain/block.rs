//! # Block Structure
//!
//! Blocks come in two states:
//!
//! ```text
//! Candidate ──link_to──▶ Candidate ──stamp──▶ Candidate ──mine──▶ Block
//!  (mutable)              (linked)             (digest set)        (committed)
//! ```
//!
//! A [`Candidate`] is the caller's to play with: set the parent link, stamp
//! a digest, mine. Mining consumes it and hands back a [`Block`], which has
//! no setters at all. The chain only ever stores `Block`s, so "committed"
//! and "immutable" are the same thing.
//!
//! ## Digest
//!
//! `digest = SHA-256(previous_digest || timestamp || payload_json || nonce)`,
//! hex encoded, computed by whichever provider the block names. See
//! [`canonical`](super::canonical) for the exact preimage layout.
//!
//! ## Mining
//!
//! Bump the nonce until the digest starts with `difficulty` hex zeros. The
//! search is unbounded unless [`MiningOptions`] says otherwise. Difficulty
//! zero accepts the first digest computed.

use std::time::Instant;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use super::canonical::{canonicalize, Preimage};
use super::mining::{MiningOptions, MiningReport};
use crate::config::{
    DEADLINE_CHECK_INTERVAL, DIGEST_HEX_LENGTH, GENESIS_PREVIOUS_DIGEST, INITIAL_NONCE,
};
use crate::crypto::{ProviderId, ProviderSet};
use crate::error::{ChainError, ChainResult, ProviderError};

// ---------------------------------------------------------------------------
// Block
// ---------------------------------------------------------------------------

/// A committed block. Readable by anyone, writable by no one.
///
/// The digest always matches the other fields as computed by `provider`,
/// unless the block was deserialized from somewhere untrustworthy; that is
/// what `Chain::validate` is for.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Block {
    pub(crate) timestamp: String,
    pub(crate) payload: Option<Value>,
    pub(crate) nonce: u64,
    pub(crate) previous_digest: String,
    pub(crate) digest: String,
    pub(crate) provider: ProviderId,
}

impl Block {
    /// Construct a genesis block.
    ///
    /// The previous digest is the empty sentinel and the nonce is zero. The
    /// digest is computed once and **not** mined: genesis does not have to
    /// meet any difficulty.
    ///
    /// # Errors
    ///
    /// Propagates provider failures, e.g. an accelerated provider that has
    /// not been loaded.
    pub fn genesis(
        timestamp: impl Into<String>,
        payload: Option<Value>,
        provider: ProviderId,
        providers: &ProviderSet,
    ) -> ChainResult<Self> {
        let mut candidate = Candidate::new(timestamp, payload, provider);
        let digest = candidate.stamp(providers)?.to_string();
        Ok(candidate.commit(digest))
    }

    /// Opaque timestamp token supplied by the caller.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Nonce the digest was computed with.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Digest of the parent block. Empty for genesis.
    pub fn previous_digest(&self) -> &str {
        &self.previous_digest
    }

    /// This block's digest, lowercase hex.
    pub fn digest(&self) -> &str {
        &self.digest
    }

    /// Provider that produced [`digest`](Self::digest).
    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Whether this block has no parent.
    pub fn is_genesis(&self) -> bool {
        self.previous_digest == GENESIS_PREVIOUS_DIGEST
    }

    /// The exact string that gets hashed.
    pub fn preimage(&self) -> String {
        canonicalize(
            &self.previous_digest,
            &self.timestamp,
            self.payload.as_ref(),
            self.nonce,
        )
    }

    /// Recompute the digest from the current fields.
    pub fn compute_digest(&self, providers: &ProviderSet) -> Result<String, ProviderError> {
        Preimage::new(&self.previous_digest, &self.timestamp, self.payload.as_ref())
            .digest(self.nonce, providers.get(self.provider))
    }

    /// Whether the stored digest matches the recomputed one.
    pub fn verify_digest(&self, providers: &ProviderSet) -> Result<bool, ProviderError> {
        Ok(self.compute_digest(providers)? == self.digest)
    }

    /// Whether the digest starts with `difficulty` zeros.
    ///
    /// Difficulty isn't stored on the block, so this is a question the
    /// caller has to ask with the difficulty it cares about.
    pub fn meets_difficulty(&self, difficulty: usize) -> bool {
        leading_zeros(&self.digest) >= difficulty
    }
}

// ---------------------------------------------------------------------------
// Candidate
// ---------------------------------------------------------------------------

/// A block under construction.
///
/// Starts with nonce zero, no parent link, and no digest. Any change to the
/// link drops the stamped digest, so a candidate can never carry a digest
/// for fields it no longer has.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Candidate {
    timestamp: String,
    payload: Option<Value>,
    nonce: u64,
    previous_digest: String,
    digest: Option<String>,
    provider: ProviderId,
}

impl Candidate {
    /// A fresh candidate that will be hashed with `provider`.
    pub fn new(timestamp: impl Into<String>, payload: Option<Value>, provider: ProviderId) -> Self {
        Self {
            timestamp: timestamp.into(),
            payload,
            nonce: INITIAL_NONCE,
            previous_digest: GENESIS_PREVIOUS_DIGEST.to_string(),
            digest: None,
            provider,
        }
    }

    /// A fresh candidate whose payload is any serializable value.
    ///
    /// # Errors
    ///
    /// [`ChainError::Payload`] if `payload` can't be represented as JSON
    /// (e.g. a map with non-string keys).
    pub fn with_payload<T: Serialize>(
        timestamp: impl Into<String>,
        payload: &T,
        provider: ProviderId,
    ) -> ChainResult<Self> {
        let value = serde_json::to_value(payload)?;
        Ok(Self::new(timestamp, Some(value), provider))
    }

    /// Point this candidate at its parent. Clears any stamped digest.
    pub fn link_to(&mut self, previous_digest: impl Into<String>) {
        self.previous_digest = previous_digest.into();
        self.digest = None;
    }

    /// Compute and store the digest for the current fields and nonce.
    pub fn stamp(&mut self, providers: &ProviderSet) -> Result<&str, ProviderError> {
        let digest = Preimage::new(&self.previous_digest, &self.timestamp, self.payload.as_ref())
            .digest(self.nonce, providers.get(self.provider))?;
        Ok(self.digest.insert(digest).as_str())
    }

    /// Opaque timestamp token.
    pub fn timestamp(&self) -> &str {
        &self.timestamp
    }

    /// Payload, if any.
    pub fn payload(&self) -> Option<&Value> {
        self.payload.as_ref()
    }

    /// Current nonce.
    pub fn nonce(&self) -> u64 {
        self.nonce
    }

    /// Current parent link.
    pub fn previous_digest(&self) -> &str {
        &self.previous_digest
    }

    /// Stamped digest, if any.
    pub fn digest(&self) -> Option<&str> {
        self.digest.as_deref()
    }

    /// Provider this candidate will be hashed with.
    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// Mine with no bounds. See [`mine_with`](Self::mine_with).
    pub fn mine(self, difficulty: usize, providers: &ProviderSet) -> ChainResult<(Block, MiningReport)> {
        self.mine_with(difficulty, providers, &MiningOptions::default())
    }

    /// Search for a nonce whose digest starts with `difficulty` zeros.
    ///
    /// If no digest is stamped yet, one is computed at the current nonce
    /// first. Then, while the digest doesn't qualify, the nonce goes up by
    /// exactly one and the digest is recomputed with this candidate's
    /// provider.
    ///
    /// # Errors
    ///
    /// - [`ChainError::DifficultyTooHigh`] if `difficulty` exceeds the digest
    ///   length; no nonce could ever satisfy it.
    /// - [`ChainError::Provider`] as soon as the provider fails. The search
    ///   does not retry.
    /// - [`ChainError::MiningCancelled`] / [`ChainError::MiningTimedOut`] per
    ///   `options`.
    /// - [`ChainError::NonceExhausted`] if the nonce would overflow.
    pub fn mine_with(
        self,
        difficulty: usize,
        providers: &ProviderSet,
        options: &MiningOptions,
    ) -> ChainResult<(Block, MiningReport)> {
        if difficulty > DIGEST_HEX_LENGTH {
            return Err(ChainError::DifficultyTooHigh {
                difficulty,
                max: DIGEST_HEX_LENGTH,
            });
        }

        let started = Instant::now();
        let provider = providers.get(self.provider);
        let preimage = Preimage::new(&self.previous_digest, &self.timestamp, self.payload.as_ref());

        let mut nonce = self.nonce;
        let mut digest = match &self.digest {
            Some(stamped) => stamped.clone(),
            None => preimage.digest(nonce, provider)?,
        };
        let mut iterations = 0u64;

        while leading_zeros(&digest) < difficulty {
            if options.is_cancelled() {
                return Err(ChainError::MiningCancelled { nonce });
            }
            if iterations % DEADLINE_CHECK_INTERVAL == 0 && options.is_past_deadline() {
                return Err(ChainError::MiningTimedOut {
                    nonce,
                    elapsed_ms: started.elapsed().as_millis() as u64,
                });
            }

            nonce = nonce.checked_add(1).ok_or(ChainError::NonceExhausted)?;
            digest = preimage.digest(nonce, provider)?;
            iterations += 1;
        }

        let report = MiningReport {
            difficulty,
            nonce,
            iterations,
            elapsed: started.elapsed(),
        };
        debug!(
            provider = %self.provider,
            difficulty,
            nonce,
            iterations,
            elapsed_ms = report.elapsed.as_millis() as u64,
            %digest,
            "block mined"
        );

        let mut candidate = self;
        candidate.nonce = nonce;
        Ok((candidate.commit(digest), report))
    }

    fn commit(self, digest: String) -> Block {
        Block {
            timestamp: self.timestamp,
            payload: self.payload,
            nonce: self.nonce,
            previous_digest: self.previous_digest,
            digest,
            provider: self.provider,
        }
    }
}

/// Number of leading `'0'` characters in a hex digest.
fn leading_zeros(digest: &str) -> usize {
    digest.bytes().take_while(|&b| b == b'0').count()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::crypto::HashProvider;
    use crate::error::ProviderError;
    use crate::CancelToken;

    const TS: &str = "1700000000000";

    fn transfer() -> Value {
        json!({ "from": "John", "to": "Bob", "amount": 100 })
    }

    #[test]
    fn genesis_block_properties() {
        let providers = ProviderSet::new();
        let genesis = Block::genesis(TS, None, ProviderId::Reference, &providers).unwrap();

        assert!(genesis.is_genesis());
        assert_eq!(genesis.nonce(), 0);
        assert_eq!(genesis.previous_digest(), "");
        assert_eq!(genesis.preimage(), "1700000000000null0");
        assert_eq!(
            genesis.digest(),
            providers.reference().hash("1700000000000null0").unwrap()
        );
    }

    #[test]
    fn genesis_verifies() {
        let providers = ProviderSet::new();
        let genesis = Block::genesis(TS, None, ProviderId::Reference, &providers).unwrap();
        assert!(genesis.verify_digest(&providers).unwrap());
    }

    #[test]
    fn genesis_hash_is_deterministic() {
        let providers = ProviderSet::new();
        let g1 = Block::genesis(TS, None, ProviderId::Reference, &providers).unwrap();
        let g2 = Block::genesis(TS, None, ProviderId::Reference, &providers).unwrap();
        assert_eq!(g1.digest(), g2.digest());
    }

    #[test]
    fn genesis_with_cold_accelerated_provider_fails() {
        let providers = ProviderSet::new();
        let err = Block::genesis(TS, None, ProviderId::Accelerated, &providers).unwrap_err();
        assert!(matches!(
            err,
            ChainError::Provider(ProviderError::NotReady(ProviderId::Accelerated))
        ));
    }

    #[test]
    fn genesis_digest_is_provider_independent() {
        let providers = ProviderSet::loaded().unwrap();
        let reference = Block::genesis(TS, None, ProviderId::Reference, &providers).unwrap();
        let accelerated = Block::genesis(TS, None, ProviderId::Accelerated, &providers).unwrap();
        assert_eq!(reference.digest(), accelerated.digest());
        assert_ne!(reference.provider(), accelerated.provider());
    }

    #[test]
    fn link_to_clears_stamped_digest() {
        let providers = ProviderSet::new();
        let mut candidate = Candidate::new(TS, Some(transfer()), ProviderId::Reference);
        candidate.stamp(&providers).unwrap();
        assert!(candidate.digest().is_some());

        candidate.link_to("abc");
        assert_eq!(candidate.previous_digest(), "abc");
        assert!(candidate.digest().is_none());
    }

    #[test]
    fn mining_meets_difficulty() {
        let providers = ProviderSet::new();
        let mut candidate = Candidate::new(TS, Some(transfer()), ProviderId::Reference);
        candidate.link_to("00ff");

        let (block, report) = candidate.mine(2, &providers).unwrap();
        assert!(block.digest().starts_with("00"));
        assert!(block.meets_difficulty(2));
        assert_eq!(block.nonce(), report.nonce);
        assert_eq!(report.iterations, block.nonce());
        assert!(block.verify_digest(&providers).unwrap());
    }

    #[test]
    fn mining_only_touches_nonce_and_digest() {
        let providers = ProviderSet::new();
        let mut candidate = Candidate::new(TS, Some(transfer()), ProviderId::Reference);
        candidate.link_to("prev");

        let (block, _) = candidate.clone().mine(1, &providers).unwrap();
        assert_eq!(block.timestamp(), candidate.timestamp());
        assert_eq!(block.payload(), candidate.payload());
        assert_eq!(block.previous_digest(), candidate.previous_digest());
        assert_eq!(block.provider(), candidate.provider());
    }

    #[test]
    fn difficulty_zero_accepts_first_digest() {
        let providers = ProviderSet::new();
        let candidate = Candidate::new(TS, None, ProviderId::Reference);

        let (block, report) = candidate.mine(0, &providers).unwrap();
        assert_eq!(block.nonce(), 0);
        assert_eq!(report.iterations, 0);
        assert_eq!(block.digest().len(), DIGEST_HEX_LENGTH);
        assert!(block.verify_digest(&providers).unwrap());
    }

    #[test]
    fn mining_starts_from_stamped_digest() {
        let providers = ProviderSet::new();
        let mut candidate = Candidate::new(TS, None, ProviderId::Reference);
        let baseline = candidate.stamp(&providers).unwrap().to_string();

        let (block, _) = candidate.mine(0, &providers).unwrap();
        assert_eq!(block.digest(), baseline);
    }

    #[test]
    fn mining_is_deterministic() {
        let providers = ProviderSet::new();
        let make = || {
            let mut c = Candidate::new(TS, Some(transfer()), ProviderId::Reference);
            c.link_to("prev");
            c
        };
        let (a, _) = make().mine(2, &providers).unwrap();
        let (b, _) = make().mine(2, &providers).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn both_providers_mine_the_same_nonce() {
        let providers = ProviderSet::loaded().unwrap();
        let (a, _) = Candidate::new(TS, Some(transfer()), ProviderId::Reference)
            .mine(2, &providers)
            .unwrap();
        let (b, _) = Candidate::new(TS, Some(transfer()), ProviderId::Accelerated)
            .mine(2, &providers)
            .unwrap();
        assert_eq!(a.nonce(), b.nonce());
        assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn cold_provider_fails_mining() {
        let providers = ProviderSet::new();
        let candidate = Candidate::new(TS, None, ProviderId::Accelerated);
        let err = candidate.mine(1, &providers).unwrap_err();
        assert!(matches!(err, ChainError::Provider(ProviderError::NotReady(_))));
    }

    #[test]
    fn impossible_difficulty_is_rejected() {
        let providers = ProviderSet::new();
        let candidate = Candidate::new(TS, None, ProviderId::Reference);
        let err = candidate.mine(DIGEST_HEX_LENGTH + 1, &providers).unwrap_err();
        assert!(matches!(err, ChainError::DifficultyTooHigh { .. }));
    }

    #[test]
    fn cancelled_search_stops() {
        let providers = ProviderSet::new();
        let token = CancelToken::new();
        token.cancel();
        let options = MiningOptions::unbounded().with_cancel(token);

        let err = Candidate::new(TS, None, ProviderId::Reference)
            .mine_with(DIGEST_HEX_LENGTH, &providers, &options)
            .unwrap_err();
        assert!(matches!(err, ChainError::MiningCancelled { nonce: 0 }));
    }

    #[test]
    fn expired_deadline_stops() {
        let providers = ProviderSet::new();
        let options = MiningOptions::unbounded().with_deadline(Instant::now());

        let err = Candidate::new(TS, None, ProviderId::Reference)
            .mine_with(DIGEST_HEX_LENGTH, &providers, &options)
            .unwrap_err();
        assert!(matches!(err, ChainError::MiningTimedOut { .. }));
    }

    #[test]
    fn with_payload_serializes_structs() {
        #[derive(Serialize)]
        struct Transfer<'a> {
            from: &'a str,
            to: &'a str,
            amount: u64,
        }

        let candidate = Candidate::with_payload(
            TS,
            &Transfer { from: "John", to: "Bob", amount: 100 },
            ProviderId::Reference,
        )
        .unwrap();
        assert_eq!(candidate.payload(), Some(&transfer()));
    }

    #[test]
    fn block_serialization_roundtrip() {
        let providers = ProviderSet::new();
        let genesis = Block::genesis(TS, Some(transfer()), ProviderId::Reference, &providers).unwrap();
        let json = serde_json::to_string(&genesis).expect("serialize");
        assert!(json.contains("\"previousDigest\":\"\""));
        let recovered: Block = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(genesis, recovered);
    }

    #[test]
    fn leading_zero_count() {
        assert_eq!(leading_zeros("00a0"), 2);
        assert_eq!(leading_zeros("a000"), 0);
        assert_eq!(leading_zeros(""), 0);
    }
}
