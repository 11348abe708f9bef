// Copyright (c) 2026 ALAS Technology. MIT License.
// See LICENSE for details.

//! # hashchain — Core Library
//!
//! A small proof-of-work hash chain. Every block is named by the SHA-256
//! digest of its own content plus its parent's digest, and every block after
//! genesis has to be mined: the nonce is bumped until the digest starts with
//! enough zeros. No consensus, no peers, no disk. Just the part that makes a
//! chain a chain.
//!
//! ## Architecture
//!
//! - **config** — Constants: default difficulty, sentinels, literal forms.
//! - **error** — `ChainError` and `ProviderError`. One place for everything
//!   that can go wrong.
//! - **crypto** — The `HashProvider` seam and its two SHA-256 backends
//!   (reference and accelerated). They must agree byte for byte.
//! - **chain** — Canonical preimages, candidates, mining, and the `Chain`
//!   container with append and validation.
//!
//! ## Quick tour
//!
//! ```
//! use std::sync::Arc;
//! use hashchain::{Block, Candidate, Chain, ProviderId, ProviderSet};
//!
//! let providers = Arc::new(ProviderSet::new());
//! let genesis = Block::genesis("1700000000000", None, ProviderId::Reference, &providers)?;
//! let mut chain = Chain::new(genesis, Arc::clone(&providers))?;
//!
//! let payload = serde_json::json!({ "from": "John", "to": "Bob", "amount": 100 });
//! let candidate = Candidate::new("1700000000000", Some(payload), ProviderId::Reference);
//! chain.append(candidate, 2)?;
//!
//! assert!(chain.validate()?);
//! assert!(chain.tail()?.digest().starts_with("00"));
//! # Ok::<(), hashchain::ChainError>(())
//! ```

pub mod chain;
pub mod config;
pub mod crypto;
pub mod error;

pub use chain::{
    Block, CancelToken, Candidate, Chain, MiningOptions, MiningReport, Preimage, Violation,
};
pub use crypto::{AcceleratedSha256, HashProvider, ProviderId, ProviderSet, ReferenceSha256};
pub use error::{ChainError, ChainResult, ProviderError};
