//! # Chain Management
//!
//! The [`Chain`] owns an append-only list of committed blocks, genesis
//! first. It has exactly two jobs:
//!
//! 1. **Append.** Link a candidate to the tail, mine it, push it. Nothing is
//!    pushed unless mining succeeds, so a failed append leaves the chain
//!    exactly as it was.
//! 2. **Validate.** Walk the blocks from index 1, recompute each digest with
//!    the block's own provider, and check each link against the previous
//!    block's digest.
//!
//! ## What validation does not check
//!
//! - **Genesis.** Its digest is checked once, when the chain is built, and
//!   trusted afterwards. `validate` starts at index 1.
//! - **Difficulty.** Blocks don't record the difficulty they were mined at,
//!   so a rehashed block with a correct link but too few leading zeros still
//!   passes. Use [`Block::meets_difficulty`] if you know what to expect.

use std::fmt;
use std::slice;
use std::sync::Arc;

use tracing::{info, warn};

use super::block::{Block, Candidate};
use super::mining::{MiningOptions, MiningReport};
use crate::config::GENESIS_PREVIOUS_DIGEST;
use crate::crypto::ProviderSet;
use crate::error::{ChainError, ChainResult};

// ---------------------------------------------------------------------------
// Violation
// ---------------------------------------------------------------------------

/// The first thing wrong with a chain, as found by [`Chain::first_violation`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Violation {
    /// The stored digest doesn't match the block's fields.
    DigestMismatch {
        /// Index of the offending block.
        height: usize,
        /// Digest stored on the block.
        stored: String,
        /// Digest recomputed from its fields.
        computed: String,
    },

    /// The block's parent link doesn't match the previous block's digest.
    BrokenLink {
        /// Index of the offending block.
        height: usize,
        /// Digest of the block at `height - 1`.
        expected: String,
        /// Link stored on the block at `height`.
        found: String,
    },
}

impl Violation {
    /// Index of the block that failed.
    pub fn height(&self) -> usize {
        match self {
            Self::DigestMismatch { height, .. } | Self::BrokenLink { height, .. } => *height,
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DigestMismatch {
                height,
                stored,
                computed,
            } => write!(
                f,
                "block {} digest mismatch: stored={}, computed={}",
                height, stored, computed
            ),
            Self::BrokenLink {
                height,
                expected,
                found,
            } => write!(
                f,
                "block {} broken link: expected={}, found={}",
                height, expected, found
            ),
        }
    }
}

// ---------------------------------------------------------------------------
// Chain
// ---------------------------------------------------------------------------

/// Ordered, append-only sequence of committed blocks.
///
/// `append` takes `&mut self`, so two appends can't interleave and nobody
/// can read a half-built tail. Blocks already in the chain are only
/// reachable through shared references.
#[derive(Clone, Debug)]
pub struct Chain {
    blocks: Vec<Block>,
    providers: Arc<ProviderSet>,
}

impl Chain {
    /// Start a chain from a genesis block.
    ///
    /// # Errors
    ///
    /// - [`ChainError::InvalidGenesis`] if the block has a parent link or its
    ///   digest doesn't match its fields.
    /// - [`ChainError::Provider`] if the block's provider can't hash.
    pub fn new(genesis: Block, providers: Arc<ProviderSet>) -> ChainResult<Self> {
        check_genesis(&genesis, &providers)?;
        info!(digest = %genesis.digest(), provider = %genesis.provider(), "chain created");
        Ok(Self {
            blocks: vec![genesis],
            providers,
        })
    }

    /// Rebuild a chain from an existing block list, genesis first.
    ///
    /// Only genesis is checked here; call [`validate`](Self::validate) to
    /// check the rest.
    ///
    /// # Errors
    ///
    /// [`ChainError::ChainEmpty`] for an empty list, otherwise as
    /// [`new`](Self::new).
    pub fn from_blocks(blocks: Vec<Block>, providers: Arc<ProviderSet>) -> ChainResult<Self> {
        let genesis = blocks.first().ok_or(ChainError::ChainEmpty)?;
        check_genesis(genesis, &providers)?;
        Ok(Self { blocks, providers })
    }

    /// The most recently committed block.
    pub fn tail(&self) -> ChainResult<&Block> {
        self.blocks.last().ok_or(ChainError::ChainEmpty)
    }

    /// Link, mine, and commit a candidate with no bounds on the search.
    pub fn append(&mut self, candidate: Candidate, difficulty: usize) -> ChainResult<MiningReport> {
        self.append_with(candidate, difficulty, &MiningOptions::default())
    }

    /// Link, mine, and commit a candidate.
    ///
    /// 1. The candidate's parent link becomes the tail's digest.
    /// 2. A baseline digest is stamped for the new link.
    /// 3. The candidate is mined at `difficulty`.
    /// 4. The resulting block becomes the new tail.
    ///
    /// # Errors
    ///
    /// Anything [`Candidate::mine_with`] can return. On error the chain is
    /// unchanged and the candidate is dropped.
    pub fn append_with(
        &mut self,
        mut candidate: Candidate,
        difficulty: usize,
        options: &MiningOptions,
    ) -> ChainResult<MiningReport> {
        let parent = self.tail()?.digest().to_string();
        candidate.link_to(parent);
        candidate.stamp(&self.providers)?;

        let (block, report) = candidate.mine_with(difficulty, &self.providers, options)?;
        let height = self.blocks.len();
        info!(
            height,
            difficulty,
            nonce = report.nonce,
            iterations = report.iterations,
            elapsed_ms = report.elapsed.as_millis() as u64,
            digest = %block.digest(),
            "block appended"
        );
        self.blocks.push(block);
        Ok(report)
    }

    /// Whether every block after genesis has a matching digest and link.
    ///
    /// Tampering is an answer, not an error: a broken chain gives `Ok(false)`.
    ///
    /// # Errors
    ///
    /// [`ChainError::Provider`] if a block's provider can't hash, in which
    /// case the question can't be answered.
    pub fn validate(&self) -> ChainResult<bool> {
        Ok(self.first_violation()?.is_none())
    }

    /// The first block that fails validation, and why.
    pub fn first_violation(&self) -> ChainResult<Option<Violation>> {
        for (offset, pair) in self.blocks.windows(2).enumerate() {
            let (previous, current) = (&pair[0], &pair[1]);
            let height = offset + 1;

            let computed = current.compute_digest(&self.providers)?;
            if computed != current.digest() {
                let violation = Violation::DigestMismatch {
                    height,
                    stored: current.digest().to_string(),
                    computed,
                };
                warn!(%violation, "chain validation failed");
                return Ok(Some(violation));
            }

            if current.previous_digest() != previous.digest() {
                let violation = Violation::BrokenLink {
                    height,
                    expected: previous.digest().to_string(),
                    found: current.previous_digest().to_string(),
                };
                warn!(%violation, "chain validation failed");
                return Ok(Some(violation));
            }
        }
        Ok(None)
    }

    /// All blocks, genesis first.
    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    /// Block at `height`, if there is one.
    pub fn get(&self, height: usize) -> Option<&Block> {
        self.blocks.get(height)
    }

    /// Iterate blocks, genesis first.
    pub fn iter(&self) -> slice::Iter<'_, Block> {
        self.blocks.iter()
    }

    /// Number of blocks, genesis included.
    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// Always false for a chain built through [`new`](Self::new).
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// The providers this chain hashes with.
    pub fn providers(&self) -> &Arc<ProviderSet> {
        &self.providers
    }

    /// Pretty-printed JSON array of the blocks, for display.
    pub fn to_json_pretty(&self) -> ChainResult<String> {
        Ok(serde_json::to_string_pretty(&self.blocks)?)
    }
}

impl<'a> IntoIterator for &'a Chain {
    type Item = &'a Block;
    type IntoIter = slice::Iter<'a, Block>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn check_genesis(genesis: &Block, providers: &ProviderSet) -> ChainResult<()> {
    if genesis.previous_digest() != GENESIS_PREVIOUS_DIGEST {
        return Err(ChainError::InvalidGenesis {
            reason: format!(
                "previous digest must be empty, found {}",
                genesis.previous_digest()
            ),
        });
    }

    let computed = genesis.compute_digest(providers)?;
    if computed != genesis.digest() {
        return Err(ChainError::InvalidGenesis {
            reason: format!(
                "digest mismatch: stored={}, computed={}",
                genesis.digest(),
                computed
            ),
        });
    }

    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
