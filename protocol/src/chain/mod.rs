//! # Chain Module
//!
//! Blocks, mining, and the chain that holds them.
//!
//! ```text
//! canonical.rs — Preimage layout and canonical payload JSON
//! block.rs     — Candidate (mutable) and Block (committed), digest + mining
//! mining.rs    — Cancellation, deadlines, and mining reports
//! ledger.rs    — Chain: append, validate, enumerate
//! ```
//!
//! ## Data Flow
//!
//! ```text
//! Candidate ──append──▶ link ─▶ stamp ─▶ mine ─▶ Block ─▶ Chain.blocks
//!                                          │
//!                                   ProviderSet[provider]
//! ```

pub mod block;
pub mod canonical;
pub mod ledger;
pub mod mining;

pub use block::{Block, Candidate};
pub use canonical::{canonical_payload, canonicalize, Preimage};
pub use ledger::{Chain, Violation};
pub use mining::{CancelToken, MiningOptions, MiningReport};
