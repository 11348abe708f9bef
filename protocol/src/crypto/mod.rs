//! # Hashing for the Chain
//!
//! Everything that turns a preimage into a digest flows through here. There
//! is exactly one algorithm, SHA-256, and two ways of running it:
//!
//! - **Reference** — the straightforward path. Always ready, easy to audit.
//! - **Accelerated** — the streaming path. Has to be loaded and pass a
//!   known-answer test before it will hash anything.
//!
//! The two are interchangeable by contract: same input, same hex digest,
//! every time. A block records which one produced its digest and validation
//! asks the same one again.
//!
//! ## A note on "rolling your own crypto"
//!
//! We don't. Both providers are thin wrappers around the `sha2` crate. The
//! "accelerated" part is about how bytes get in and out, not about the
//! compression function.

pub mod accelerated;
pub mod hash;
pub mod provider;
pub mod reference;

pub use accelerated::AcceleratedSha256;
pub use hash::{sha256, sha256_hex, sha256_multi};
pub use provider::{HashProvider, ProviderId, ProviderSet};
pub use reference::ReferenceSha256;
