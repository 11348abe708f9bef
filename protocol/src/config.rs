//! # Protocol Configuration & Constants
//!
//! Every magic value in the chain lives here. Most of them are frozen by the
//! preimage format: change a literal and every existing digest stops
//! verifying, so don't.

use std::time::Duration;

// ---------------------------------------------------------------------------
// Protocol Version
// ---------------------------------------------------------------------------

/// Crate-level protocol version, reported by the CLI.
pub const PROTOCOL_VERSION: &str = "0.1.0";

// ---------------------------------------------------------------------------
// Hashing
// ---------------------------------------------------------------------------

/// The one and only hash function. Both providers implement it.
pub const HASH_FUNCTION: &str = "SHA-256";

/// SHA-256 output length in bytes.
pub const DIGEST_LENGTH: usize = 32;

/// Length of a hex-encoded digest. Also the hardest difficulty that can be
/// satisfied at all.
pub const DIGEST_HEX_LENGTH: usize = DIGEST_LENGTH * 2;

/// Known-answer vector the accelerated backend must reproduce before it is
/// allowed to report ready. This is the FIPS 180-2 `"abc"` test.
pub const SELF_TEST_INPUT: &str = "abc";

/// Expected digest for [`SELF_TEST_INPUT`].
pub const SELF_TEST_DIGEST: &str =
    "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad";

// ---------------------------------------------------------------------------
// Preimage Format
// ---------------------------------------------------------------------------

/// Previous-digest value carried by the genesis block. There is no parent,
/// so the link is the empty string and contributes nothing to the preimage.
pub const GENESIS_PREVIOUS_DIGEST: &str = "";

/// Literal rendered for an absent or `null` payload.
pub const NULL_PAYLOAD_LITERAL: &str = "null";

/// Nonce every block starts from.
pub const INITIAL_NONCE: u64 = 0;

// ---------------------------------------------------------------------------
// Mining
// ---------------------------------------------------------------------------

/// Difficulty used when the caller doesn't pick one. Five hex zeros is about
/// a million attempts on average: a few seconds, not a coffee break.
pub const DEFAULT_DIFFICULTY: usize = 5;

/// How many nonces to try between deadline checks. Reading the clock on
/// every iteration would cost more than the hash on fast hardware.
pub const DEADLINE_CHECK_INTERVAL: u64 = 1024;

// ---------------------------------------------------------------------------
// Accelerated Backend
// ---------------------------------------------------------------------------

/// How long callers should wait for the accelerated backend to report ready
/// before giving up.
pub const PROVIDER_READY_TIMEOUT: Duration = Duration::from_secs(5);
