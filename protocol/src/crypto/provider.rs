//! # Hash Providers
//!
//! The capability boundary between the chain and SHA-256. A provider takes a
//! string and hands back a lowercase hex digest, or tells you it isn't ready.
//!
//! Blocks don't hold providers. They hold a [`ProviderId`], and whoever
//! needs a digest resolves it through a [`ProviderSet`]. That keeps blocks
//! plain data (clone them, serialize them, ship them across threads) while
//! still pinning each block to the implementation that produced it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::accelerated::AcceleratedSha256;
use super::reference::ReferenceSha256;
use crate::error::ProviderError;

// ---------------------------------------------------------------------------
// ProviderId
// ---------------------------------------------------------------------------

/// Which SHA-256 implementation a block was hashed with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    /// [`ReferenceSha256`].
    Reference,
    /// [`AcceleratedSha256`].
    Accelerated,
}

impl ProviderId {
    /// Stable lowercase name, as used in serialized blocks.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Reference => "reference",
            ProviderId::Accelerated => "accelerated",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// HashProvider
// ---------------------------------------------------------------------------

/// A SHA-256 implementation the chain can hash with.
///
/// Implementations must be deterministic and must agree with every other
/// implementation on every input. A provider that isn't ready returns
/// [`ProviderError::NotReady`] instead of a digest; it never guesses.
pub trait HashProvider: Send + Sync {
    /// Identity of this implementation.
    fn id(&self) -> ProviderId;

    /// Whether `hash` will currently succeed.
    fn is_ready(&self) -> bool;

    /// Lowercase hex SHA-256 of the UTF-8 bytes of `input`.
    fn hash(&self, input: &str) -> Result<String, ProviderError>;

    /// Digest of the concatenation of `parts`.
    ///
    /// The default joins the parts and calls [`hash`](Self::hash).
    /// Implementations that can stream should override it; the result must
    /// be identical either way.
    fn hash_parts(&self, parts: &[&str]) -> Result<String, ProviderError> {
        self.hash(&parts.concat())
    }
}

// ---------------------------------------------------------------------------
// ProviderSet
// ---------------------------------------------------------------------------

/// Both SHA-256 providers, addressable by [`ProviderId`].
///
/// Usually shared behind an `Arc` between the chain and whoever is loading
/// the accelerated backend.
#[derive(Debug, Default)]
pub struct ProviderSet {
    reference: ReferenceSha256,
    accelerated: AcceleratedSha256,
}

impl ProviderSet {
    /// A set whose accelerated provider has not been loaded yet.
    pub fn new() -> Self {
        Self::default()
    }

    /// A set with the accelerated provider already loaded.
    pub fn loaded() -> Result<Self, ProviderError> {
        let set = Self::new();
        set.accelerated.load()?;
        Ok(set)
    }

    /// Resolve an id to its provider.
    pub fn get(&self, id: ProviderId) -> &dyn HashProvider {
        match id {
            ProviderId::Reference => &self.reference,
            ProviderId::Accelerated => &self.accelerated,
        }
    }

    /// The reference provider.
    pub fn reference(&self) -> &ReferenceSha256 {
        &self.reference
    }

    /// The accelerated provider, e.g. to load it or wait on it.
    pub fn accelerated(&self) -> &AcceleratedSha256 {
        &self.accelerated
    }
}
