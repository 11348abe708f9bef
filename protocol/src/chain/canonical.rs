//! # Canonical Preimages
//!
//! A block's digest is SHA-256 over a plain string, not over a structured
//! encoding. The string is the concatenation, in this exact order, of:
//!
//! ```text
//! previous_digest || timestamp || canonical_payload || decimal(nonce)
//! ```
//!
//! There are no separators and no length prefixes. That is ambiguous in
//! theory (`"ab" + "c"` hashes like `"a" + "bc"`), but the format is fixed:
//! any change here orphans every digest ever computed.
//!
//! The payload is rendered as compact JSON with object keys sorted at every
//! level, so two structurally equal payloads always produce the same text.
//! A missing payload renders as the literal `null`.

use serde_json::{Map, Value};

use crate::config::NULL_PAYLOAD_LITERAL;
use crate::crypto::HashProvider;
use crate::error::ProviderError;

/// Canonical text for a payload.
pub fn canonical_payload(payload: Option<&Value>) -> String {
    match payload {
        None | Some(Value::Null) => NULL_PAYLOAD_LITERAL.to_string(),
        Some(value) => sort_keys(value).to_string(),
    }
}

/// The full preimage string for one set of block fields.
pub fn canonicalize(
    previous_digest: &str,
    timestamp: &str,
    payload: Option<&Value>,
    nonce: u64,
) -> String {
    Preimage::new(previous_digest, timestamp, payload).render(nonce)
}

/// Rebuilds `value` with object keys in sorted order, recursively.
///
/// serde_json's default map is already sorted, but `preserve_order` can be
/// switched on by any crate in the build. Sorting explicitly keeps the
/// preimage independent of feature unification.
fn sort_keys(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(&String, &Value)> = map.iter().collect();
            entries.sort_by(|a, b| a.0.cmp(b.0));
            let mut sorted = Map::with_capacity(entries.len());
            for (key, inner) in entries {
                sorted.insert(key.clone(), sort_keys(inner));
            }
            Value::Object(sorted)
        }
        Value::Array(items) => Value::Array(items.iter().map(sort_keys).collect()),
        other => other.clone(),
    }
}

// ---------------------------------------------------------------------------
// Preimage
// ---------------------------------------------------------------------------

/// Everything in a preimage except the nonce, with the payload pre-rendered.
///
/// Mining hashes the same fields over and over with a different nonce each
/// time. Serializing the payload once up front keeps the loop down to "format
/// an integer, hash four strings".
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Preimage<'a> {
    previous_digest: &'a str,
    timestamp: &'a str,
    payload: String,
}

impl<'a> Preimage<'a> {
    /// Capture the nonce-independent fields.
    pub fn new(previous_digest: &'a str, timestamp: &'a str, payload: Option<&Value>) -> Self {
        Self {
            previous_digest,
            timestamp,
            payload: canonical_payload(payload),
        }
    }

    /// The preimage as one string, for a given nonce.
    pub fn render(&self, nonce: u64) -> String {
        self.parts(&nonce.to_string()).concat()
    }

    /// Digest of the preimage at `nonce`, computed by `provider`.
    pub fn digest(&self, nonce: u64, provider: &dyn HashProvider) -> Result<String, ProviderError> {
        let nonce = nonce.to_string();
        provider.hash_parts(&self.parts(&nonce))
    }

    fn parts<'s>(&'s self, nonce: &'s str) -> [&'s str; 4] {
        [self.previous_digest, self.timestamp, self.payload.as_str(), nonce]
    }
}
