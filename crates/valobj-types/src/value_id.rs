use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::canonical::canonical_json;

/// Domain tag prepended to every value hash.
const DOMAIN: &[u8] = b"valobj-value-v1:";

/// Content-addressed identifier of a plain value.
///
/// A `ValueId` is the BLAKE3 hash of the value's canonical JSON (mapping keys
/// sorted at every depth, integral floats written as integers). Deeply equal
/// values always produce the same `ValueId`, regardless of the key order or
/// number encoding they were built with.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ValueId([u8; 32]);

impl ValueId {
    /// Compute the identifier of a plain value.
    pub fn of(value: &Value) -> Self {
        let mut hasher = blake3::Hasher::new();
        hasher.update(DOMAIN);
        hasher.update(canonical_json(value).as_bytes());
        Self(*hasher.finalize().as_bytes())
    }

    /// Short hex representation (first 8 characters).
    pub fn short_hex(&self) -> String {
        hex::encode(&self.0[..4])
    }
}

impl fmt::Debug for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ValueId({})", self.short_hex())
    }
}

impl fmt::Display for ValueId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(self.0))
    }
}
