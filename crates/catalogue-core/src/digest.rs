//! Content digests for descriptor bodies.

use serde_json::Value;
use sha2::{Digest, Sha256};

/// SHA-256 hex digest of the canonical JSON encoding of a descriptor body.
///
/// `serde_json` emits object keys in sorted order for `Value` maps, so two
/// structurally equal bodies always produce the same digest regardless of
/// the field order they arrived in.
pub fn content_digest(body: &Value) -> String {
    // A Value is valid JSON by construction, so encoding cannot fail.
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    hex::encode(Sha256::digest(bytes))
}
