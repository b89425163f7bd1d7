//! ENS name handling
//!
//! Normalization (UTS-46), namehash and labelhash as defined by EIP-137,
//! and the helpers the reconciler needs to pick a registrar.

use sha3::{Digest, Keccak256};

use crate::error::{Error, Result};

/// Parent of every reverse record
pub const REVERSE_SUFFIX: &str = "addr.reverse";

/// Name whose `addr` record points at the default public resolver
pub const RESOLVER_NAME: &str = "resolver.eth";

/// Keccak-256 of `bytes`
pub fn keccak256(bytes: &[u8]) -> [u8; 32] {
    let digest = Keccak256::digest(bytes);
    let mut out = [0u8; 32];
    out.copy_from_slice(&digest);
    out
}

/// Normalize a name the way ENS does (UTS-46 mapping, lowercase)
pub fn normalize(name: &str) -> Result<String> {
    let (normalized, result) = idna::domain_to_unicode(name);
    result.map_err(|e| Error::invalid_input(format!("Invalid ENS name '{}': {:?}", name, e)))?;
    Ok(normalized)
}

/// Hash of a single label
pub fn labelhash(label: &str) -> [u8; 32] {
    keccak256(label.as_bytes())
}

/// EIP-137 namehash of a (not yet normalized) name
pub fn namehash(name: &str) -> Result<[u8; 32]> {
    let normalized = normalize(name)?;
    let mut node = [0u8; 32];
    if normalized.is_empty() {
        return Ok(node);
    }

    for label in normalized.rsplit('.') {
        let mut buf = [0u8; 64];
        buf[..32].copy_from_slice(&node);
        buf[32..].copy_from_slice(&labelhash(label));
        node = keccak256(&buf);
    }

    Ok(node)
}

/// Namehash as lowercase hex without the `0x` prefix
pub fn namehash_hex(name: &str) -> Result<String> {
    Ok(hex::encode(namehash(name)?))
}

/// Split `name` at its first dot into (label, parent)
///
/// `"foo.test"` yields `("foo", "test")`; a single label has an empty parent.
pub fn split_label(name: &str) -> (&str, &str) {
    match name.split_once('.') {
        Some((label, parent)) => (label, parent),
        None => (name, ""),
    }
}

/// Compare two names after normalization
pub fn same_name(a: &str, b: &str) -> Result<bool> {
    Ok(normalize(a)? == normalize(b)?)
}

/// Decode hex with an optional `0x` prefix
pub(crate) fn decode_hex(value: &str) -> Result<Vec<u8>> {
    let trimmed = value.trim();
    let digits = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
        .unwrap_or(trimmed);
    hex::decode(digits).map_err(|e| Error::invalid_input(format!("Invalid hex '{}': {}", value, e)))
}
