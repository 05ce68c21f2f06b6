use crate::error::AddressError;
use serde_json::Value;
use sha3::{Digest, Keccak256};

/// Returns true for `0x`-optional strings of exactly 40 hex digits.
pub fn is_address_like(raw: &str) -> bool {
    let body = strip_prefix(raw.trim());
    body.len() == 40 && body.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Normalizes an address to its EIP-55 mixed-case checksum form.
///
/// The input case is ignored; the checksum is recomputed from the
/// Keccak-256 digest of the lowercase hex body.
pub fn to_checksum_address(raw: &str) -> Result<String, AddressError> {
    let trimmed = raw.trim();
    if !is_address_like(trimmed) {
        return Err(AddressError::InvalidAddress(raw.to_string()));
    }

    let lower = strip_prefix(trimmed).to_ascii_lowercase();
    let digest = hex::encode(Keccak256::digest(lower.as_bytes()));

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (c, nibble) in lower.chars().zip(digest.chars()) {
        // Letters whose digest nibble is >= 8 are upper-cased.
        if c.is_ascii_alphabetic() && nibble.to_digit(16).is_some_and(|n| n >= 8) {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    Ok(out)
}

/// Checksums a parameter in place when it is an address-like string.
///
/// Context placeholders and non-address values are left untouched.
pub fn checksum_parameter(value: &mut Value) {
    if let Value::String(s) = value {
        if s.starts_with(':') {
            return;
        }
        if let Ok(checksummed) = to_checksum_address(s) {
            *s = checksummed;
        }
    }
}

fn strip_prefix(raw: &str) -> &str {
    raw.strip_prefix("0x")
        .or_else(|| raw.strip_prefix("0X"))
        .unwrap_or(raw)
}
