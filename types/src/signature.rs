//! Chain transaction signature type.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The base58 alphabet used for chain signatures and addresses
/// (Bitcoin-style: no `0`, `O`, `I`, or `l`).
const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

/// Whether every character of `s` belongs to the base58 alphabet.
pub fn is_base58(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| BASE58_ALPHABET.contains(c))
}

/// A chain-native transaction signature.
///
/// A full 64-byte signature encodes to 87–88 base58 characters; shorter
/// strings still pass the shape check as long as they stay inside the
/// alphabet and length bound, since test fixtures and partial references
/// use truncated signatures.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TxSignature(String);

impl TxSignature {
    /// Maximum length of a base58-encoded 64-byte signature.
    pub const MAX_LEN: usize = 88;

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Shape validation: non-empty, base58 alphabet, within the length bound.
    pub fn is_well_formed(&self) -> bool {
        self.0.len() <= Self::MAX_LEN && is_base58(&self.0)
    }
}

impl fmt::Display for TxSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for TxSignature {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TxSignature {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_length_signature_is_well_formed() {
        let sig = TxSignature::new("5".repeat(88));
        assert!(sig.is_well_formed());
    }

    #[test]
    fn short_fixture_signature_is_well_formed() {
        assert!(TxSignature::new("sigA").is_well_formed());
    }

    #[test]
    fn rejects_empty_and_bad_alphabet() {
        assert!(!TxSignature::new("").is_well_formed());
        assert!(!TxSignature::new("not valid!").is_well_formed());
        assert!(!TxSignature::new("0OIl").is_well_formed());
    }

    #[test]
    fn rejects_over_length() {
        assert!(!TxSignature::new("5".repeat(89)).is_well_formed());
    }
}
