//! Wallet address type.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::signature::is_base58;

/// A chain wallet address (base58-encoded public key).
///
/// Addresses arrive from webhook payloads and oracle responses; they are kept
/// as opaque strings and validated only for shape, never resolved locally.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Minimum / maximum length of a base58-encoded 32-byte public key.
    pub const MIN_LEN: usize = 32;
    pub const MAX_LEN: usize = 44;

    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether this address looks like a well-formed chain address.
    pub fn is_valid(&self) -> bool {
        (Self::MIN_LEN..=Self::MAX_LEN).contains(&self.0.len()) && is_base58(&self.0)
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for WalletAddress {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WalletAddress {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_typical_address() {
        let addr = WalletAddress::new("7xKXtg2CW87d97TXJSDpbD5jBkheTqA83TZRuJosgAsU");
        assert!(addr.is_valid());
    }

    #[test]
    fn rejects_short_or_non_base58() {
        assert!(!WalletAddress::new("abc").is_valid());
        assert!(!WalletAddress::new("O0Il".repeat(10)).is_valid());
    }
}
