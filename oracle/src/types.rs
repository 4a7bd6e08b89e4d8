//! Typed view of a confirmed chain transaction.

use serde::{Deserialize, Serialize};

/// A transaction as reported by the oracle, validated at the boundary.
///
/// `raw` retains the provider's full payload for the verification record's
/// audit blob; everything the engine reasons about is lifted into typed
/// fields here.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChainTx {
    pub signature: String,
    /// Slot the transaction was confirmed in; 0 means unconfirmed.
    pub slot: u64,
    pub block_time: Option<i64>,
    /// Chain-reported execution error, if the transaction failed on-chain.
    pub err: Option<serde_json::Value>,
    pub fee: u64,
    pub pre_balances: Vec<u64>,
    pub post_balances: Vec<u64>,
    pub account_keys: Vec<String>,
    /// The provider's full response, kept for audit.
    pub raw: serde_json::Value,
}
