//! Nullable chain oracle — programmable responses, no network.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use gratia_oracle::{ChainOracle, ChainTx, OracleError};
use gratia_types::TxSignature;

/// Scripted behavior for one signature.
enum Script {
    Tx(ChainTx),
    NotFound,
    Timeout,
    ApiError(u16),
}

/// A deterministic oracle for testing.
///
/// Unscripted signatures resolve to not-found. Every call is counted so
/// tests can assert the engine skipped redundant oracle work.
#[derive(Default)]
pub struct NullOracle {
    scripts: Mutex<HashMap<String, Script>>,
    calls: Mutex<HashMap<String, usize>>,
}

impl NullOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a minimal confirmed transaction payload.
    pub fn confirmed_tx(signature: &str, slot: u64) -> ChainTx {
        ChainTx {
            signature: signature.to_string(),
            slot,
            block_time: Some(1_700_000_000),
            err: None,
            fee: 5_000,
            pre_balances: vec![1_000_000_000, 0],
            post_balances: vec![498_995_000, 500_000_000],
            account_keys: vec!["sender".into(), "recipient".into()],
            raw: serde_json::json!({ "signature": signature, "slot": slot }),
        }
    }

    /// Script the oracle to return the given transaction.
    pub fn with_tx(self, signature: &str, tx: ChainTx) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(signature.to_string(), Script::Tx(tx));
        self
    }

    /// Script the oracle to report the signature as unknown.
    pub fn with_not_found(self, signature: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(signature.to_string(), Script::NotFound);
        self
    }

    /// Script the oracle to time out for the signature.
    pub fn with_timeout(self, signature: &str) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(signature.to_string(), Script::Timeout);
        self
    }

    /// Script the oracle to fail with an HTTP status for the signature.
    pub fn with_api_error(self, signature: &str, status: u16) -> Self {
        self.scripts
            .lock()
            .unwrap()
            .insert(signature.to_string(), Script::ApiError(status));
        self
    }

    /// Re-script an existing oracle to start returning the transaction,
    /// e.g. after a scripted outage or a late confirmation.
    pub fn script_tx(&self, signature: &str, tx: ChainTx) {
        self.scripts
            .lock()
            .unwrap()
            .insert(signature.to_string(), Script::Tx(tx));
    }

    /// How many times the given signature has been fetched.
    pub fn call_count(&self, signature: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .get(signature)
            .copied()
            .unwrap_or(0)
    }
}

#[async_trait]
impl ChainOracle for NullOracle {
    async fn fetch_chain_tx(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<ChainTx>, OracleError> {
        *self
            .calls
            .lock()
            .unwrap()
            .entry(signature.as_str().to_string())
            .or_insert(0) += 1;

        let scripts = self.scripts.lock().unwrap();
        match scripts.get(signature.as_str()) {
            Some(Script::Tx(tx)) => Ok(Some(tx.clone())),
            Some(Script::NotFound) | None => Ok(None),
            Some(Script::Timeout) => Err(OracleError::Timeout),
            Some(Script::ApiError(status)) => Err(OracleError::Api {
                status: *status,
                body: String::new(),
            }),
        }
    }
}
