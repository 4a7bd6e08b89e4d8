//! HTTP client for the chain verification oracle.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use gratia_types::TxSignature;

use crate::error::OracleError;
use crate::types::ChainTx;

/// Default timeout for oracle requests.
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// The single capability the verification engine needs from the chain.
#[async_trait]
pub trait ChainOracle: Send + Sync {
    /// Fetch a transaction by signature. `Ok(None)` means the chain has no
    /// transaction for the signature (not an error).
    async fn fetch_chain_tx(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<ChainTx>, OracleError>;
}

/// Oracle connection settings, injected at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct OracleConfig {
    /// Provider base URL, e.g. `https://api.devnet.helius.dev`.
    pub base_url: String,
    pub api_key: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Raw JSON shape of the provider's transaction response.
///
/// The API contract: `GET /v0/transactions/{signature}` returns the
/// transaction with `meta` (execution result) and `transaction.message`
/// (account keys) sections; 404 means unknown signature.
#[derive(Debug, Deserialize)]
struct TxResponse {
    signature: Option<String>,
    #[serde(default)]
    slot: u64,
    #[serde(rename = "blockTime")]
    block_time: Option<i64>,
    meta: Option<TxMeta>,
    transaction: Option<TxBody>,
}

#[derive(Debug, Deserialize)]
struct TxMeta {
    err: Option<serde_json::Value>,
    #[serde(default)]
    fee: u64,
    #[serde(rename = "preBalances", default)]
    pre_balances: Vec<u64>,
    #[serde(rename = "postBalances", default)]
    post_balances: Vec<u64>,
}

#[derive(Debug, Deserialize)]
struct TxBody {
    message: Option<TxMessage>,
}

#[derive(Debug, Deserialize)]
struct TxMessage {
    #[serde(rename = "accountKeys", default)]
    account_keys: Vec<String>,
}

/// HTTP implementation of [`ChainOracle`].
pub struct HttpOracle {
    /// HTTP client (reusable connection pool).
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpOracle {
    pub fn new(config: &OracleConfig) -> Result<Self, OracleError> {
        if config.api_key.is_empty() {
            return Err(OracleError::MissingCredentials);
        }
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| OracleError::Unreachable(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }
}

#[async_trait]
impl ChainOracle for HttpOracle {
    async fn fetch_chain_tx(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<ChainTx>, OracleError> {
        let url = format!(
            "{}/v0/transactions/{}?api-key={}",
            self.base_url, signature, self.api_key
        );

        let response = self.http_client.get(&url).send().await.map_err(|e| {
            if e.is_timeout() {
                OracleError::Timeout
            } else if e.is_connect() {
                OracleError::Unreachable(format!("connection failed: {e}"))
            } else {
                OracleError::Unreachable(e.to_string())
            }
        })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let raw: serde_json::Value = response
            .json()
            .await
            .map_err(|e| OracleError::InvalidResponse(format!("body is not JSON: {e}")))?;

        let parsed: TxResponse = serde_json::from_value(raw.clone())
            .map_err(|e| OracleError::InvalidResponse(format!("unexpected shape: {e}")))?;

        let meta = parsed
            .meta
            .ok_or_else(|| OracleError::InvalidResponse("missing meta section".into()))?;
        let account_keys = parsed
            .transaction
            .and_then(|t| t.message)
            .map(|m| m.account_keys)
            .unwrap_or_default();

        Ok(Some(ChainTx {
            signature: parsed.signature.unwrap_or_else(|| signature.to_string()),
            slot: parsed.slot,
            block_time: parsed.block_time,
            err: meta.err,
            fee: meta.fee,
            pre_balances: meta.pre_balances,
            post_balances: meta.post_balances,
            account_keys,
            raw,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let config = OracleConfig {
            base_url: "https://oracle.example".into(),
            api_key: String::new(),
            timeout_secs: 5,
        };
        assert!(matches!(
            HttpOracle::new(&config),
            Err(OracleError::MissingCredentials)
        ));
    }

    #[test]
    fn transient_classification() {
        assert!(OracleError::Timeout.is_transient());
        assert!(OracleError::Api { status: 503, body: String::new() }.is_transient());
        assert!(!OracleError::Api { status: 400, body: String::new() }.is_transient());
        assert!(!OracleError::InvalidResponse("x".into()).is_transient());
    }

    #[test]
    fn response_shape_parses_provider_payload() {
        let raw = serde_json::json!({
            "signature": "sigX",
            "slot": 31337,
            "blockTime": 1700000000,
            "meta": {
                "err": null,
                "fee": 5000,
                "preBalances": [10, 0],
                "postBalances": [4, 6]
            },
            "transaction": { "message": { "accountKeys": ["a", "b"] } }
        });
        let parsed: TxResponse = serde_json::from_value(raw).unwrap();
        assert_eq!(parsed.slot, 31337);
        let meta = parsed.meta.unwrap();
        assert!(meta.err.is_none());
        assert_eq!(meta.post_balances, vec![4, 6]);
    }
}
