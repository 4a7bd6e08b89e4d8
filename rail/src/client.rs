//! HTTP client for the stablecoin rail.

use async_trait::async_trait;
use serde::Deserialize;
use std::time::Duration;

use gratia_types::StableSymbol;

use crate::error::RailError;
use crate::types::{CreatePayoutRequest, RailMint, RailPayout, RailQuote};

/// Hard timeout for every rail request.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Default connection timeout.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(3);

/// The rail capabilities the settlement engine and tip service consume.
#[async_trait]
pub trait StablecoinRail: Send + Sync {
    async fn get_quote(&self, symbol: StableSymbol, amount: f64) -> Result<RailQuote, RailError>;

    async fn generate_mint(
        &self,
        recipient: &str,
        amount: f64,
        symbol: StableSymbol,
        quote_id: &str,
    ) -> Result<RailMint, RailError>;

    async fn create_payout(&self, request: &CreatePayoutRequest) -> Result<RailPayout, RailError>;

    async fn health(&self) -> Result<(), RailError>;
}

/// Rail connection settings, injected at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct RailConfig {
    /// Provider base URL, e.g. `https://api.reflect.finance`.
    pub base_url: String,
    pub api_key: String,
}

/// HTTP implementation of [`StablecoinRail`].
pub struct HttpRail {
    http_client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl HttpRail {
    pub fn new(config: &RailConfig) -> Result<Self, RailError> {
        if config.api_key.is_empty() {
            return Err(RailError::MissingCredentials);
        }
        let http_client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .connect_timeout(DEFAULT_CONNECT_TIMEOUT)
            .build()
            .map_err(|e| RailError::Unreachable(e.to_string()))?;
        Ok(Self {
            http_client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
        })
    }

    /// POST a JSON body and return the parsed JSON response.
    ///
    /// Non-2xx responses become [`RailError::Api`] with the provider's error
    /// code when it supplies one, otherwise a class derived from the status.
    async fn post_json(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> Result<serde_json::Value, RailError> {
        let url = format!("{}{path}", self.base_url);
        let response = self
            .http_client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RailError::Timeout
                } else if e.is_connect() {
                    RailError::Unreachable(format!("connection failed: {e}"))
                } else {
                    RailError::Unreachable(e.to_string())
                }
            })?;

        let status = response.status();
        let text = response.text().await.unwrap_or_default();
        let payload: Option<serde_json::Value> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let code = payload
                .as_ref()
                .and_then(|p| p.get("code"))
                .and_then(|c| c.as_str())
                .map(str::to_string)
                .unwrap_or_else(|| {
                    if status.as_u16() >= 500 {
                        "RailUnavailable".to_string()
                    } else {
                        "InvalidRequest".to_string()
                    }
                });
            return Err(RailError::Api {
                status: status.as_u16(),
                code,
                details: payload,
            });
        }

        Ok(payload.unwrap_or(serde_json::Value::Null))
    }
}

#[async_trait]
impl StablecoinRail for HttpRail {
    async fn get_quote(&self, symbol: StableSymbol, amount: f64) -> Result<RailQuote, RailError> {
        let body = serde_json::json!({
            "symbol": symbol,
            "amount": amount,
            "action": "mint",
        });
        let payload = self
            .post_json("/stablecoin/get-quote-for-mint-or-redeem", &body)
            .await?;
        let quote: RailQuote = serde_json::from_value(payload)
            .map_err(|e| RailError::InvalidResponse(format!("quote shape: {e}")))?;
        if quote.id.is_empty() || quote.expires_at.is_empty() {
            return Err(RailError::InvalidResponse(
                "quote response missing id or expiry".into(),
            ));
        }
        Ok(quote)
    }

    async fn generate_mint(
        &self,
        recipient: &str,
        amount: f64,
        symbol: StableSymbol,
        quote_id: &str,
    ) -> Result<RailMint, RailError> {
        let body = serde_json::json!({
            "recipient": recipient,
            "amount": amount,
            "symbol": symbol,
            "quoteId": quote_id,
        });
        let payload = self
            .post_json("/stablecoin/generate-mint-transaction", &body)
            .await?;
        let mint: RailMint = serde_json::from_value(payload)
            .map_err(|e| RailError::InvalidResponse(format!("mint shape: {e}")))?;
        if mint.signature.is_empty() || mint.rail_tx_id.is_empty() {
            return Err(RailError::InvalidResponse(
                "mint response missing signature or rail tx id".into(),
            ));
        }
        Ok(mint)
    }

    async fn create_payout(&self, request: &CreatePayoutRequest) -> Result<RailPayout, RailError> {
        let body = serde_json::to_value(request)
            .map_err(|e| RailError::InvalidResponse(e.to_string()))?;
        let payload = self.post_json("/stablecoin/create-payout", &body).await?;
        RailPayout::from_raw(payload)
    }

    async fn health(&self) -> Result<(), RailError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .http_client
            .get(&url)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    RailError::Timeout
                } else {
                    RailError::Unreachable(e.to_string())
                }
            })?;
        if !response.status().is_success() {
            return Err(RailError::Api {
                status: response.status().as_u16(),
                code: "Unhealthy".into(),
                details: None,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_api_key_is_rejected() {
        let config = RailConfig {
            base_url: "https://rail.example".into(),
            api_key: String::new(),
        };
        assert!(matches!(
            HttpRail::new(&config),
            Err(RailError::MissingCredentials)
        ));
    }

    #[test]
    fn timeout_is_transient_but_distinct() {
        assert!(RailError::Timeout.is_transient());
        assert!(RailError::Timeout.is_timeout());
        let api = RailError::Api { status: 502, code: "RailUnavailable".into(), details: None };
        assert!(api.is_transient());
        assert!(!api.is_timeout());
    }
}
