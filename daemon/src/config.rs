//! Daemon configuration.
//!
//! Settings come from a TOML file when `--config` is given; CLI flags and
//! environment variables override file values. Components receive explicit
//! config structs — nothing reads the environment directly.

use serde::Deserialize;
use std::path::PathBuf;

use gratia_oracle::OracleConfig;
use gratia_rail::RailConfig;

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct GratiaConfig {
    /// Directory for LMDB storage.
    pub data_dir: PathBuf,
    /// Address the API server binds to.
    pub listen_addr: String,
    /// Shared secret for internal endpoints.
    pub webhook_secret: String,
    /// HMAC key for the chain provider's signed webhook.
    pub chain_webhook_secret: String,
    pub oracle: OracleConfig,
    pub rail: RailConfig,
}

impl Default for GratiaConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./gratia_data"),
            listen_addr: "127.0.0.1:7200".to_string(),
            webhook_secret: String::new(),
            chain_webhook_secret: String::new(),
            oracle: OracleConfig {
                base_url: "https://api.devnet.helius.dev".to_string(),
                api_key: String::new(),
                timeout_secs: 10,
            },
            rail: RailConfig {
                base_url: "https://api.reflect.finance".to_string(),
                api_key: String::new(),
            },
        }
    }
}
