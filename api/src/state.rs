//! Shared application state.

use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;

use gratia_ingestion::IngestionGateway;
use gratia_metrics::MetricsRefresher;
use gratia_oracle::ChainOracle;
use gratia_rail::StablecoinRail;
use gratia_settlement::{PayoutEngine, TransferService};
use gratia_store::Store;
use gratia_verification::VerificationEngine;

use crate::metrics::ApiCounters;

/// API-level settings, injected at startup.
#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    /// Shared secret for internal endpoints (`x-webhook-secret`).
    pub webhook_secret: String,
    /// HMAC key for the chain provider's signed webhook.
    pub chain_webhook_secret: String,
}

/// Everything the handlers need, wired once at startup.
pub struct AppState {
    pub gateway: IngestionGateway,
    pub payouts: PayoutEngine,
    pub transfers: TransferService,
    pub refresher: MetricsRefresher,
    pub counters: ApiCounters,
    pub config: ApiConfig,
    started_at: Instant,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        oracle: Arc<dyn ChainOracle>,
        rail: Arc<dyn StablecoinRail>,
        config: ApiConfig,
    ) -> Result<Self, prometheus::Error> {
        let verifier = Arc::new(VerificationEngine::new(store.clone(), oracle));
        let gateway = IngestionGateway::new(store.clone(), verifier);
        let payouts = PayoutEngine::new(store.clone(), rail.clone());
        let transfers = TransferService::new(store.clone(), rail);
        let refresher = MetricsRefresher::new(store);

        Ok(Self {
            gateway,
            payouts,
            transfers,
            refresher,
            counters: ApiCounters::new()?,
            config,
            started_at: Instant::now(),
        })
    }

    pub fn uptime_secs(&self) -> u64 {
        self.started_at.elapsed().as_secs()
    }
}
