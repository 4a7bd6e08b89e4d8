//! Direct tip transfer service: quote → mint → idempotent record.

use std::sync::Arc;

use serde::Serialize;

use gratia_rail::types::MintStatus;
use gratia_rail::StablecoinRail;
use gratia_store::{Store, TransferRecord, TransferStatus};
use gratia_types::{Amount, StableSymbol, StoryId, Timestamp, TransferId, TxSignature, WalletAddress};

use crate::error::SettlementError;

/// Result of a direct tip.
#[derive(Clone, Debug, Serialize)]
pub struct TransferOutcome {
    pub record: TransferRecord,
    /// `true` when the mint signature was already recorded.
    pub idempotent: bool,
}

/// Executes direct stablecoin tips through the rail.
pub struct TransferService {
    store: Arc<dyn Store>,
    rail: Arc<dyn StablecoinRail>,
}

impl TransferService {
    pub fn new(store: Arc<dyn Store>, rail: Arc<dyn StablecoinRail>) -> Self {
        Self { store, rail }
    }

    /// Quote and mint a stablecoin tip, recording the result.
    ///
    /// The insert is idempotent on the mint signature: if the rail replays a
    /// signature, the existing record is returned instead.
    pub async fn send_tip(
        &self,
        from_wallet: &WalletAddress,
        to_wallet: &WalletAddress,
        amount: Amount,
        symbol: StableSymbol,
        story_id: Option<StoryId>,
    ) -> Result<TransferOutcome, SettlementError> {
        let quote = self.rail.get_quote(symbol, amount.as_f64()).await?;
        let mint = self
            .rail
            .generate_mint(to_wallet.as_str(), amount.as_f64(), symbol, &quote.id)
            .await?;

        let status = match mint.status {
            MintStatus::Confirmed => TransferStatus::Success,
            MintStatus::Failed => TransferStatus::Failed,
            MintStatus::Submitted => TransferStatus::Pending,
        };

        let record = TransferRecord {
            id: TransferId::generate(),
            tx_signature: TxSignature::new(mint.signature.clone()),
            from_wallet: from_wallet.clone(),
            to_wallet: to_wallet.clone(),
            amount,
            symbol,
            rail_quote_id: quote.id,
            rail_tx_id: mint.rail_tx_id,
            story_id,
            status,
            created_at: Timestamp::now(),
        };

        match self.store.insert_transfer(&record) {
            Ok(()) => {
                tracing::info!(
                    tx_signature = %record.tx_signature,
                    rail_tx_id = %record.rail_tx_id,
                    status = record.status.as_str(),
                    "tip transfer recorded"
                );
                Ok(TransferOutcome {
                    record,
                    idempotent: false,
                })
            }
            Err(e) if e.is_duplicate() => {
                let existing = self
                    .store
                    .get_transfer_by_signature(&record.tx_signature)?
                    .ok_or_else(|| {
                        SettlementError::Store(gratia_store::StoreError::Corruption(format!(
                            "transfer row vanished after conflict for {}",
                            record.tx_signature
                        )))
                    })?;
                Ok(TransferOutcome {
                    record: existing,
                    idempotent: true,
                })
            }
            Err(e) => Err(e.into()),
        }
    }
}
