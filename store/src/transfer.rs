//! Direct tip transfer storage trait.

use crate::StoreError;
use gratia_types::{Amount, StableSymbol, StoryId, Timestamp, TransferId, TxSignature, WalletAddress};
use serde::{Deserialize, Serialize};

/// Outcome of a rail mint as recorded locally.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransferStatus {
    Pending,
    Success,
    Failed,
}

impl TransferStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Success => "success",
            TransferStatus::Failed => "failed",
        }
    }
}

/// A direct stablecoin tip executed through the rail's quote→mint flow.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TransferRecord {
    pub id: TransferId,
    /// Signature of the mint transaction, unique per transfer.
    pub tx_signature: TxSignature,
    pub from_wallet: WalletAddress,
    pub to_wallet: WalletAddress,
    pub amount: Amount,
    pub symbol: StableSymbol,
    pub rail_quote_id: String,
    pub rail_tx_id: String,
    pub story_id: Option<StoryId>,
    pub status: TransferStatus,
    pub created_at: Timestamp,
}

/// Trait for transfer record storage; unique on mint signature.
pub trait TransferStore: Send + Sync {
    /// Insert a transfer. `Duplicate` if the mint signature is already
    /// recorded; the caller re-reads the existing row.
    fn insert_transfer(&self, record: &TransferRecord) -> Result<(), StoreError>;

    fn get_transfer_by_signature(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TransferRecord>, StoreError>;
}
