//! Payout record storage trait.

use crate::StoreError;
use gratia_types::{Amount, EventId, PayoutId, StableSymbol, Timestamp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PayoutStatus {
    /// Created locally, not yet accepted by the rail.
    Pending,
    /// Accepted by the rail, settlement in flight.
    Queued,
    /// Funds delivered.
    Settled,
    /// Last attempt failed; retryable below the attempt ceiling.
    Failed,
    /// Cancelled by an operator; permanently final.
    Cancelled,
}

impl PayoutStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PayoutStatus::Pending => "pending",
            PayoutStatus::Queued => "queued",
            PayoutStatus::Settled => "settled",
            PayoutStatus::Failed => "failed",
            PayoutStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, PayoutStatus::Settled | PayoutStatus::Cancelled)
    }
}

impl fmt::Display for PayoutStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The state of settling a verified tip into an off-chain stablecoin
/// transfer. One-to-one with an event; mutated only by the settlement engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PayoutRecord {
    pub id: PayoutId,
    pub event_id: EventId,
    /// Identifier assigned by the rail once it acknowledges the payout.
    pub rail_tip_id: Option<String>,
    pub status: PayoutStatus,
    pub currency: StableSymbol,
    pub amount: Amount,
    pub attempt_count: u32,
    pub last_error: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Trait for payout record storage.
///
/// Event id is unique across payouts: `insert_payout` fails with `Duplicate`
/// when the event already has one, which closes the check-then-insert race
/// at the storage layer. Cancelled payouts keep their index entry so a
/// cancelled event can never acquire a second payout.
pub trait PayoutStore: Send + Sync {
    fn insert_payout(&self, record: &PayoutRecord) -> Result<(), StoreError>;

    /// Overwrite an existing record (keyed by id). `NotFound` if absent.
    fn update_payout(&self, record: &PayoutRecord) -> Result<(), StoreError>;

    fn get_payout(&self, id: &PayoutId) -> Result<Option<PayoutRecord>, StoreError>;

    fn get_payout_by_event(&self, event_id: &EventId)
        -> Result<Option<PayoutRecord>, StoreError>;
}
