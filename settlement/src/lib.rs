//! Payout settlement engine.
//!
//! Converts events with a verified on-chain record into off-chain
//! stablecoin payouts through the external rail, and drives the payout
//! record's lifecycle: create, bounded retry (ceiling of 3 attempts), and
//! cancellation of pending payouts. Also hosts the direct tip transfer
//! service (quote → mint → idempotent record).

pub mod engine;
pub mod error;
pub mod transfer;

pub use engine::{PayoutEngine, PayoutOutcome, MAX_PAYOUT_ATTEMPTS};
pub use error::SettlementError;
pub use transfer::{TransferOutcome, TransferService};
