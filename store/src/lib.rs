//! Abstract storage traits for the gratia event pipeline.
//!
//! Every storage backend (LMDB, in-memory for testing) implements these
//! traits. The rest of the workspace depends only on the traits.
//!
//! The two load-bearing uniqueness constraints live here as contracts:
//! events are unique on (signature, type) and verification records are
//! unique on signature. Backends must make the existence check and the
//! write atomic; callers that receive [`StoreError::Duplicate`] re-read
//! the surviving row instead of assuming their own write landed.

pub mod creator;
pub mod error;
pub mod event;
pub mod metrics;
pub mod payout;
pub mod transfer;
pub mod verification;

pub use creator::{Creator, CreatorStore, Story};
pub use error::StoreError;
pub use event::{Event, EventStore};
pub use metrics::{HostMetrics, MetricsStore};
pub use payout::{PayoutRecord, PayoutStatus, PayoutStore};
pub use transfer::{TransferRecord, TransferStatus, TransferStore};
pub use verification::{
    VerificationRecord, VerificationStats, VerificationStatus, VerificationStore, VerifyErrorCode,
};

/// The full storage surface an engine wires against.
///
/// Backends implement each concern trait separately; this umbrella exists so
/// application state can hold a single `Arc<dyn Store>`.
pub trait Store:
    EventStore + VerificationStore + PayoutStore + TransferStore + CreatorStore + MetricsStore
{
}

impl<T> Store for T where
    T: EventStore + VerificationStore + PayoutStore + TransferStore + CreatorStore + MetricsStore
{
}
