use thiserror::Error;

#[derive(Debug, Error)]
pub enum SettlementError {
    #[error("event not found: {0}")]
    EventNotFound(String),

    #[error("payout not found: {0}")]
    PayoutNotFound(String),

    /// The event's verification record is absent or not `verified`.
    #[error("event {0} is not verified")]
    NotVerified(String),

    /// The operation is illegal in the payout's current state.
    #[error("payout is {state}: {reason}")]
    StateConflict { state: &'static str, reason: &'static str },

    /// The attempt ceiling has been reached; manual intervention required.
    #[error("maximum retry limit ({0}) reached")]
    RetryLimitExceeded(u32),

    /// No pending payout exists to cancel.
    #[error("no cancellable payout for event {0}")]
    NotCancellable(String),

    #[error("rail error: {0}")]
    Rail(#[from] gratia_rail::RailError),

    #[error("storage error: {0}")]
    Store(#[from] gratia_store::StoreError),
}
