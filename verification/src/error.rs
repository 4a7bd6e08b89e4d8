use thiserror::Error;

#[derive(Debug, Error)]
pub enum VerificationError {
    /// No verification record exists for the signature. This is a
    /// programming or data error, not a chain condition, so it propagates
    /// instead of becoming a failed record.
    #[error("verification record not found for signature {0}")]
    RecordMissing(String),

    /// The record references an event that no longer exists.
    #[error("event {0} referenced by verification record is missing")]
    EventMissing(String),

    #[error("storage error: {0}")]
    Store(#[from] gratia_store::StoreError),
}
