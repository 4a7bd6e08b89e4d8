use thiserror::Error;

#[derive(Debug, Error)]
pub enum IngestError {
    /// A required field is missing from the notification.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The signature fails the chain alphabet/length check.
    #[error("malformed transaction signature: {0}")]
    MalformedSignature(String),

    #[error("storage error: {0}")]
    Store(#[from] gratia_store::StoreError),

    #[error("verification error: {0}")]
    Verification(#[from] gratia_verification::VerificationError),

    /// The insert conflicted but the winning row cannot be read back.
    #[error("event row vanished after insert conflict for {0}")]
    LostRow(String),
}
