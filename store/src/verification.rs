//! Verification record storage trait.

use crate::StoreError;
use gratia_types::{EventId, Timestamp, TxSignature, VerificationId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a verification record.
///
/// `pending` -> `verified` is terminal; `pending` -> `failed` may be reset
/// back to `pending` by an explicit operator retry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Verified,
    Failed,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Verified => "verified",
            VerificationStatus::Failed => "failed",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Closed taxonomy of verification failure codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerifyErrorCode {
    /// The oracle has no transaction for this signature.
    TxNotFound,
    /// The chain reports the transaction executed with an error.
    TxFailed,
    /// The transaction exists but has no confirmed slot yet.
    Unconfirmed,
    /// The stored event's parties cannot be resolved.
    InvalidSignature,
    /// A monetary event carries a non-positive amount.
    AmountMismatch,
    /// The oracle was unreachable or returned garbage.
    RpcError,
}

impl VerifyErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyErrorCode::TxNotFound => "tx_not_found",
            VerifyErrorCode::TxFailed => "tx_failed",
            VerifyErrorCode::Unconfirmed => "unconfirmed",
            VerifyErrorCode::InvalidSignature => "invalid_signature",
            VerifyErrorCode::AmountMismatch => "amount_mismatch",
            VerifyErrorCode::RpcError => "rpc_error",
        }
    }
}

impl fmt::Display for VerifyErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The outcome of independently confirming an event against the chain.
///
/// One-to-one with an event, globally unique on signature. Mutated only by
/// the verification engine.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerificationRecord {
    pub id: VerificationId,
    pub event_id: EventId,
    pub status: VerificationStatus,
    pub signature: TxSignature,
    /// Populated once the oracle confirms the transaction.
    pub slot: Option<u64>,
    /// Raw oracle payload, retained for audit.
    pub oracle_response: Option<serde_json::Value>,
    pub error_code: Option<VerifyErrorCode>,
    pub error_message: Option<String>,
    pub verified_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl VerificationRecord {
    /// A fresh pending record for a newly ingested event.
    pub fn pending(event_id: EventId, signature: TxSignature) -> Self {
        let now = Timestamp::now();
        Self {
            id: VerificationId::generate(),
            event_id,
            status: VerificationStatus::Pending,
            signature,
            slot: None,
            oracle_response: None,
            error_code: None,
            error_message: None,
            verified_at: None,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Per-status record counts.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationStats {
    pub pending: u64,
    pub verified: u64,
    pub failed: u64,
}

/// Trait for verification record storage.
///
/// Signature is unique: `insert_verification` fails with `Duplicate` when a
/// record for the signature already exists, and the caller re-reads it.
pub trait VerificationStore: Send + Sync {
    fn insert_verification(&self, record: &VerificationRecord) -> Result<(), StoreError>;

    /// Overwrite an existing record (keyed by id). `NotFound` if absent.
    fn update_verification(&self, record: &VerificationRecord) -> Result<(), StoreError>;

    fn get_verification_by_signature(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<VerificationRecord>, StoreError>;

    fn get_verification_by_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<VerificationRecord>, StoreError>;

    /// Up to `limit` records in the given status, oldest first.
    fn verifications_by_status(
        &self,
        status: VerificationStatus,
        limit: usize,
    ) -> Result<Vec<VerificationRecord>, StoreError>;

    fn verification_stats(&self) -> Result<VerificationStats, StoreError>;
}
