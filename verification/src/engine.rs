//! The verification engine — connects the event store, the verification
//! record state machine, and the chain oracle.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::Serialize;

use gratia_oracle::{ChainOracle, ChainTx};
use gratia_store::verification::{VerificationRecord, VerificationStats, VerificationStatus};
use gratia_store::{Event, Store, VerifyErrorCode};
use gratia_types::{Timestamp, TxSignature};

use crate::error::VerificationError;

/// Pause between oracle calls in batch mode, to stay under provider rate
/// limits. Not a correctness mechanism.
const DEFAULT_BATCH_DELAY: Duration = Duration::from_millis(100);

/// Result of verifying one signature.
#[derive(Clone, Debug, Serialize)]
pub struct VerifyOutcome {
    pub verification_id: String,
    pub signature: String,
    pub status: VerificationStatus,
    pub slot: Option<u64>,
    pub error_code: Option<VerifyErrorCode>,
    pub elapsed_ms: u64,
}

impl VerifyOutcome {
    fn from_record(record: &VerificationRecord, started: Instant) -> Self {
        Self {
            verification_id: record.id.to_string(),
            signature: record.signature.to_string(),
            status: record.status,
            slot: record.slot,
            error_code: record.error_code,
            elapsed_ms: started.elapsed().as_millis() as u64,
        }
    }
}

/// Drives verification records from `pending` to `verified`/`failed`.
pub struct VerificationEngine {
    store: Arc<dyn Store>,
    oracle: Arc<dyn ChainOracle>,
    batch_delay: Duration,
}

impl VerificationEngine {
    pub fn new(store: Arc<dyn Store>, oracle: Arc<dyn ChainOracle>) -> Self {
        Self {
            store,
            oracle,
            batch_delay: DEFAULT_BATCH_DELAY,
        }
    }

    pub fn with_batch_delay(mut self, delay: Duration) -> Self {
        self.batch_delay = delay;
        self
    }

    /// Ensure a verification record exists for the event and verify it.
    ///
    /// Used by the ingestion gateway. Concurrent callers race on the
    /// signature-unique insert; the loser adopts the winner's record. The
    /// returned record reflects the post-verification state.
    pub async fn create_and_verify(
        &self,
        event: &Event,
    ) -> Result<VerificationRecord, VerificationError> {
        let record = VerificationRecord::pending(event.id.clone(), event.signature.clone());
        match self.store.insert_verification(&record) {
            Ok(()) => {}
            Err(e) if e.is_duplicate() => {}
            Err(e) => return Err(e.into()),
        }

        self.verify_tx(&event.signature).await?;

        self.store
            .get_verification_by_signature(&event.signature)?
            .ok_or_else(|| VerificationError::RecordMissing(event.signature.to_string()))
    }

    /// Verify a single signature against the oracle.
    ///
    /// Idempotent on verified records: returns immediately without another
    /// oracle call. Oracle failures of any kind become a `failed` record;
    /// only a missing record or a missing event propagates as an error.
    pub async fn verify_tx(
        &self,
        signature: &TxSignature,
    ) -> Result<VerifyOutcome, VerificationError> {
        let started = Instant::now();

        let record = self
            .store
            .get_verification_by_signature(signature)?
            .ok_or_else(|| VerificationError::RecordMissing(signature.to_string()))?;

        if record.status == VerificationStatus::Verified {
            return Ok(VerifyOutcome::from_record(&record, started));
        }

        let record = match self.oracle.fetch_chain_tx(signature).await {
            Err(e) => {
                tracing::warn!(signature = %signature, error = %e, "oracle call failed");
                self.fail(record, VerifyErrorCode::RpcError, e.to_string(), None, None)?
            }
            Ok(None) => self.fail(
                record,
                VerifyErrorCode::TxNotFound,
                "transaction not found".to_string(),
                None,
                None,
            )?,
            Ok(Some(tx)) => self.conclude(record, tx)?,
        };

        Ok(VerifyOutcome::from_record(&record, started))
    }

    /// Apply the local validation checks to a fetched transaction and land
    /// the record in its final state.
    fn conclude(
        &self,
        record: VerificationRecord,
        tx: ChainTx,
    ) -> Result<VerificationRecord, VerificationError> {
        if let Some(err) = &tx.err {
            let message = format!("transaction failed on-chain: {err}");
            return self.fail(
                record,
                VerifyErrorCode::TxFailed,
                message,
                Some(tx.slot),
                Some(tx.raw),
            );
        }
        if tx.slot == 0 {
            return self.fail(
                record,
                VerifyErrorCode::Unconfirmed,
                "transaction not confirmed (slot = 0)".to_string(),
                None,
                Some(tx.raw),
            );
        }

        let event = self
            .store
            .get_event(&record.event_id)?
            .ok_or_else(|| VerificationError::EventMissing(record.event_id.to_string()))?;

        if event.signer.is_empty() || event.receiver.is_empty() {
            return self.fail(
                record,
                VerifyErrorCode::InvalidSignature,
                "event parties cannot be resolved".to_string(),
                Some(tx.slot),
                Some(tx.raw),
            );
        }
        if event.event_type.is_monetary() && !event.amount.is_positive() {
            return self.fail(
                record,
                VerifyErrorCode::AmountMismatch,
                format!("monetary event with non-positive amount {}", event.amount),
                Some(tx.slot),
                Some(tx.raw),
            );
        }

        let mut record = record;
        record.status = VerificationStatus::Verified;
        record.slot = Some(tx.slot);
        record.oracle_response = Some(tx.raw);
        record.error_code = None;
        record.error_message = None;
        record.verified_at = Some(Timestamp::now());
        record.updated_at = Timestamp::now();
        self.store.update_verification(&record)?;

        tracing::info!(
            signature = %record.signature,
            slot = tx.slot,
            "transaction verified"
        );
        Ok(record)
    }

    fn fail(
        &self,
        mut record: VerificationRecord,
        code: VerifyErrorCode,
        message: String,
        slot: Option<u64>,
        raw: Option<serde_json::Value>,
    ) -> Result<VerificationRecord, VerificationError> {
        record.status = VerificationStatus::Failed;
        record.error_code = Some(code);
        record.error_message = Some(message);
        record.slot = slot;
        if raw.is_some() {
            record.oracle_response = raw;
        }
        record.updated_at = Timestamp::now();
        self.store.update_verification(&record)?;

        tracing::info!(
            signature = %record.signature,
            code = %code,
            "verification failed"
        );
        Ok(record)
    }

    /// Verify up to `limit` pending records, one at a time.
    ///
    /// A single record's failure does not abort the batch; only storage
    /// errors while listing the batch propagate.
    pub async fn process_pending(
        &self,
        limit: usize,
    ) -> Result<Vec<VerifyOutcome>, VerificationError> {
        let pending = self
            .store
            .verifications_by_status(VerificationStatus::Pending, limit)?;
        if pending.is_empty() {
            tracing::debug!("no pending verifications to process");
            return Ok(Vec::new());
        }

        tracing::info!(count = pending.len(), "processing pending verifications");

        let mut outcomes = Vec::with_capacity(pending.len());
        for (i, record) in pending.iter().enumerate() {
            match self.verify_tx(&record.signature).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::warn!(signature = %record.signature, error = %e, "batch item failed");
                }
            }
            if i + 1 < pending.len() {
                tokio::time::sleep(self.batch_delay).await;
            }
        }

        let verified = outcomes
            .iter()
            .filter(|o| o.status == VerificationStatus::Verified)
            .count();
        tracing::info!(
            verified,
            failed = outcomes.len() - verified,
            "verification batch completed"
        );
        Ok(outcomes)
    }

    /// Reset up to `limit` failed records to pending and re-verify them.
    ///
    /// Retries are not counted or capped here; the operator decides when to
    /// stop re-running this.
    pub async fn retry_failed(
        &self,
        limit: usize,
    ) -> Result<Vec<VerifyOutcome>, VerificationError> {
        let failed = self
            .store
            .verifications_by_status(VerificationStatus::Failed, limit)?;
        if failed.is_empty() {
            tracing::debug!("no failed verifications to retry");
            return Ok(Vec::new());
        }

        tracing::info!(count = failed.len(), "retrying failed verifications");

        let mut outcomes = Vec::with_capacity(failed.len());
        for record in failed {
            let mut reset = record.clone();
            reset.status = VerificationStatus::Pending;
            reset.error_code = None;
            reset.error_message = None;
            reset.updated_at = Timestamp::now();
            self.store.update_verification(&reset)?;

            match self.verify_tx(&record.signature).await {
                Ok(outcome) => outcomes.push(outcome),
                Err(e) => {
                    tracing::warn!(signature = %record.signature, error = %e, "retry item failed");
                }
            }
        }
        Ok(outcomes)
    }

    /// Per-status record counts.
    pub fn stats(&self) -> Result<VerificationStats, VerificationError> {
        Ok(self.store.verification_stats()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gratia_nullables::{NullOracle, NullStore};
    use gratia_store::{EventStore, VerificationStore};
    use gratia_types::{Amount, EventId, EventType, WalletAddress};

    fn test_event(signature: &str, event_type: EventType, amount: &str) -> Event {
        Event {
            id: EventId::generate(),
            event_type,
            signer: WalletAddress::new("S1111111111111111111111111111111"),
            receiver: WalletAddress::new("R1111111111111111111111111111111"),
            amount: Amount::from_decimal_str(amount).unwrap(),
            signature: TxSignature::new(signature),
            story_id: None,
            timestamp: Timestamp::from_millis(1_700_000_000_000),
        }
    }

    fn seed(store: &NullStore, event: &Event) -> VerificationRecord {
        store.insert_event(event).unwrap();
        let record = VerificationRecord::pending(event.id.clone(), event.signature.clone());
        store.insert_verification(&record).unwrap();
        record
    }

    fn engine(store: Arc<NullStore>, oracle: Arc<NullOracle>) -> VerificationEngine {
        VerificationEngine::new(store, oracle).with_batch_delay(Duration::from_millis(0))
    }

    #[tokio::test]
    async fn oracle_not_found_fails_with_tx_not_found() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new().with_not_found("sigNF"));
        let event = test_event("sigNF", EventType::Tip, "1.5");
        seed(&store, &event);

        let outcome = engine(store.clone(), oracle)
            .verify_tx(&event.signature)
            .await
            .unwrap();

        assert_eq!(outcome.status, VerificationStatus::Failed);
        assert_eq!(outcome.error_code, Some(VerifyErrorCode::TxNotFound));
        assert_eq!(outcome.slot, None);
    }

    #[tokio::test]
    async fn verified_is_terminal_and_skips_the_oracle() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new().with_tx("sigV", NullOracle::confirmed_tx("sigV", 4242)),
        );
        let event = test_event("sigV", EventType::Tip, "1.5");
        seed(&store, &event);

        let engine = engine(store.clone(), oracle.clone());
        let first = engine.verify_tx(&event.signature).await.unwrap();
        assert_eq!(first.status, VerificationStatus::Verified);
        assert_eq!(first.slot, Some(4242));
        assert_eq!(oracle.call_count("sigV"), 1);

        let second = engine.verify_tx(&event.signature).await.unwrap();
        assert_eq!(second.status, VerificationStatus::Verified);
        assert_eq!(second.slot, Some(4242));
        // No redundant oracle call for an already-verified record.
        assert_eq!(oracle.call_count("sigV"), 1);

        let stored = store
            .get_verification_by_signature(&event.signature)
            .unwrap()
            .unwrap();
        assert!(stored.verified_at.is_some());
        assert!(stored.oracle_response.is_some());
    }

    #[tokio::test]
    async fn oracle_timeout_is_recorded_not_propagated() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new().with_timeout("sigT"));
        let event = test_event("sigT", EventType::Tip, "1.5");
        seed(&store, &event);

        let outcome = engine(store.clone(), oracle)
            .verify_tx(&event.signature)
            .await
            .unwrap();

        assert_eq!(outcome.status, VerificationStatus::Failed);
        assert_eq!(outcome.error_code, Some(VerifyErrorCode::RpcError));
        let stored = store
            .get_verification_by_signature(&event.signature)
            .unwrap()
            .unwrap();
        assert!(stored.error_message.is_some());
    }

    #[tokio::test]
    async fn oracle_server_error_is_recorded_as_rpc_error() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new().with_api_error("sigU", 503));
        let event = test_event("sigU", EventType::Tip, "1");
        seed(&store, &event);

        let outcome = engine(store, oracle).verify_tx(&event.signature).await.unwrap();
        assert_eq!(outcome.status, VerificationStatus::Failed);
        assert_eq!(outcome.error_code, Some(VerifyErrorCode::RpcError));
    }

    #[tokio::test]
    async fn chain_execution_error_fails_with_tx_failed() {
        let store = Arc::new(NullStore::new());
        let mut tx = NullOracle::confirmed_tx("sigE", 100);
        tx.err = Some(serde_json::json!({"InstructionError": [0, "Custom"]}));
        let oracle = Arc::new(NullOracle::new().with_tx("sigE", tx));
        let event = test_event("sigE", EventType::Tip, "1.5");
        seed(&store, &event);

        let outcome = engine(store, oracle).verify_tx(&event.signature).await.unwrap();
        assert_eq!(outcome.error_code, Some(VerifyErrorCode::TxFailed));
        assert_eq!(outcome.slot, Some(100));
    }

    #[tokio::test]
    async fn zero_amount_tip_fails_amount_mismatch() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new().with_tx("sigZ", NullOracle::confirmed_tx("sigZ", 7)),
        );
        let event = test_event("sigZ", EventType::Tip, "0");
        seed(&store, &event);

        let outcome = engine(store, oracle).verify_tx(&event.signature).await.unwrap();
        assert_eq!(outcome.status, VerificationStatus::Failed);
        assert_eq!(outcome.error_code, Some(VerifyErrorCode::AmountMismatch));
    }

    #[tokio::test]
    async fn zero_amount_share_verifies() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new().with_tx("sigS", NullOracle::confirmed_tx("sigS", 8)),
        );
        let event = test_event("sigS", EventType::Share, "0");
        seed(&store, &event);

        let outcome = engine(store, oracle).verify_tx(&event.signature).await.unwrap();
        assert_eq!(outcome.status, VerificationStatus::Verified);
    }

    #[tokio::test]
    async fn missing_record_propagates() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new());
        let err = engine(store, oracle)
            .verify_tx(&TxSignature::new("sigMissing"))
            .await
            .unwrap_err();
        assert!(matches!(err, VerificationError::RecordMissing(_)));
    }

    #[tokio::test]
    async fn batch_survives_individual_failures() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new()
                .with_tx("sigOk", NullOracle::confirmed_tx("sigOk", 11))
                .with_not_found("sigBad"),
        );
        let ok = test_event("sigOk", EventType::Tip, "1");
        let bad = test_event("sigBad", EventType::Tip, "1");
        seed(&store, &ok);
        seed(&store, &bad);

        let outcomes = engine(store, oracle).process_pending(10).await.unwrap();
        assert_eq!(outcomes.len(), 2);
        assert!(outcomes
            .iter()
            .any(|o| o.status == VerificationStatus::Verified));
        assert!(outcomes
            .iter()
            .any(|o| o.error_code == Some(VerifyErrorCode::TxNotFound)));
    }

    #[tokio::test]
    async fn retry_failed_resets_and_reverifies() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new().with_not_found("sigR"));
        let event = test_event("sigR", EventType::Tip, "2");
        seed(&store, &event);

        let engine = engine(store.clone(), oracle.clone());
        engine.verify_tx(&event.signature).await.unwrap();
        assert_eq!(engine.stats().unwrap().failed, 1);

        // The transaction lands on-chain later; retry should pick it up.
        oracle.script_tx("sigR", NullOracle::confirmed_tx("sigR", 99));
        let outcomes = engine.retry_failed(10).await.unwrap();
        assert_eq!(outcomes.len(), 1);
        assert_eq!(outcomes[0].status, VerificationStatus::Verified);
        assert_eq!(engine.stats().unwrap().verified, 1);
    }
}
