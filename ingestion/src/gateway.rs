//! The ingestion gateway.

use std::sync::Arc;

use serde::Serialize;

use gratia_store::verification::VerificationStatus;
use gratia_store::{Event, Store};
use gratia_types::{
    Amount, EventId, EventType, StoryId, Timestamp, TxSignature, VerificationId, WalletAddress,
};
use gratia_verification::VerificationEngine;

use crate::error::IngestError;

/// A validated inbound event notification.
#[derive(Clone, Debug)]
pub struct IngestRequest {
    pub signature: TxSignature,
    pub event_type: EventType,
    pub signer: WalletAddress,
    pub receiver: WalletAddress,
    pub amount: Amount,
    pub story_id: Option<StoryId>,
    /// Claimed occurrence time; defaults to arrival time when absent.
    pub timestamp: Option<Timestamp>,
}

/// What an `ingest` call accomplished.
#[derive(Clone, Debug, Serialize)]
pub struct IngestOutcome {
    pub event_id: EventId,
    pub verification_id: VerificationId,
    pub verification_status: VerificationStatus,
    /// `true` when this call observed a pre-existing row instead of
    /// performing the insert. Both cases are success for the caller.
    pub idempotent: bool,
}

/// The webhook-facing intake component.
pub struct IngestionGateway {
    store: Arc<dyn Store>,
    verifier: Arc<VerificationEngine>,
}

impl IngestionGateway {
    pub fn new(store: Arc<dyn Store>, verifier: Arc<VerificationEngine>) -> Self {
        Self { store, verifier }
    }

    /// Idempotently persist an event and its verification record.
    ///
    /// The insert races on the (signature, type) constraint; the loser
    /// re-reads the winner's row. Verification runs inline: the response
    /// carries the record's post-verification status, and an oracle outage
    /// surfaces as a `failed` record rather than a lost attempt.
    pub async fn ingest(&self, request: IngestRequest) -> Result<IngestOutcome, IngestError> {
        if request.signature.is_empty() {
            return Err(IngestError::MissingField("signature"));
        }
        if !request.signature.is_well_formed() {
            return Err(IngestError::MalformedSignature(
                request.signature.to_string(),
            ));
        }

        let event = Event {
            id: EventId::generate(),
            event_type: request.event_type,
            signer: request.signer,
            receiver: request.receiver,
            amount: request.amount,
            signature: request.signature.clone(),
            story_id: request.story_id,
            timestamp: request.timestamp.unwrap_or_else(Timestamp::now),
        };

        let (event, idempotent) = match self.store.insert_event(&event) {
            Ok(()) => (event, false),
            Err(e) if e.is_duplicate() => {
                // Lost the insert race (or a genuine redelivery): the
                // winner's row is authoritative.
                let existing = self
                    .store
                    .get_event_by_signature(&request.signature, request.event_type)?
                    .ok_or_else(|| IngestError::LostRow(request.signature.to_string()))?;
                (existing, true)
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(
            event_id = %event.id,
            signature = %event.signature,
            event_type = %event.event_type,
            idempotent,
            "event ingested"
        );

        let verification = match self.store.get_verification_by_event(&event.id)? {
            Some(record) => record,
            None => self.verifier.create_and_verify(&event).await?,
        };

        Ok(IngestOutcome {
            event_id: event.id,
            verification_id: verification.id,
            verification_status: verification.status,
            idempotent,
        })
    }

    /// Whether a verification record already exists for the signature.
    ///
    /// The chain-provider webhook variant uses this to reject full
    /// redeliveries before touching the event table.
    pub fn is_duplicate_delivery(&self, signature: &TxSignature) -> Result<bool, IngestError> {
        Ok(self
            .store
            .get_verification_by_signature(signature)?
            .is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gratia_nullables::{NullOracle, NullStore};
    use gratia_store::{EventStore, VerificationStore};

    fn request(signature: &str, event_type: EventType, amount: &str) -> IngestRequest {
        IngestRequest {
            signature: TxSignature::new(signature),
            event_type,
            signer: WalletAddress::new("S1111111111111111111111111111111"),
            receiver: WalletAddress::new("R1111111111111111111111111111111"),
            amount: Amount::from_decimal_str(amount).unwrap(),
            story_id: None,
            timestamp: Some(Timestamp::from_millis(1_700_000_000_000)),
        }
    }

    fn gateway(store: Arc<NullStore>, oracle: Arc<NullOracle>) -> IngestionGateway {
        let verifier = Arc::new(VerificationEngine::new(store.clone(), oracle));
        IngestionGateway::new(store, verifier)
    }

    #[tokio::test]
    async fn duplicate_delivery_yields_same_event_exactly_once() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new().with_tx("sigA", NullOracle::confirmed_tx("sigA", 10)),
        );
        let gateway = gateway(store.clone(), oracle);

        let first = gateway
            .ingest(request("sigA", EventType::Tip, "1.5"))
            .await
            .unwrap();
        assert!(!first.idempotent);
        assert_eq!(first.verification_status, VerificationStatus::Verified);

        let second = gateway
            .ingest(request("sigA", EventType::Tip, "1.5"))
            .await
            .unwrap();
        assert!(second.idempotent);
        assert_eq!(second.event_id, first.event_id);
        assert_eq!(second.verification_id, first.verification_id);

        assert_eq!(store.event_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn concurrent_duplicates_insert_one_row() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new().with_tx("sigC", NullOracle::confirmed_tx("sigC", 20)),
        );
        let gateway = Arc::new(gateway(store.clone(), oracle));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let gateway = gateway.clone();
            handles.push(tokio::spawn(async move {
                gateway.ingest(request("sigC", EventType::Tip, "1.5")).await
            }));
        }

        let mut event_ids = Vec::new();
        let mut fresh_inserts = 0;
        for handle in handles {
            let outcome = handle.await.unwrap().unwrap();
            if !outcome.idempotent {
                fresh_inserts += 1;
            }
            event_ids.push(outcome.event_id);
        }

        assert_eq!(fresh_inserts, 1);
        event_ids.dedup();
        assert_eq!(event_ids.len(), 1);
        assert_eq!(store.event_count().unwrap(), 1);
    }

    #[tokio::test]
    async fn same_signature_different_type_are_independent() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new().with_tx("sigD", NullOracle::confirmed_tx("sigD", 30)),
        );
        let gateway = gateway(store.clone(), oracle);

        let tip = gateway
            .ingest(request("sigD", EventType::Tip, "1"))
            .await
            .unwrap();
        let share = gateway
            .ingest(request("sigD", EventType::Share, "0"))
            .await
            .unwrap();
        assert!(!tip.idempotent);
        // Verification is keyed by signature alone; the share adopts the
        // tip's record but its event row is distinct.
        assert_ne!(tip.event_id, share.event_id);
        assert_eq!(store.event_count().unwrap(), 2);
    }

    #[tokio::test]
    async fn oracle_outage_still_persists_failed_record() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new().with_timeout("sigO"));
        let gateway = gateway(store.clone(), oracle);

        let outcome = gateway
            .ingest(request("sigO", EventType::Tip, "2"))
            .await
            .unwrap();
        assert_eq!(outcome.verification_status, VerificationStatus::Failed);

        let record = store
            .get_verification_by_signature(&TxSignature::new("sigO"))
            .unwrap()
            .unwrap();
        assert_eq!(record.status, VerificationStatus::Failed);
    }

    #[tokio::test]
    async fn malformed_signature_is_rejected() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new());
        let gateway = gateway(store.clone(), oracle);

        let err = gateway
            .ingest(request("bad signature!", EventType::Tip, "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MalformedSignature(_)));
        assert_eq!(store.event_count().unwrap(), 0);
    }

    #[tokio::test]
    async fn empty_signature_is_a_missing_field() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(NullOracle::new());
        let gateway = gateway(store, oracle);

        let err = gateway
            .ingest(request("", EventType::Tip, "1"))
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::MissingField("signature")));
    }

    #[tokio::test]
    async fn duplicate_delivery_check_sees_verification_records() {
        let store = Arc::new(NullStore::new());
        let oracle = Arc::new(
            NullOracle::new().with_tx("sigX", NullOracle::confirmed_tx("sigX", 40)),
        );
        let gateway = gateway(store, oracle);

        let sig = TxSignature::new("sigX");
        assert!(!gateway.is_duplicate_delivery(&sig).unwrap());
        gateway
            .ingest(request("sigX", EventType::Tip, "1"))
            .await
            .unwrap();
        assert!(gateway.is_duplicate_delivery(&sig).unwrap());
    }
}
