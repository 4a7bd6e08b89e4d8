//! Nullable store — thread-safe in-memory storage for testing.
//!
//! Enforces the same uniqueness semantics as the LMDB backend: events are
//! unique on (signature, type), verifications on signature, payouts on
//! event id (index entries survive cancellation), transfers on mint
//! signature. Each method takes its table lock for the whole check-and-put,
//! so concurrent duplicates resolve to exactly one insert here too.

use std::collections::HashMap;
use std::sync::Mutex;

use gratia_store::creator::{Creator, CreatorStore, Story};
use gratia_store::event::{Event, EventStore};
use gratia_store::metrics::{HostMetrics, MetricsStore};
use gratia_store::payout::{PayoutRecord, PayoutStore};
use gratia_store::transfer::{TransferRecord, TransferStore};
use gratia_store::verification::{
    VerificationRecord, VerificationStats, VerificationStatus, VerificationStore,
};
use gratia_store::StoreError;
use gratia_types::{CreatorId, EventId, EventType, PayoutId, StoryId, TxSignature};

/// An in-memory implementation of every storage trait.
/// Thread-safe for use with tokio's multi-threaded runtime.
#[derive(Default)]
pub struct NullStore {
    events: Mutex<HashMap<String, Event>>,
    events_by_sig: Mutex<HashMap<(String, EventType), String>>,
    verifications: Mutex<HashMap<String, VerificationRecord>>,
    verifications_by_sig: Mutex<HashMap<String, String>>,
    payouts: Mutex<HashMap<String, PayoutRecord>>,
    payouts_by_event: Mutex<HashMap<String, String>>,
    transfers: Mutex<HashMap<String, TransferRecord>>,
    creators: Mutex<HashMap<String, Creator>>,
    stories: Mutex<HashMap<String, Story>>,
    metrics: Mutex<HashMap<String, HostMetrics>>,
}

impl NullStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl EventStore for NullStore {
    fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let mut index = self.events_by_sig.lock().unwrap();
        let key = (event.signature.as_str().to_string(), event.event_type);
        if index.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "event {}/{}",
                event.signature, event.event_type
            )));
        }
        index.insert(key, event.id.as_str().to_string());
        self.events
            .lock()
            .unwrap()
            .insert(event.id.as_str().to_string(), event.clone());
        Ok(())
    }

    fn get_event(&self, id: &EventId) -> Result<Option<Event>, StoreError> {
        Ok(self.events.lock().unwrap().get(id.as_str()).cloned())
    }

    fn get_event_by_signature(
        &self,
        signature: &TxSignature,
        event_type: EventType,
    ) -> Result<Option<Event>, StoreError> {
        let index = self.events_by_sig.lock().unwrap();
        let key = (signature.as_str().to_string(), event_type);
        match index.get(&key) {
            Some(id) => Ok(self.events.lock().unwrap().get(id).cloned()),
            None => Ok(None),
        }
    }

    fn events_for_story(&self, story_id: &StoryId) -> Result<Vec<Event>, StoreError> {
        Ok(self
            .events
            .lock()
            .unwrap()
            .values()
            .filter(|e| e.story_id.as_ref() == Some(story_id))
            .cloned()
            .collect())
    }

    fn iter_events(&self) -> Result<Vec<Event>, StoreError> {
        Ok(self.events.lock().unwrap().values().cloned().collect())
    }

    fn event_count(&self) -> Result<u64, StoreError> {
        Ok(self.events.lock().unwrap().len() as u64)
    }
}

impl VerificationStore for NullStore {
    fn insert_verification(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let mut index = self.verifications_by_sig.lock().unwrap();
        let key = record.signature.as_str().to_string();
        if index.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "verification {}",
                record.signature
            )));
        }
        index.insert(key, record.id.as_str().to_string());
        self.verifications
            .lock()
            .unwrap()
            .insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn update_verification(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let mut records = self.verifications.lock().unwrap();
        if !records.contains_key(record.id.as_str()) {
            return Err(StoreError::NotFound(format!("verification {}", record.id)));
        }
        records.insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn get_verification_by_signature(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let index = self.verifications_by_sig.lock().unwrap();
        match index.get(signature.as_str()) {
            Some(id) => Ok(self.verifications.lock().unwrap().get(id).cloned()),
            None => Ok(None),
        }
    }

    fn get_verification_by_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        Ok(self
            .verifications
            .lock()
            .unwrap()
            .values()
            .find(|r| r.event_id == *event_id)
            .cloned())
    }

    fn verifications_by_status(
        &self,
        status: VerificationStatus,
        limit: usize,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let mut records: Vec<VerificationRecord> = self
            .verifications
            .lock()
            .unwrap()
            .values()
            .filter(|r| r.status == status)
            .cloned()
            .collect();
        records.sort_by_key(|r| r.created_at);
        records.truncate(limit);
        Ok(records)
    }

    fn verification_stats(&self) -> Result<VerificationStats, StoreError> {
        let mut stats = VerificationStats::default();
        for record in self.verifications.lock().unwrap().values() {
            match record.status {
                VerificationStatus::Pending => stats.pending += 1,
                VerificationStatus::Verified => stats.verified += 1,
                VerificationStatus::Failed => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}

impl PayoutStore for NullStore {
    fn insert_payout(&self, record: &PayoutRecord) -> Result<(), StoreError> {
        let mut index = self.payouts_by_event.lock().unwrap();
        let key = record.event_id.as_str().to_string();
        if index.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "payout for event {}",
                record.event_id
            )));
        }
        index.insert(key, record.id.as_str().to_string());
        self.payouts
            .lock()
            .unwrap()
            .insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn update_payout(&self, record: &PayoutRecord) -> Result<(), StoreError> {
        let mut records = self.payouts.lock().unwrap();
        if !records.contains_key(record.id.as_str()) {
            return Err(StoreError::NotFound(format!("payout {}", record.id)));
        }
        records.insert(record.id.as_str().to_string(), record.clone());
        Ok(())
    }

    fn get_payout(&self, id: &PayoutId) -> Result<Option<PayoutRecord>, StoreError> {
        Ok(self.payouts.lock().unwrap().get(id.as_str()).cloned())
    }

    fn get_payout_by_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<PayoutRecord>, StoreError> {
        let index = self.payouts_by_event.lock().unwrap();
        match index.get(event_id.as_str()) {
            Some(id) => Ok(self.payouts.lock().unwrap().get(id).cloned()),
            None => Ok(None),
        }
    }
}

impl TransferStore for NullStore {
    fn insert_transfer(&self, record: &TransferRecord) -> Result<(), StoreError> {
        let mut transfers = self.transfers.lock().unwrap();
        let key = record.tx_signature.as_str().to_string();
        if transfers.contains_key(&key) {
            return Err(StoreError::Duplicate(format!(
                "transfer {}",
                record.tx_signature
            )));
        }
        transfers.insert(key, record.clone());
        Ok(())
    }

    fn get_transfer_by_signature(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TransferRecord>, StoreError> {
        Ok(self
            .transfers
            .lock()
            .unwrap()
            .get(signature.as_str())
            .cloned())
    }
}

impl CreatorStore for NullStore {
    fn put_creator(&self, creator: &Creator) -> Result<(), StoreError> {
        self.creators
            .lock()
            .unwrap()
            .insert(creator.id.as_str().to_string(), creator.clone());
        Ok(())
    }

    fn iter_creators(&self) -> Result<Vec<Creator>, StoreError> {
        Ok(self.creators.lock().unwrap().values().cloned().collect())
    }

    fn put_story(&self, story: &Story) -> Result<(), StoreError> {
        self.stories
            .lock()
            .unwrap()
            .insert(story.id.as_str().to_string(), story.clone());
        Ok(())
    }

    fn stories_for_creator(&self, creator_id: &CreatorId) -> Result<Vec<Story>, StoreError> {
        Ok(self
            .stories
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.creator_id == *creator_id)
            .cloned()
            .collect())
    }
}

impl MetricsStore for NullStore {
    fn upsert_metrics(&self, metrics: &HostMetrics) -> Result<(), StoreError> {
        self.metrics
            .lock()
            .unwrap()
            .insert(metrics.creator_id.as_str().to_string(), metrics.clone());
        Ok(())
    }

    fn get_metrics(&self, creator_id: &CreatorId) -> Result<Option<HostMetrics>, StoreError> {
        Ok(self
            .metrics
            .lock()
            .unwrap()
            .get(creator_id.as_str())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gratia_types::{Amount, Timestamp, WalletAddress};

    fn test_event(signature: &str) -> Event {
        Event {
            id: EventId::generate(),
            event_type: EventType::Tip,
            signer: WalletAddress::new("signer"),
            receiver: WalletAddress::new("receiver"),
            amount: Amount::from_decimal_str("1").unwrap(),
            signature: TxSignature::new(signature),
            story_id: None,
            timestamp: Timestamp::from_millis(0),
        }
    }

    #[test]
    fn duplicate_event_is_rejected() {
        let store = NullStore::new();
        store.insert_event(&test_event("sig1")).unwrap();
        assert!(store.insert_event(&test_event("sig1")).unwrap_err().is_duplicate());
        assert_eq!(store.event_count().unwrap(), 1);
    }

    #[test]
    fn verification_lookup_by_event_and_signature_agree() {
        let store = NullStore::new();
        let event = test_event("sig2");
        store.insert_event(&event).unwrap();
        let record = VerificationRecord::pending(event.id.clone(), event.signature.clone());
        store.insert_verification(&record).unwrap();
        assert_eq!(
            store
                .get_verification_by_event(&event.id)
                .unwrap()
                .unwrap()
                .id,
            store
                .get_verification_by_signature(&event.signature)
                .unwrap()
                .unwrap()
                .id
        );
    }
}
