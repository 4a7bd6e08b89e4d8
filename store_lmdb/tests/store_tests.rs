//! Integration tests for the LMDB backend, focused on the uniqueness
//! constraints the rest of the pipeline leans on.

use gratia_store::event::{Event, EventStore};
use gratia_store::payout::{PayoutRecord, PayoutStatus, PayoutStore};
use gratia_store::verification::{VerificationRecord, VerificationStatus, VerificationStore};
use gratia_store::StoreError;
use gratia_store_lmdb::LmdbStore;
use gratia_types::{
    Amount, EventId, EventType, PayoutId, StableSymbol, Timestamp, TxSignature, WalletAddress,
};

fn open_store(dir: &tempfile::TempDir) -> LmdbStore {
    LmdbStore::open(dir.path(), 16 << 20).unwrap()
}

fn sample_event(signature: &str, event_type: EventType) -> Event {
    Event {
        id: EventId::generate(),
        event_type,
        signer: WalletAddress::new("signer1111111111111111111111111111"),
        receiver: WalletAddress::new("receiver111111111111111111111111"),
        amount: Amount::from_decimal_str("1.5").unwrap(),
        signature: TxSignature::new(signature),
        story_id: None,
        timestamp: Timestamp::from_millis(1_700_000_000_000),
    }
}

#[test]
fn duplicate_event_insert_is_rejected_and_rereadable() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let first = sample_event("sigA", EventType::Tip);
    store.insert_event(&first).unwrap();

    let second = sample_event("sigA", EventType::Tip);
    let err = store.insert_event(&second).unwrap_err();
    assert!(matches!(err, StoreError::Duplicate(_)));

    // The loser re-reads the winner's row.
    let winner = store
        .get_event_by_signature(&TxSignature::new("sigA"), EventType::Tip)
        .unwrap()
        .unwrap();
    assert_eq!(winner.id, first.id);
    assert_eq!(store.event_count().unwrap(), 1);
}

#[test]
fn same_signature_different_type_is_distinct() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    store.insert_event(&sample_event("sigA", EventType::Tip)).unwrap();
    store
        .insert_event(&sample_event("sigA", EventType::Share))
        .unwrap();
    assert_eq!(store.event_count().unwrap(), 2);
}

#[test]
fn verification_signature_is_unique() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let event = sample_event("sigB", EventType::Tip);
    store.insert_event(&event).unwrap();

    let record = VerificationRecord::pending(event.id.clone(), event.signature.clone());
    store.insert_verification(&record).unwrap();

    let rival = VerificationRecord::pending(event.id.clone(), event.signature.clone());
    assert!(store.insert_verification(&rival).unwrap_err().is_duplicate());

    let stored = store
        .get_verification_by_signature(&event.signature)
        .unwrap()
        .unwrap();
    assert_eq!(stored.id, record.id);
    assert_eq!(stored.status, VerificationStatus::Pending);

    let by_event = store
        .get_verification_by_event(&event.id)
        .unwrap()
        .unwrap();
    assert_eq!(by_event.id, record.id);
}

#[test]
fn verification_update_persists_new_status() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let event = sample_event("sigC", EventType::Tip);
    store.insert_event(&event).unwrap();
    let mut record = VerificationRecord::pending(event.id.clone(), event.signature.clone());
    store.insert_verification(&record).unwrap();

    record.status = VerificationStatus::Verified;
    record.slot = Some(123_456);
    record.verified_at = Some(Timestamp::now());
    store.update_verification(&record).unwrap();

    let stored = store
        .get_verification_by_signature(&event.signature)
        .unwrap()
        .unwrap();
    assert_eq!(stored.status, VerificationStatus::Verified);
    assert_eq!(stored.slot, Some(123_456));
}

fn sample_payout(event_id: &EventId, status: PayoutStatus) -> PayoutRecord {
    let now = Timestamp::now();
    PayoutRecord {
        id: PayoutId::generate(),
        event_id: event_id.clone(),
        rail_tip_id: None,
        status,
        currency: StableSymbol::Usdc,
        amount: Amount::from_decimal_str("1.5").unwrap(),
        attempt_count: 1,
        last_error: None,
        created_at: now,
        updated_at: now,
    }
}

#[test]
fn one_payout_per_event_even_after_cancellation() {
    let dir = tempfile::tempdir().unwrap();
    let store = open_store(&dir);

    let event = sample_event("sigD", EventType::Tip);
    store.insert_event(&event).unwrap();

    let mut payout = sample_payout(&event.id, PayoutStatus::Pending);
    store.insert_payout(&payout).unwrap();

    let rival = sample_payout(&event.id, PayoutStatus::Pending);
    assert!(store.insert_payout(&rival).unwrap_err().is_duplicate());

    // Cancellation keeps the index entry: still no second payout.
    payout.status = PayoutStatus::Cancelled;
    store.update_payout(&payout).unwrap();
    let rival = sample_payout(&event.id, PayoutStatus::Pending);
    assert!(store.insert_payout(&rival).unwrap_err().is_duplicate());

    let stored = store.get_payout_by_event(&event.id).unwrap().unwrap();
    assert_eq!(stored.status, PayoutStatus::Cancelled);
}

#[test]
fn reopened_environment_retains_rows() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = open_store(&dir);
        store.insert_event(&sample_event("sigE", EventType::Tip)).unwrap();
    }
    let store = open_store(&dir);
    assert!(store
        .get_event_by_signature(&TxSignature::new("sigE"), EventType::Tip)
        .unwrap()
        .is_some());
}
