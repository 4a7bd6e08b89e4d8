//! Event storage trait.

use crate::StoreError;
use gratia_types::{Amount, EventId, EventType, StoryId, Timestamp, TxSignature, WalletAddress};
use serde::{Deserialize, Serialize};

/// An immutable record of a claimed on-chain gratitude action.
///
/// Created only by the ingestion gateway; never updated or deleted.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Event {
    pub id: EventId,
    pub event_type: EventType,
    pub signer: WalletAddress,
    pub receiver: WalletAddress,
    /// Zero for non-monetary event types.
    pub amount: Amount,
    pub signature: TxSignature,
    pub story_id: Option<StoryId>,
    /// Claimed occurrence time, distinct from insert time.
    pub timestamp: Timestamp,
}

/// Trait for event storage operations.
///
/// The (signature, type) pair is unique. `insert_event` must perform the
/// existence check and the write atomically; on conflict it returns
/// [`StoreError::Duplicate`] and the caller re-reads the winner's row via
/// `get_event_by_signature`.
pub trait EventStore: Send + Sync {
    /// Insert a new event. Fails with `Duplicate` if an event with the same
    /// (signature, type) already exists.
    fn insert_event(&self, event: &Event) -> Result<(), StoreError>;

    fn get_event(&self, id: &EventId) -> Result<Option<Event>, StoreError>;

    fn get_event_by_signature(
        &self,
        signature: &TxSignature,
        event_type: EventType,
    ) -> Result<Option<Event>, StoreError>;

    /// All events referencing the given story.
    fn events_for_story(&self, story_id: &StoryId) -> Result<Vec<Event>, StoreError>;

    /// Full scan, used by the metrics refresher's duplicate diagnostic.
    fn iter_events(&self) -> Result<Vec<Event>, StoreError>;

    fn event_count(&self) -> Result<u64, StoreError>;
}
