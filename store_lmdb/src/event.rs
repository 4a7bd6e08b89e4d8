//! LMDB implementation of EventStore.
//!
//! Events are keyed by id; the `events_by_sig` database maps the composite
//! key `signature ++ 0x00 ++ type` to the event id and carries the
//! (signature, type) uniqueness constraint. The 0x00 separator cannot occur
//! inside a base58 signature, so composite keys never collide.

use gratia_store::event::{Event, EventStore};
use gratia_store::StoreError;
use gratia_types::{EventId, EventType, StoryId, TxSignature};

use crate::environment::{decode, encode};
use crate::{LmdbError, LmdbStore};

/// Build the composite `signature ++ 0x00 ++ type` key.
pub(crate) fn sig_type_key(signature: &TxSignature, event_type: EventType) -> Vec<u8> {
    let sig = signature.as_str().as_bytes();
    let ty = event_type.as_str().as_bytes();
    let mut key = Vec::with_capacity(sig.len() + 1 + ty.len());
    key.extend_from_slice(sig);
    key.push(0);
    key.extend_from_slice(ty);
    key
}

impl EventStore for LmdbStore {
    fn insert_event(&self, event: &Event) -> Result<(), StoreError> {
        let sig_key = sig_type_key(&event.signature, event.event_type);
        let data = encode(event)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        // Check-and-put inside one write txn: LMDB serializes writers, so
        // concurrent duplicates resolve to exactly one insert.
        if self
            .events_by_sig_db
            .get(&wtxn, &sig_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "event {}/{}",
                event.signature, event.event_type
            )));
        }
        self.events_db
            .put(&mut wtxn, event.id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        self.events_by_sig_db
            .put(&mut wtxn, &sig_key, event.id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_event(&self, id: &EventId) -> Result<Option<Event>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .events_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        val.map(decode).transpose().map_err(StoreError::from)
    }

    fn get_event_by_signature(
        &self,
        signature: &TxSignature,
        event_type: EventType,
    ) -> Result<Option<Event>, StoreError> {
        let sig_key = sig_type_key(signature, event_type);
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = match self
            .events_by_sig_db
            .get(&rtxn, &sig_key)
            .map_err(LmdbError::from)?
        {
            Some(id) => id,
            None => return Ok(None),
        };
        let val = self.events_db.get(&rtxn, id).map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            // Index points at a missing row: the two puts commit together,
            // so this can only mean on-disk corruption.
            None => Err(StoreError::Corruption(format!(
                "event index entry without row for {signature}/{event_type}"
            ))),
        }
    }

    fn events_for_story(&self, story_id: &StoryId) -> Result<Vec<Event>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut events = Vec::new();
        for item in self.events_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, val) = item.map_err(LmdbError::from)?;
            let event: Event = decode(val)?;
            if event.story_id.as_ref() == Some(story_id) {
                events.push(event);
            }
        }
        Ok(events)
    }

    fn iter_events(&self) -> Result<Vec<Event>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut events = Vec::new();
        for item in self.events_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, val) = item.map_err(LmdbError::from)?;
            events.push(decode(val)?);
        }
        Ok(events)
    }

    fn event_count(&self) -> Result<u64, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        Ok(self.events_db.len(&rtxn).map_err(LmdbError::from)?)
    }
}
