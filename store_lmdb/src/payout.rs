//! LMDB implementation of PayoutStore.
//!
//! The `payouts_by_event` index carries the one-payout-per-event constraint.
//! Cancelled payouts keep their index entry — a cancelled event can never
//! acquire a replacement payout.

use gratia_store::payout::{PayoutRecord, PayoutStore};
use gratia_store::StoreError;
use gratia_types::{EventId, PayoutId};

use crate::environment::{decode, encode};
use crate::{LmdbError, LmdbStore};

impl PayoutStore for LmdbStore {
    fn insert_payout(&self, record: &PayoutRecord) -> Result<(), StoreError> {
        let event_key = record.event_id.as_str().as_bytes();
        let data = encode(record)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .payouts_by_event_db
            .get(&wtxn, event_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "payout for event {}",
                record.event_id
            )));
        }
        self.payouts_db
            .put(&mut wtxn, record.id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        self.payouts_by_event_db
            .put(&mut wtxn, event_key, record.id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn update_payout(&self, record: &PayoutRecord) -> Result<(), StoreError> {
        let data = encode(record)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .payouts_db
            .get(&wtxn, record.id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_none()
        {
            return Err(StoreError::NotFound(format!("payout {}", record.id)));
        }
        self.payouts_db
            .put(&mut wtxn, record.id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_payout(&self, id: &PayoutId) -> Result<Option<PayoutRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .payouts_db
            .get(&rtxn, id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        val.map(decode).transpose().map_err(StoreError::from)
    }

    fn get_payout_by_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<PayoutRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = match self
            .payouts_by_event_db
            .get(&rtxn, event_id.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(id) => id,
            None => return Ok(None),
        };
        let val = self.payouts_db.get(&rtxn, id).map_err(LmdbError::from)?;
        match val {
            Some(bytes) => Ok(Some(decode(bytes)?)),
            None => Err(StoreError::Corruption(format!(
                "payout index entry without row for event {event_id}"
            ))),
        }
    }
}
