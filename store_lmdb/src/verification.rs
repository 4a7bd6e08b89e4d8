//! LMDB implementation of VerificationStore.
//!
//! Records are keyed by id with two secondary indexes: signature (unique,
//! the constraint concurrent creators race on) and event id.

use gratia_store::verification::{
    VerificationRecord, VerificationStats, VerificationStatus, VerificationStore,
};
use gratia_store::StoreError;
use gratia_types::{EventId, TxSignature};

use crate::environment::{decode, encode};
use crate::{LmdbError, LmdbStore};

impl LmdbStore {
    fn read_verification(
        &self,
        rtxn: &heed::RoTxn<'_>,
        id: &[u8],
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let val = self
            .verifications_db
            .get(rtxn, id)
            .map_err(LmdbError::from)?;
        val.map(decode).transpose().map_err(StoreError::from)
    }
}

impl VerificationStore for LmdbStore {
    fn insert_verification(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let sig_key = record.signature.as_str().as_bytes();
        let data = encode(record)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .verifications_by_sig_db
            .get(&wtxn, sig_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "verification {}",
                record.signature
            )));
        }
        self.verifications_db
            .put(&mut wtxn, record.id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        self.verifications_by_sig_db
            .put(&mut wtxn, sig_key, record.id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        self.verifications_by_event_db
            .put(
                &mut wtxn,
                record.event_id.as_str().as_bytes(),
                record.id.as_str().as_bytes(),
            )
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn update_verification(&self, record: &VerificationRecord) -> Result<(), StoreError> {
        let data = encode(record)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .verifications_db
            .get(&wtxn, record.id.as_str().as_bytes())
            .map_err(LmdbError::from)?
            .is_none()
        {
            return Err(StoreError::NotFound(format!(
                "verification {}",
                record.id
            )));
        }
        self.verifications_db
            .put(&mut wtxn, record.id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_verification_by_signature(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = match self
            .verifications_by_sig_db
            .get(&rtxn, signature.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(id) => id.to_vec(),
            None => return Ok(None),
        };
        self.read_verification(&rtxn, &id)
    }

    fn get_verification_by_event(
        &self,
        event_id: &EventId,
    ) -> Result<Option<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let id = match self
            .verifications_by_event_db
            .get(&rtxn, event_id.as_str().as_bytes())
            .map_err(LmdbError::from)?
        {
            Some(id) => id.to_vec(),
            None => return Ok(None),
        };
        self.read_verification(&rtxn, &id)
    }

    fn verifications_by_status(
        &self,
        status: VerificationStatus,
        limit: usize,
    ) -> Result<Vec<VerificationRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut records = Vec::new();
        for item in self.verifications_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, val) = item.map_err(LmdbError::from)?;
            let record: VerificationRecord = decode(val)?;
            if record.status == status {
                records.push(record);
                if records.len() >= limit {
                    break;
                }
            }
        }
        records.sort_by_key(|r| r.created_at);
        Ok(records)
    }

    fn verification_stats(&self) -> Result<VerificationStats, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let mut stats = VerificationStats::default();
        for item in self.verifications_db.iter(&rtxn).map_err(LmdbError::from)? {
            let (_key, val) = item.map_err(LmdbError::from)?;
            let record: VerificationRecord = decode(val)?;
            match record.status {
                VerificationStatus::Pending => stats.pending += 1,
                VerificationStatus::Verified => stats.verified += 1,
                VerificationStatus::Failed => stats.failed += 1,
            }
        }
        Ok(stats)
    }
}
