//! LMDB implementation of TransferStore.
//!
//! Transfers are keyed directly by mint signature, which doubles as the
//! uniqueness constraint.

use gratia_store::transfer::{TransferRecord, TransferStore};
use gratia_store::StoreError;
use gratia_types::TxSignature;

use crate::environment::{decode, encode};
use crate::{LmdbError, LmdbStore};

impl TransferStore for LmdbStore {
    fn insert_transfer(&self, record: &TransferRecord) -> Result<(), StoreError> {
        let sig_key = record.tx_signature.as_str().as_bytes();
        let data = encode(record)?;

        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        if self
            .transfers_db
            .get(&wtxn, sig_key)
            .map_err(LmdbError::from)?
            .is_some()
        {
            return Err(StoreError::Duplicate(format!(
                "transfer {}",
                record.tx_signature
            )));
        }
        self.transfers_db
            .put(&mut wtxn, sig_key, &data)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_transfer_by_signature(
        &self,
        signature: &TxSignature,
    ) -> Result<Option<TransferRecord>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .transfers_db
            .get(&rtxn, signature.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        val.map(decode).transpose().map_err(StoreError::from)
    }
}
