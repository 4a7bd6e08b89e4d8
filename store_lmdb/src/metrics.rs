//! LMDB implementation of MetricsStore.

use gratia_store::metrics::{HostMetrics, MetricsStore};
use gratia_store::StoreError;
use gratia_types::CreatorId;

use crate::environment::{decode, encode};
use crate::{LmdbError, LmdbStore};

impl MetricsStore for LmdbStore {
    fn upsert_metrics(&self, metrics: &HostMetrics) -> Result<(), StoreError> {
        let data = encode(metrics)?;
        let mut wtxn = self.env.write_txn().map_err(LmdbError::from)?;
        self.metrics_db
            .put(&mut wtxn, metrics.creator_id.as_str().as_bytes(), &data)
            .map_err(LmdbError::from)?;
        wtxn.commit().map_err(LmdbError::from)?;
        Ok(())
    }

    fn get_metrics(&self, creator_id: &CreatorId) -> Result<Option<HostMetrics>, StoreError> {
        let rtxn = self.env.read_txn().map_err(LmdbError::from)?;
        let val = self
            .metrics_db
            .get(&rtxn, creator_id.as_str().as_bytes())
            .map_err(LmdbError::from)?;
        val.map(decode).transpose().map_err(StoreError::from)
    }
}
