//! LMDB environment setup.

use std::path::Path;
use std::sync::Arc;

use heed::types::Bytes;
use heed::{Database, Env, EnvOpenOptions};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::LmdbError;

/// Default map size: 1 GiB, plenty for an event log of this shape.
pub const DEFAULT_MAP_SIZE: usize = 1 << 30;

const MAX_DBS: u32 = 12;

/// LMDB-backed implementation of every `gratia-store` trait.
///
/// Holds the environment plus one database handle per logical table.
/// Secondary-index databases (`*_by_*`) map a unique key to the primary id
/// and double as the uniqueness constraints.
pub struct LmdbStore {
    pub(crate) env: Arc<Env>,
    /// event id -> Event
    pub(crate) events_db: Database<Bytes, Bytes>,
    /// signature ++ 0x00 ++ type -> event id (unique)
    pub(crate) events_by_sig_db: Database<Bytes, Bytes>,
    /// verification id -> VerificationRecord
    pub(crate) verifications_db: Database<Bytes, Bytes>,
    /// signature -> verification id (unique)
    pub(crate) verifications_by_sig_db: Database<Bytes, Bytes>,
    /// event id -> verification id
    pub(crate) verifications_by_event_db: Database<Bytes, Bytes>,
    /// payout id -> PayoutRecord
    pub(crate) payouts_db: Database<Bytes, Bytes>,
    /// event id -> payout id (unique, cancelled entries retained)
    pub(crate) payouts_by_event_db: Database<Bytes, Bytes>,
    /// mint signature -> TransferRecord
    pub(crate) transfers_db: Database<Bytes, Bytes>,
    /// creator id -> Creator
    pub(crate) creators_db: Database<Bytes, Bytes>,
    /// story id -> Story
    pub(crate) stories_db: Database<Bytes, Bytes>,
    /// creator id -> HostMetrics
    pub(crate) metrics_db: Database<Bytes, Bytes>,
}

impl LmdbStore {
    /// Open or create an LMDB environment at the given path.
    pub fn open(path: &Path, map_size: usize) -> Result<Self, LmdbError> {
        std::fs::create_dir_all(path)
            .map_err(|e| LmdbError::Heed(format!("create data dir: {e}")))?;

        // Safety: the daemon is the only process opening this environment.
        let env = unsafe {
            EnvOpenOptions::new()
                .map_size(map_size)
                .max_dbs(MAX_DBS)
                .open(path)?
        };

        let mut wtxn = env.write_txn()?;
        let events_db = env.create_database(&mut wtxn, Some("events"))?;
        let events_by_sig_db = env.create_database(&mut wtxn, Some("events_by_sig"))?;
        let verifications_db = env.create_database(&mut wtxn, Some("verifications"))?;
        let verifications_by_sig_db =
            env.create_database(&mut wtxn, Some("verifications_by_sig"))?;
        let verifications_by_event_db =
            env.create_database(&mut wtxn, Some("verifications_by_event"))?;
        let payouts_db = env.create_database(&mut wtxn, Some("payouts"))?;
        let payouts_by_event_db = env.create_database(&mut wtxn, Some("payouts_by_event"))?;
        let transfers_db = env.create_database(&mut wtxn, Some("transfers"))?;
        let creators_db = env.create_database(&mut wtxn, Some("creators"))?;
        let stories_db = env.create_database(&mut wtxn, Some("stories"))?;
        let metrics_db = env.create_database(&mut wtxn, Some("metrics"))?;
        wtxn.commit()?;

        Ok(Self {
            env: Arc::new(env),
            events_db,
            events_by_sig_db,
            verifications_db,
            verifications_by_sig_db,
            verifications_by_event_db,
            payouts_db,
            payouts_by_event_db,
            transfers_db,
            creators_db,
            stories_db,
            metrics_db,
        })
    }
}

/// Encode a record for storage.
pub(crate) fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>, LmdbError> {
    Ok(bincode::serialize(value)?)
}

/// Decode a stored record.
pub(crate) fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, LmdbError> {
    Ok(bincode::deserialize(bytes)?)
}
