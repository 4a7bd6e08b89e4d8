//! Derived per-creator metrics storage trait.

use crate::StoreError;
use gratia_types::{Amount, CreatorId, Timestamp};
use serde::{Deserialize, Serialize};

/// Aggregate reputation snapshot for one creator.
///
/// Entirely recomputable from the event store; overwritten wholesale by the
/// metrics refresher and never hand-edited.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct HostMetrics {
    pub creator_id: CreatorId,
    pub total_tip_value: Amount,
    pub unique_supporters: u64,
    pub share_count: u64,
    pub story_count: u64,
    pub updated_at: Timestamp,
}

pub trait MetricsStore: Send + Sync {
    /// Replace the creator's snapshot (last-write-wins, no merge).
    fn upsert_metrics(&self, metrics: &HostMetrics) -> Result<(), StoreError>;

    fn get_metrics(&self, creator_id: &CreatorId) -> Result<Option<HostMetrics>, StoreError>;
}
