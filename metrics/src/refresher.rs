//! The metrics recomputation job.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;

use serde::Serialize;

use gratia_store::{HostMetrics, Store, StoreError};
use gratia_types::{Amount, EventType, Timestamp};

/// What one refresh run accomplished.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct RefreshSummary {
    /// Stories scanned across all creators.
    pub ingested_total: u64,
    /// (signature, type) groups with more than one event — a diagnostic
    /// signal only; real duplicate prevention is the event store's
    /// uniqueness constraint.
    pub duplicates_total: u64,
    pub latency_ms: u64,
}

/// Recomputes every creator's aggregate reputation snapshot.
pub struct MetricsRefresher {
    store: Arc<dyn Store>,
}

impl MetricsRefresher {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Scan all creators' events and overwrite their metrics rows.
    ///
    /// Read-heavy and idempotent: only reads the event store and upserts
    /// metrics, so it can run while ingestion is live.
    pub fn refresh(&self) -> Result<RefreshSummary, StoreError> {
        let started = Instant::now();
        let mut summary = RefreshSummary::default();

        for creator in self.store.iter_creators()? {
            let stories = self.store.stories_for_creator(&creator.id)?;

            let mut total_tip_value = Amount::ZERO;
            let mut supporters: HashSet<String> = HashSet::new();
            let mut share_count = 0u64;

            for story in &stories {
                for event in self.store.events_for_story(&story.id)? {
                    match event.event_type {
                        EventType::Tip => {
                            total_tip_value = total_tip_value.saturating_add(event.amount);
                            supporters.insert(event.signer.to_string());
                        }
                        EventType::Share => share_count += 1,
                        _ => {}
                    }
                }
            }

            self.store.upsert_metrics(&HostMetrics {
                creator_id: creator.id.clone(),
                total_tip_value,
                unique_supporters: supporters.len() as u64,
                share_count,
                story_count: stories.len() as u64,
                updated_at: Timestamp::now(),
            })?;

            summary.ingested_total += stories.len() as u64;
        }

        summary.duplicates_total = count_duplicates(&*self.store)?;
        summary.latency_ms = started.elapsed().as_millis() as u64;

        tracing::info!(
            ingested_total = summary.ingested_total,
            duplicates_total = summary.duplicates_total,
            latency_ms = summary.latency_ms,
            "host metrics refreshed"
        );
        Ok(summary)
    }
}

/// Count (signature, type) groups holding more than one event.
fn count_duplicates(store: &dyn Store) -> Result<u64, StoreError> {
    let mut seen: HashSet<(String, EventType)> = HashSet::new();
    let mut duplicates = 0u64;
    for event in store.iter_events()? {
        let key = (event.signature.as_str().to_string(), event.event_type);
        if !seen.insert(key) {
            duplicates += 1;
        }
    }
    Ok(duplicates)
}
