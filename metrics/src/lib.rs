//! Metrics refresher.
//!
//! Batch job recomputing per-creator aggregate reputation (total tipped
//! value, unique supporters, share count) from the event store. The output
//! is a rebuildable cache, not a source of truth: every run overwrites each
//! creator's row wholesale, so the job is safe to run concurrently with
//! ingestion.

pub mod refresher;

pub use refresher::{MetricsRefresher, RefreshSummary};
