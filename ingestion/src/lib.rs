//! Ingestion gateway.
//!
//! The webhook-facing component: validates inbound event notifications,
//! performs the idempotent event insert, and drives verification-record
//! creation inline. After a successful `ingest` call exactly one event row
//! and exactly one verification record exist for the (signature, type)
//! pair, regardless of concurrent duplicate deliveries — the storage
//! layer's uniqueness constraints are the serialization point, and losers
//! of an insert race re-read the winner's row.

pub mod error;
pub mod gateway;

pub use error::IngestError;
pub use gateway::{IngestOutcome, IngestRequest, IngestionGateway};
