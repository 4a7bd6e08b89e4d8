//! LMDB storage backend for the gratia event pipeline.
//!
//! Implements all storage traits from `gratia-store` using the `heed` LMDB
//! bindings. Each logical table maps to one LMDB database within a single
//! environment; uniqueness constraints are enforced by performing the
//! existence check and the write inside one write transaction — LMDB's
//! single-writer discipline makes that sequence the serialization point
//! for concurrent duplicate inserts.

pub mod creator;
pub mod environment;
pub mod error;
pub mod event;
pub mod metrics;
pub mod payout;
pub mod transfer;
pub mod verification;

pub use environment::LmdbStore;
pub use error::LmdbError;
