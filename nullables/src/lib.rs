//! Nullable infrastructure for deterministic testing.
//!
//! All external dependencies (storage, chain oracle, stablecoin rail) are
//! abstracted behind traits. This crate provides test-friendly
//! implementations that:
//! - Return deterministic values
//! - Can be controlled programmatically
//! - Never touch the filesystem or network
//!
//! Usage: swap real implementations for nullables in tests.

pub mod oracle;
pub mod rail;
pub mod store;

pub use oracle::NullOracle;
pub use rail::{NullRail, RailFailure};
pub use store::NullStore;
