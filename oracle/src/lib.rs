//! Chain verification oracle client.
//!
//! The oracle is the external chain-data service used to independently
//! confirm transaction details. It is abstracted behind a single
//! capability — [`ChainOracle::fetch_chain_tx`] — so engines can swap a
//! deterministic fake in tests. The HTTP implementation validates the
//! provider's response at the boundary and translates transport failures
//! into the local error taxonomy; raw payloads cross the boundary only as
//! the opaque audit blob.

pub mod client;
pub mod error;
pub mod types;

pub use client::{ChainOracle, HttpOracle, OracleConfig};
pub use error::OracleError;
pub use types::ChainTx;
