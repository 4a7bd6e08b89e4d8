//! Verification engine.
//!
//! Consumes a newly-ingested event's signature, asks the chain oracle for
//! the transaction, and drives the verification record's state machine:
//! `pending` → `verified` (terminal) or `pending` → `failed` (resettable by
//! an explicit operator retry). Oracle transport failures are recorded as
//! failed records rather than propagated; a missing verification record is
//! a data-integrity violation and is raised to the caller.

pub mod engine;
pub mod error;

pub use engine::{VerificationEngine, VerifyOutcome};
pub use error::VerificationError;
