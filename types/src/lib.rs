//! Fundamental types for the gratia event pipeline.
//!
//! This crate defines the core types shared across every other crate in the
//! workspace: record identifiers, wallet addresses, transaction signatures,
//! fixed-point amounts, timestamps, and the event/currency enums.

pub mod address;
pub mod amount;
pub mod currency;
pub mod event;
pub mod id;
pub mod signature;
pub mod time;

pub use address::WalletAddress;
pub use amount::Amount;
pub use currency::StableSymbol;
pub use event::EventType;
pub use id::{CreatorId, EventId, PayoutId, StoryId, TransferId, VerificationId};
pub use signature::TxSignature;
pub use time::Timestamp;
