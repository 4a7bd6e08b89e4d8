//! Stablecoin settlement rail client.
//!
//! The rail is the external provider that converts verified on-chain tips
//! into off-chain stablecoin transfers: quote → mint for direct tips, and
//! payout creation for the settlement engine. Every call is wrapped with a
//! hard 5-second timeout; a timeout is a distinct, transient error class so
//! callers can poll or retry sooner, while 4xx-class rejections are
//! permanent failures of the attempt.

pub mod client;
pub mod error;
pub mod types;

pub use client::{HttpRail, RailConfig, StablecoinRail};
pub use error::RailError;
pub use types::{CreatePayoutRequest, RailMint, RailPayout, RailQuote};
