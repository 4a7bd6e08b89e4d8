//! HTTP interface for the gratia pipeline.
//!
//! Endpoints:
//! - `POST /webhooks/tx` — generic ingestion webhook (shared secret)
//! - `POST /webhooks/chain` — chain-provider webhook (HMAC-signed body);
//!   rejects full redeliveries with `409 duplicate`
//! - `POST /payouts/trigger` — create a payout for a verified event
//! - `POST /payouts/retry/{payoutId}` — bounded payout retry
//! - `GET  /payouts/{eventId}` — current payout state
//! - `DELETE /payouts/{eventId}` — cancel a pending payout
//! - `POST /tips` — direct stablecoin tip (quote → mint)
//! - `POST /admin/metrics/refresh` — recompute creator metrics
//! - `GET  /health` — liveness
//! - `GET  /metrics` — Prometheus exposition
//!
//! All mutating endpoints authenticate with the `x-webhook-secret` header,
//! compared in constant time. Errors are structured JSON
//! `{ error, message }` with the HTTP status carrying the retryability
//! class: 401/400/422 fix-and-resend, 409 already done, 502/504 try later,
//! 500 operator investigation.

pub mod auth;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod server;
pub mod state;

pub use error::ApiError;
pub use server::{build_router, serve};
pub use state::{ApiConfig, AppState};
