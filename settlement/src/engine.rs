//! The payout settlement engine.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use gratia_rail::{CreatePayoutRequest, RailError, RailPayout, StablecoinRail};
use gratia_store::verification::VerificationStatus;
use gratia_store::{Event, PayoutRecord, PayoutStatus, Store};
use gratia_types::{Amount, EventId, PayoutId, StableSymbol, Timestamp, WalletAddress};

use crate::error::SettlementError;

/// Hard ceiling on payout attempts. Requests beyond it are rejected until
/// an operator intervenes.
pub const MAX_PAYOUT_ATTEMPTS: u32 = 3;

/// Result of a create/retry call.
#[derive(Clone, Debug, Serialize)]
pub struct PayoutOutcome {
    pub record: PayoutRecord,
    /// `false` when an existing record was returned or updated.
    pub created: bool,
    /// The rail's error message when the attempt was persisted as
    /// failed/queued rather than acknowledged.
    pub rail_error: Option<String>,
}

/// Drives payout records through their lifecycle against the external rail.
pub struct PayoutEngine {
    store: Arc<dyn Store>,
    rail: Arc<dyn StablecoinRail>,
    /// Advisory locks keyed by event id, held across the
    /// check → rail call → write sequence to close the check-then-insert
    /// window between concurrent calls for the same event.
    event_locks: Mutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl PayoutEngine {
    pub fn new(store: Arc<dyn Store>, rail: Arc<dyn StablecoinRail>) -> Self {
        Self {
            store,
            rail,
            event_locks: Mutex::new(HashMap::new()),
        }
    }

    async fn lock_event(&self, event_id: &EventId) -> Arc<Mutex<()>> {
        let mut locks = self.event_locks.lock().await;
        locks
            .entry(event_id.as_str().to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Require the event's verification record to currently be `verified`.
    fn require_verified(&self, event_id: &EventId) -> Result<(), SettlementError> {
        match self.store.get_verification_by_event(event_id)? {
            Some(record) if record.status == VerificationStatus::Verified => Ok(()),
            _ => Err(SettlementError::NotVerified(event_id.to_string())),
        }
    }

    /// Create a payout for a verified event.
    ///
    /// Naturally idempotent: an existing non-cancelled payout is returned
    /// as-is. A cancelled payout blocks the event permanently. A structured
    /// rail failure still persists the record — `queued` on timeout,
    /// `failed` otherwise — so the attempt is observable and retryable.
    pub async fn create_payout(
        &self,
        event_id: &EventId,
        recipient: &WalletAddress,
        currency: Option<StableSymbol>,
        metadata: Option<serde_json::Value>,
    ) -> Result<PayoutOutcome, SettlementError> {
        let event = self
            .store
            .get_event(event_id)?
            .ok_or_else(|| SettlementError::EventNotFound(event_id.to_string()))?;
        self.require_verified(event_id)?;

        let lock = self.lock_event(event_id).await;
        let _guard = lock.lock().await;

        if let Some(existing) = self.store.get_payout_by_event(event_id)? {
            if existing.status == PayoutStatus::Cancelled {
                return Err(SettlementError::StateConflict {
                    state: "cancelled",
                    reason: "a cancelled payout blocks new payouts for the event",
                });
            }
            return Ok(PayoutOutcome {
                record: existing,
                created: false,
                rail_error: None,
            });
        }

        let currency = currency.unwrap_or_default();
        let request = CreatePayoutRequest {
            event_id: event_id.clone(),
            amount: event.amount.as_f64(),
            currency,
            recipient: recipient.to_string(),
            metadata: build_metadata(&event, metadata, None),
        };

        let now = Timestamp::now();
        let (record, rail_error) = match self.rail.create_payout(&request).await {
            Ok(ack) => (payout_from_ack(&event, currency, &ack, now), None),
            Err(e) => {
                tracing::warn!(event_id = %event_id, error = %e, "rail payout creation failed");
                (payout_from_failure(&event, currency, &e, now), Some(e.to_string()))
            }
        };

        match self.store.insert_payout(&record) {
            Ok(()) => {
                tracing::info!(
                    event_id = %event_id,
                    payout_id = %record.id,
                    status = %record.status,
                    "payout created"
                );
                Ok(PayoutOutcome {
                    record,
                    created: true,
                    rail_error,
                })
            }
            Err(e) if e.is_duplicate() => {
                // Lost a cross-process race: the stored record wins.
                let existing = self
                    .store
                    .get_payout_by_event(event_id)?
                    .ok_or_else(|| SettlementError::PayoutNotFound(event_id.to_string()))?;
                Ok(PayoutOutcome {
                    record: existing,
                    created: false,
                    rail_error,
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Retry a failed (or still-pending) payout, up to the attempt ceiling.
    ///
    /// The verification state is re-checked at retry time — a verification
    /// can be invalidated between attempts, and a retry must not trust
    /// cached state. The record is updated in place; a second row is never
    /// created, and the attempt count never passes the ceiling.
    pub async fn retry_payout(
        &self,
        payout_id: &PayoutId,
    ) -> Result<PayoutOutcome, SettlementError> {
        let payout = self
            .store
            .get_payout(payout_id)?
            .ok_or_else(|| SettlementError::PayoutNotFound(payout_id.to_string()))?;

        match payout.status {
            PayoutStatus::Settled => {
                return Err(SettlementError::StateConflict {
                    state: "settled",
                    reason: "already processed",
                });
            }
            PayoutStatus::Queued => {
                return Err(SettlementError::StateConflict {
                    state: "queued",
                    reason: "already progressing",
                });
            }
            PayoutStatus::Cancelled => {
                return Err(SettlementError::StateConflict {
                    state: "cancelled",
                    reason: "cancelled payouts are final",
                });
            }
            PayoutStatus::Pending | PayoutStatus::Failed => {}
        }

        if payout.attempt_count >= MAX_PAYOUT_ATTEMPTS {
            return Err(SettlementError::RetryLimitExceeded(MAX_PAYOUT_ATTEMPTS));
        }

        let event = self
            .store
            .get_event(&payout.event_id)?
            .ok_or_else(|| SettlementError::EventNotFound(payout.event_id.to_string()))?;
        self.require_verified(&payout.event_id)?;

        let lock = self.lock_event(&payout.event_id).await;
        let _guard = lock.lock().await;

        let retry_attempt = payout.attempt_count + 1;
        let request = CreatePayoutRequest {
            event_id: payout.event_id.clone(),
            amount: payout.amount.as_f64(),
            currency: payout.currency,
            recipient: event.receiver.to_string(),
            metadata: build_metadata(&event, None, Some((retry_attempt, &payout.id))),
        };

        let mut record = payout;
        record.updated_at = Timestamp::now();

        let rail_error = match self.rail.create_payout(&request).await {
            Ok(ack) => {
                record.status = ack.status;
                record.rail_tip_id = ack.rail_tip_id.or(record.rail_tip_id.take());
                record.attempt_count = ack
                    .attempt_count
                    .max(retry_attempt)
                    .min(MAX_PAYOUT_ATTEMPTS);
                record.last_error = ack.last_error;
                None
            }
            Err(e) => {
                tracing::warn!(payout_id = %record.id, error = %e, "rail payout retry failed");
                record.status = if e.is_timeout() {
                    PayoutStatus::Queued
                } else {
                    PayoutStatus::Failed
                };
                record.attempt_count = retry_attempt.min(MAX_PAYOUT_ATTEMPTS);
                record.last_error = Some(e.to_string());
                Some(e.to_string())
            }
        };

        self.store.update_payout(&record)?;

        tracing::info!(
            payout_id = %record.id,
            attempt = record.attempt_count,
            status = %record.status,
            "payout retried"
        );
        Ok(PayoutOutcome {
            record,
            created: false,
            rail_error,
        })
    }

    /// Cancel a pending payout.
    ///
    /// Only `pending` is cancellable; queued and settled payouts are already
    /// with the rail, failed ones go through retry instead. Cancellation is
    /// permanent: the record is never retryable or payable again.
    pub async fn cancel_payout(
        &self,
        event_id: &EventId,
        reason: Option<String>,
    ) -> Result<PayoutRecord, SettlementError> {
        let lock = self.lock_event(event_id).await;
        let _guard = lock.lock().await;

        let mut payout = self
            .store
            .get_payout_by_event(event_id)?
            .filter(|p| p.status == PayoutStatus::Pending)
            .ok_or_else(|| SettlementError::NotCancellable(event_id.to_string()))?;

        payout.status = PayoutStatus::Cancelled;
        payout.last_error =
            Some(reason.unwrap_or_else(|| "payout cancelled by operator".to_string()));
        payout.updated_at = Timestamp::now();
        self.store.update_payout(&payout)?;

        tracing::info!(event_id = %event_id, payout_id = %payout.id, "payout cancelled");
        Ok(payout)
    }

    /// Current payout state for an event.
    pub fn get_payout(&self, event_id: &EventId) -> Result<PayoutRecord, SettlementError> {
        self.store
            .get_payout_by_event(event_id)?
            .ok_or_else(|| SettlementError::PayoutNotFound(event_id.to_string()))
    }
}

/// Event context attached to every rail call, plus caller metadata and
/// retry markers.
fn build_metadata(
    event: &Event,
    extra: Option<serde_json::Value>,
    retry: Option<(u32, &PayoutId)>,
) -> serde_json::Value {
    let mut metadata = serde_json::json!({
        "eventType": event.event_type,
        "originalSignature": event.signature,
        "signer": event.signer,
        "receiver": event.receiver,
    });
    if let Some(serde_json::Value::Object(extra)) = extra {
        if let serde_json::Value::Object(map) = &mut metadata {
            for (key, value) in extra {
                map.insert(key, value);
            }
        }
    }
    if let (Some((attempt, payout_id)), serde_json::Value::Object(map)) = (retry, &mut metadata) {
        map.insert("retryAttempt".into(), serde_json::json!(attempt));
        map.insert("originalPayoutId".into(), serde_json::json!(payout_id));
    }
    metadata
}

/// Build the stored record from a rail acknowledgement.
fn payout_from_ack(
    event: &Event,
    currency: StableSymbol,
    ack: &RailPayout,
    now: Timestamp,
) -> PayoutRecord {
    let amount = ack
        .amount
        .and_then(|a| Amount::from_f64(a).ok())
        .unwrap_or(event.amount);
    PayoutRecord {
        id: ack
            .payout_id
            .clone()
            .map(PayoutId::new)
            .unwrap_or_else(PayoutId::generate),
        event_id: event.id.clone(),
        rail_tip_id: ack.rail_tip_id.clone(),
        status: ack.status,
        currency: ack.currency.unwrap_or(currency),
        amount,
        attempt_count: ack.attempt_count,
        last_error: ack.last_error.clone(),
        created_at: now,
        updated_at: now,
    }
}

/// Build the stored record for a rail call that failed outright. A timeout
/// may still settle on the rail's side, so it parks as `queued`; anything
/// else is a `failed` first attempt.
fn payout_from_failure(
    event: &Event,
    currency: StableSymbol,
    error: &RailError,
    now: Timestamp,
) -> PayoutRecord {
    PayoutRecord {
        id: PayoutId::generate(),
        event_id: event.id.clone(),
        rail_tip_id: None,
        status: if error.is_timeout() {
            PayoutStatus::Queued
        } else {
            PayoutStatus::Failed
        },
        currency,
        amount: event.amount,
        attempt_count: 1,
        last_error: Some(error.to_string()),
        created_at: now,
        updated_at: now,
    }
}
