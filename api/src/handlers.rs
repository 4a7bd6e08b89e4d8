//! Request handlers and wire DTOs.

use std::str::FromStr;
use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::{Deserialize, Serialize};

use gratia_ingestion::IngestRequest;
use gratia_settlement::{PayoutOutcome, SettlementError};
use gratia_store::{PayoutRecord, VerificationStatus};
use gratia_types::{
    Amount, EventId, EventType, PayoutId, StableSymbol, StoryId, Timestamp, TxSignature,
    WalletAddress,
};

use crate::auth;
use crate::error::ApiError;
use crate::state::AppState;

fn require_secret(state: &AppState, headers: &HeaderMap) -> Result<(), ApiError> {
    if auth::verify_shared_secret(headers, &state.config.webhook_secret) {
        Ok(())
    } else {
        Err(ApiError::Unauthorized)
    }
}

// ── Ingestion webhook ────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestWebhookBody {
    pub tx_signature: Option<String>,
    #[serde(rename = "type")]
    pub event_type: Option<String>,
    pub signer: Option<String>,
    pub receiver: Option<String>,
    pub amount: Option<f64>,
    pub story_id: Option<String>,
    pub timestamp: Option<u64>,
}

#[derive(Serialize)]
pub struct IngestResponse {
    pub ok: bool,
    pub idempotent: bool,
    pub event_id: String,
    pub verification_id: String,
    pub verification_status: VerificationStatus,
}

impl IngestWebhookBody {
    fn into_request(self) -> Result<IngestRequest, ApiError> {
        let signature = self
            .tx_signature
            .filter(|s| !s.is_empty())
            .ok_or_else(|| ApiError::MissingField("txSignature".into()))?;
        let event_type = self
            .event_type
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::MissingField("type".into()))?;
        let event_type = EventType::from_str(&event_type).map_err(ApiError::Validation)?;
        let amount = Amount::from_f64(self.amount.unwrap_or(0.0))
            .map_err(|e| ApiError::Validation(e.to_string()))?;

        Ok(IngestRequest {
            signature: TxSignature::new(signature),
            event_type,
            signer: WalletAddress::new(self.signer.unwrap_or_default()),
            receiver: WalletAddress::new(self.receiver.unwrap_or_default()),
            amount,
            story_id: self.story_id.map(StoryId::new),
            timestamp: self.timestamp.map(Timestamp::from_millis),
        })
    }
}

/// `POST /webhooks/tx` — authenticated, idempotent event intake.
pub async fn ingest_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<IngestWebhookBody>,
) -> Result<(StatusCode, Json<IngestResponse>), ApiError> {
    require_secret(&state, &headers)?;

    let outcome = state.gateway.ingest(body.into_request()?).await?;

    state.counters.events_ingested.inc();
    if outcome.idempotent {
        state.counters.duplicate_deliveries.inc();
    }

    Ok((
        StatusCode::ACCEPTED,
        Json(IngestResponse {
            ok: true,
            idempotent: outcome.idempotent,
            event_id: outcome.event_id.to_string(),
            verification_id: outcome.verification_id.to_string(),
            verification_status: outcome.verification_status,
        }),
    ))
}

// ── Chain-provider webhook ───────────────────────────────────────────────

#[derive(Deserialize)]
pub struct ChainWebhookBody {
    pub signature: Option<String>,
    #[serde(rename = "accountData")]
    pub account_data: Option<ChainAccountData>,
}

#[derive(Deserialize)]
pub struct ChainAccountData {
    pub from: Option<String>,
    pub to: Option<String>,
    pub amount: Option<f64>,
}

/// `POST /webhooks/chain` — HMAC-signed provider notifications.
///
/// Checks verification-record presence before the event table: a full
/// redelivery (signature already has a record) is answered `409 duplicate`.
pub async fn chain_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: String,
) -> Result<(StatusCode, Json<serde_json::Value>), ApiError> {
    if !auth::verify_chain_signature(&headers, body.as_bytes(), &state.config.chain_webhook_secret)
    {
        return Err(ApiError::Unauthorized);
    }

    let payload: ChainWebhookBody = serde_json::from_str(&body)
        .map_err(|e| ApiError::Validation(format!("invalid JSON payload: {e}")))?;
    let signature = payload
        .signature
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("missing transaction signature".into()))?;

    let signature = TxSignature::new(signature);
    if state.gateway.is_duplicate_delivery(&signature)? {
        state.counters.duplicate_deliveries.inc();
        return Ok((
            StatusCode::CONFLICT,
            Json(serde_json::json!({
                "status": "duplicate",
                "message": "transaction already processed",
            })),
        ));
    }

    let account = payload.account_data;
    let request = IngestRequest {
        signature,
        // Provider notifications carry no event classification; tips are
        // the only type it reports.
        event_type: EventType::Tip,
        signer: WalletAddress::new(
            account.as_ref().and_then(|a| a.from.clone()).unwrap_or_default(),
        ),
        receiver: WalletAddress::new(
            account.as_ref().and_then(|a| a.to.clone()).unwrap_or_default(),
        ),
        amount: Amount::from_f64(account.as_ref().and_then(|a| a.amount).unwrap_or(0.0))
            .map_err(|e| ApiError::Validation(e.to_string()))?,
        story_id: None,
        timestamp: None,
    };

    let outcome = state.gateway.ingest(request).await?;
    state.counters.events_ingested.inc();

    Ok((
        StatusCode::ACCEPTED,
        Json(serde_json::json!({
            "status": "accepted",
            "message": "transaction stored and verified",
            "event_id": outcome.event_id,
            "verification_id": outcome.verification_id,
            "verification_status": outcome.verification_status,
        })),
    ))
}

// ── Payouts ──────────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TriggerPayoutBody {
    pub event_id: Option<String>,
    pub recipient_address: Option<String>,
    pub metadata: Option<serde_json::Value>,
}

#[derive(Serialize)]
pub struct PayoutResponse {
    pub payout_id: String,
    pub event_id: String,
    pub status: String,
    pub amount: f64,
    pub currency: String,
    pub attempt_count: u32,
    pub rail_tip_id: Option<String>,
    pub last_error: Option<String>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl PayoutResponse {
    fn from_outcome(outcome: &PayoutOutcome, message: Option<String>) -> Self {
        let mut response = Self::from_record(&outcome.record);
        response.success = outcome.rail_error.is_none();
        response.error = outcome.rail_error.clone();
        response.message = message;
        response
    }

    fn from_record(record: &PayoutRecord) -> Self {
        Self {
            payout_id: record.id.to_string(),
            event_id: record.event_id.to_string(),
            status: record.status.to_string(),
            amount: record.amount.as_f64(),
            currency: record.currency.to_string(),
            attempt_count: record.attempt_count,
            rail_tip_id: record.rail_tip_id.clone(),
            last_error: record.last_error.clone(),
            success: true,
            error: None,
            message: None,
        }
    }
}

/// `POST /payouts/trigger` — create a payout for a verified event.
pub async fn trigger_payout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<TriggerPayoutBody>,
) -> Result<Json<PayoutResponse>, ApiError> {
    require_secret(&state, &headers)?;

    let event_id = body
        .event_id
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("missing required field: eventId".into()))?;
    let recipient = body
        .recipient_address
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("missing required field: recipientAddress".into()))?;

    let currency = body
        .metadata
        .as_ref()
        .and_then(|m| m.get("currency"))
        .and_then(|c| c.as_str())
        .and_then(|c| StableSymbol::from_str(c).ok());

    let outcome = state
        .payouts
        .create_payout(
            &EventId::new(event_id),
            &WalletAddress::new(recipient),
            currency,
            body.metadata,
        )
        .await?;

    if outcome.created {
        state.counters.payouts_created.inc();
    }
    let message = (!outcome.created).then(|| "Payout already exists".to_string());
    Ok(Json(PayoutResponse::from_outcome(&outcome, message)))
}

/// `POST /payouts/retry/{payoutId}` — bounded retry of a payout.
pub async fn retry_payout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(payout_id): Path<String>,
) -> Result<Json<PayoutResponse>, ApiError> {
    require_secret(&state, &headers)?;

    let outcome = match state.payouts.retry_payout(&PayoutId::new(payout_id)).await {
        Ok(outcome) => outcome,
        // At retry time a lapsed verification is a caller problem, not a
        // missing resource.
        Err(SettlementError::NotVerified(event)) => {
            return Err(ApiError::Validation(format!(
                "event {event} verification no longer valid; cannot retry payout"
            )));
        }
        Err(e) => return Err(e.into()),
    };

    let message = Some(format!(
        "retry attempt {} {}",
        outcome.record.attempt_count,
        if outcome.rail_error.is_none() {
            "successful"
        } else {
            "failed"
        }
    ));
    Ok(Json(PayoutResponse::from_outcome(&outcome, message)))
}

/// `GET /payouts/{eventId}` — current payout state for an event.
pub async fn get_payout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<PayoutResponse>, ApiError> {
    require_secret(&state, &headers)?;
    let record = state.payouts.get_payout(&EventId::new(event_id))?;
    Ok(Json(PayoutResponse::from_record(&record)))
}

/// `DELETE /payouts/{eventId}` — cancel a pending payout.
pub async fn cancel_payout(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(event_id): Path<String>,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_secret(&state, &headers)?;
    state
        .payouts
        .cancel_payout(&EventId::new(event_id), None)
        .await?;
    Ok(Json(serde_json::json!({
        "ok": true,
        "message": "payout cancelled",
    })))
}

// ── Direct tips ──────────────────────────────────────────────────────────

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TipBody {
    pub from_wallet: Option<String>,
    pub to_wallet: Option<String>,
    pub amount: Option<f64>,
    pub symbol: Option<String>,
    pub story_id: Option<String>,
}

#[derive(Serialize)]
pub struct TipResponse {
    pub success: bool,
    pub tx_sig: String,
    pub rail_tx_id: String,
    pub status: String,
    pub idempotent: bool,
}

/// `POST /tips` — direct stablecoin tip through the rail.
pub async fn send_tip(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(body): Json<TipBody>,
) -> Result<(StatusCode, Json<TipResponse>), ApiError> {
    require_secret(&state, &headers)?;

    let from_wallet = body
        .from_wallet
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("fromWallet is required".into()))?;
    let to_wallet = body
        .to_wallet
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::Validation("toWallet is required".into()))?;
    let amount = body.amount.unwrap_or(0.0);
    if amount <= 0.0 {
        return Err(ApiError::Validation("amount must be greater than 0".into()));
    }
    let amount = Amount::from_f64(amount).map_err(|e| ApiError::Validation(e.to_string()))?;
    let symbol = body
        .symbol
        .as_deref()
        .map(StableSymbol::from_str)
        .transpose()
        .map_err(ApiError::Validation)?
        .unwrap_or_default();

    let outcome = state
        .transfers
        .send_tip(
            &WalletAddress::new(from_wallet),
            &WalletAddress::new(to_wallet),
            amount,
            symbol,
            body.story_id.map(StoryId::new),
        )
        .await?;

    if !outcome.idempotent {
        state.counters.tips_sent.inc();
    }
    let status = if outcome.idempotent {
        StatusCode::OK
    } else {
        StatusCode::CREATED
    };
    Ok((
        status,
        Json(TipResponse {
            success: true,
            tx_sig: outcome.record.tx_signature.to_string(),
            rail_tx_id: outcome.record.rail_tx_id.clone(),
            status: outcome.record.status.as_str().to_string(),
            idempotent: outcome.idempotent,
        }),
    ))
}

// ── Admin & telemetry ────────────────────────────────────────────────────

/// `POST /admin/metrics/refresh` — recompute creator reputation metrics.
pub async fn refresh_metrics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<serde_json::Value>, ApiError> {
    require_secret(&state, &headers)?;
    let summary = state.refresher.refresh()?;
    Ok(Json(serde_json::json!({
        "ingested_total": summary.ingested_total,
        "duplicates_total": summary.duplicates_total,
        "latency_ms": summary.latency_ms,
    })))
}

/// `GET /health` — unauthenticated liveness probe.
pub async fn health(State(state): State<Arc<AppState>>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "healthy",
        "service": "gratia-api",
        "uptime_secs": state.uptime_secs(),
    }))
}

/// `GET /metrics` — Prometheus exposition.
pub async fn prometheus_metrics(State(state): State<Arc<AppState>>) -> String {
    state.counters.render()
}
