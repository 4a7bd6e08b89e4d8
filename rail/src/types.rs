//! Typed views of rail API requests and responses.

use serde::{Deserialize, Serialize};

use gratia_store::PayoutStatus;
use gratia_types::{EventId, StableSymbol};

/// A mint/redeem quote issued by the rail.
#[derive(Clone, Debug, Deserialize)]
pub struct RailQuote {
    pub id: String,
    pub symbol: String,
    pub amount: f64,
    pub rate: f64,
    #[serde(rename = "expiresAt")]
    pub expires_at: String,
}

/// Status the rail reports for a submitted mint transaction.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MintStatus {
    #[default]
    Submitted,
    Confirmed,
    Failed,
}

/// A mint transaction generated by the rail.
#[derive(Clone, Debug, Deserialize)]
pub struct RailMint {
    #[serde(rename = "reflectTxId")]
    pub rail_tx_id: String,
    pub signature: String,
    #[serde(default)]
    pub status: MintStatus,
}

/// Payout creation request sent to the rail.
#[derive(Clone, Debug, Serialize)]
pub struct CreatePayoutRequest {
    #[serde(rename = "eventId")]
    pub event_id: EventId,
    pub amount: f64,
    pub currency: StableSymbol,
    pub recipient: String,
    pub metadata: serde_json::Value,
}

/// A payout as acknowledged by the rail, normalized at the boundary.
#[derive(Clone, Debug)]
pub struct RailPayout {
    pub payout_id: Option<String>,
    pub rail_tip_id: Option<String>,
    pub status: PayoutStatus,
    pub amount: Option<f64>,
    pub currency: Option<StableSymbol>,
    pub attempt_count: u32,
    pub last_error: Option<String>,
    /// The rail's full response, retained for logging.
    pub raw: serde_json::Value,
}

/// Raw payout response shape; the rail is loose about field names and
/// numeric encodings, so everything is optional here and normalized by
/// [`RailPayout::from_raw`].
#[derive(Debug, Deserialize)]
struct PayoutResponse {
    #[serde(rename = "payoutId")]
    payout_id: Option<String>,
    id: Option<String>,
    #[serde(rename = "reflectTipId")]
    rail_tip_id: Option<String>,
    status: Option<String>,
    amount: Option<serde_json::Value>,
    currency: Option<String>,
    #[serde(rename = "attemptCount")]
    attempt_count: Option<serde_json::Value>,
    #[serde(rename = "retryCount")]
    retry_count: Option<serde_json::Value>,
    #[serde(rename = "lastError")]
    last_error: Option<String>,
    error: Option<String>,
}

fn coerce_u32(value: Option<&serde_json::Value>) -> u32 {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
        Some(serde_json::Value::String(s)) => s.parse().unwrap_or(0),
        _ => 0,
    }
}

fn coerce_f64(value: Option<&serde_json::Value>) -> Option<f64> {
    match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.parse().ok(),
        _ => None,
    }
}

/// Statuses the rail may report; anything else is treated as `queued`.
fn normalize_status(status: Option<&str>) -> PayoutStatus {
    match status {
        Some("pending") => PayoutStatus::Pending,
        Some("queued") => PayoutStatus::Queued,
        Some("settled") => PayoutStatus::Settled,
        Some("failed") => PayoutStatus::Failed,
        Some("cancelled") => PayoutStatus::Cancelled,
        _ => PayoutStatus::Queued,
    }
}

impl RailPayout {
    /// Normalize the rail's loosely-typed payout response.
    pub fn from_raw(raw: serde_json::Value) -> Result<Self, crate::RailError> {
        let parsed: PayoutResponse = serde_json::from_value(raw.clone())
            .map_err(|e| crate::RailError::InvalidResponse(format!("payout shape: {e}")))?;

        Ok(Self {
            payout_id: parsed.payout_id.or(parsed.id),
            rail_tip_id: parsed.rail_tip_id,
            status: normalize_status(parsed.status.as_deref()),
            amount: coerce_f64(parsed.amount.as_ref()),
            currency: parsed.currency.and_then(|c| c.parse().ok()),
            attempt_count: coerce_u32(
                parsed
                    .attempt_count
                    .as_ref()
                    .or(parsed.retry_count.as_ref()),
            ),
            last_error: parsed.last_error.or(parsed.error),
            raw,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_stringly_typed_fields() {
        let payout = RailPayout::from_raw(serde_json::json!({
            "payoutId": "p-1",
            "reflectTipId": "tip-1",
            "status": "queued",
            "amount": "1.50",
            "currency": "USDC",
            "attemptCount": "2"
        }))
        .unwrap();
        assert_eq!(payout.payout_id.as_deref(), Some("p-1"));
        assert_eq!(payout.status, PayoutStatus::Queued);
        assert_eq!(payout.amount, Some(1.5));
        assert_eq!(payout.currency, Some(StableSymbol::Usdc));
        assert_eq!(payout.attempt_count, 2);
    }

    #[test]
    fn unknown_status_defaults_to_queued() {
        let payout = RailPayout::from_raw(serde_json::json!({ "id": "p-2", "status": "???" }))
            .unwrap();
        assert_eq!(payout.status, PayoutStatus::Queued);
        assert_eq!(payout.attempt_count, 0);
    }
}
