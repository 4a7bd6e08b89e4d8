//! Nullable stablecoin rail — deterministic settlement behavior, no network.

use std::sync::Mutex;

use async_trait::async_trait;
use gratia_rail::types::{MintStatus, RailMint};
use gratia_rail::{CreatePayoutRequest, RailError, RailPayout, RailQuote, StablecoinRail};
use gratia_store::PayoutStatus;
use gratia_types::StableSymbol;

/// Failure modes the rail can be scripted with.
#[derive(Clone, Copy, Debug)]
pub enum RailFailure {
    Timeout,
    Api(u16),
}

impl RailFailure {
    fn to_error(self) -> RailError {
        match self {
            RailFailure::Timeout => RailError::Timeout,
            RailFailure::Api(status) => RailError::Api {
                status,
                code: if status >= 500 {
                    "RailUnavailable".into()
                } else {
                    "InvalidRequest".into()
                },
                details: None,
            },
        }
    }
}

/// A deterministic rail for testing.
///
/// By default every payout is acknowledged as `queued` with a synthetic tip
/// id. `fail_next` queues one failure; `fail_always` makes every call fail.
/// All payout requests are captured for assertions.
#[derive(Default)]
pub struct NullRail {
    fail_next: Mutex<Option<RailFailure>>,
    fail_always: Mutex<Option<RailFailure>>,
    payout_status: Mutex<Option<PayoutStatus>>,
    payout_requests: Mutex<Vec<CreatePayoutRequest>>,
    counter: Mutex<u32>,
}

impl NullRail {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the status reported for acknowledged payouts
    /// (default: `queued`).
    pub fn set_payout_status(&self, status: PayoutStatus) {
        *self.payout_status.lock().unwrap() = Some(status);
    }

    /// Fail the next rail call with the given failure, then recover.
    pub fn fail_next(&self, failure: RailFailure) {
        *self.fail_next.lock().unwrap() = Some(failure);
    }

    /// Fail every subsequent rail call.
    pub fn fail_always(&self, failure: RailFailure) {
        *self.fail_always.lock().unwrap() = Some(failure);
    }

    /// Payout requests the engine has issued, in order.
    pub fn payout_requests(&self) -> Vec<CreatePayoutRequest> {
        self.payout_requests.lock().unwrap().clone()
    }

    fn take_failure(&self) -> Option<RailFailure> {
        if let Some(failure) = *self.fail_always.lock().unwrap() {
            return Some(failure);
        }
        self.fail_next.lock().unwrap().take()
    }

    fn next_id(&self) -> u32 {
        let mut counter = self.counter.lock().unwrap();
        *counter += 1;
        *counter
    }
}

#[async_trait]
impl StablecoinRail for NullRail {
    async fn get_quote(&self, symbol: StableSymbol, amount: f64) -> Result<RailQuote, RailError> {
        if let Some(failure) = self.take_failure() {
            return Err(failure.to_error());
        }
        Ok(RailQuote {
            id: format!("quote-{}", self.next_id()),
            symbol: symbol.as_str().to_string(),
            amount,
            rate: 1.0,
            expires_at: "2099-01-01T00:00:00Z".to_string(),
        })
    }

    async fn generate_mint(
        &self,
        _recipient: &str,
        _amount: f64,
        _symbol: StableSymbol,
        quote_id: &str,
    ) -> Result<RailMint, RailError> {
        if let Some(failure) = self.take_failure() {
            return Err(failure.to_error());
        }
        let id = self.next_id();
        Ok(RailMint {
            rail_tx_id: format!("rail-tx-{id}"),
            signature: format!("mintsig{id}for{quote_id}"),
            status: MintStatus::Submitted,
        })
    }

    async fn create_payout(&self, request: &CreatePayoutRequest) -> Result<RailPayout, RailError> {
        self.payout_requests.lock().unwrap().push(request.clone());
        if let Some(failure) = self.take_failure() {
            return Err(failure.to_error());
        }
        let id = self.next_id();
        let status = self
            .payout_status
            .lock()
            .unwrap()
            .unwrap_or(PayoutStatus::Queued);
        Ok(RailPayout {
            payout_id: Some(format!("rail-payout-{id}")),
            rail_tip_id: Some(format!("rail-tip-{id}")),
            status,
            amount: Some(request.amount),
            currency: Some(request.currency),
            attempt_count: 0,
            last_error: None,
            raw: serde_json::json!({ "null": true, "eventId": request.event_id }),
        })
    }

    async fn health(&self) -> Result<(), RailError> {
        if let Some(failure) = self.take_failure() {
            return Err(failure.to_error());
        }
        Ok(())
    }
}
