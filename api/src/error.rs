//! API error type and HTTP status mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

use gratia_ingestion::IngestError;
use gratia_rail::RailError;
use gratia_settlement::SettlementError;
use gratia_verification::VerificationError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthorized")]
    Unauthorized,

    #[error("missing required field: {0}")]
    MissingField(String),

    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    /// The attempt ceiling has been reached.
    #[error("maximum retry limit ({0}) reached")]
    RetryLimit(u32),

    /// Operation illegal for the record's current state.
    #[error("{0}")]
    StateConflict(String),

    #[error("rail error: {0}")]
    Rail(#[from] RailError),

    #[error("internal error: {0}")]
    Internal(String),
}

/// Structured JSON error body.
#[derive(Serialize)]
struct ErrorBody {
    error: String,
    message: String,
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::MissingField(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Validation(_) | ApiError::StateConflict(_) | ApiError::RetryLimit(_) => {
                StatusCode::BAD_REQUEST
            }
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Rail(RailError::Timeout) => StatusCode::GATEWAY_TIMEOUT,
            ApiError::Rail(e) if e.is_transient() => StatusCode::BAD_GATEWAY,
            ApiError::Rail(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::Unauthorized => "unauthorized",
            ApiError::MissingField(_) => "missing_field",
            ApiError::Validation(_) => "invalid_request",
            ApiError::NotFound(_) => "not_found",
            ApiError::RetryLimit(_) => "retry_limit_exceeded",
            ApiError::StateConflict(_) => "state_conflict",
            ApiError::Rail(RailError::Timeout) => "transaction_timeout",
            ApiError::Rail(e) if e.is_transient() => "rail_unavailable",
            ApiError::Rail(_) => "invalid_request",
            ApiError::Internal(_) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = %self, "request failed");
        }
        let body = ErrorBody {
            error: self.code().to_string(),
            message: self.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::MissingField(field) => ApiError::MissingField(field.to_string()),
            IngestError::MalformedSignature(sig) => {
                ApiError::Validation(format!("malformed transaction signature: {sig}"))
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<SettlementError> for ApiError {
    fn from(e: SettlementError) -> Self {
        match e {
            SettlementError::EventNotFound(_)
            | SettlementError::PayoutNotFound(_)
            | SettlementError::NotCancellable(_) => ApiError::NotFound(e.to_string()),
            SettlementError::NotVerified(_) => ApiError::NotFound(e.to_string()),
            SettlementError::StateConflict { .. } => ApiError::StateConflict(e.to_string()),
            SettlementError::RetryLimitExceeded(limit) => ApiError::RetryLimit(limit),
            SettlementError::Rail(rail) => ApiError::Rail(rail),
            SettlementError::Store(store) => ApiError::Internal(store.to_string()),
        }
    }
}

impl From<VerificationError> for ApiError {
    fn from(e: VerificationError) -> Self {
        ApiError::Internal(e.to_string())
    }
}

impl From<gratia_store::StoreError> for ApiError {
    fn from(e: gratia_store::StoreError) -> Self {
        ApiError::Internal(e.to_string())
    }
}
