use thiserror::Error;

#[derive(Debug, Error)]
pub enum RailError {
    #[error("rail request timed out")]
    Timeout,

    #[error("rail unreachable: {0}")]
    Unreachable(String),

    #[error("rail API error (status {status}, code {code})")]
    Api {
        status: u16,
        code: String,
        details: Option<serde_json::Value>,
    },

    #[error("rail returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("rail API key is not configured")]
    MissingCredentials,
}

impl RailError {
    /// Whether the failure is worth retrying without operator intervention.
    pub fn is_transient(&self) -> bool {
        match self {
            RailError::Timeout | RailError::Unreachable(_) => true,
            RailError::Api { status, .. } => *status >= 500,
            RailError::InvalidResponse(_) | RailError::MissingCredentials => false,
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, RailError::Timeout)
    }
}
