use thiserror::Error;

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request timed out")]
    Timeout,

    #[error("oracle unreachable: {0}")]
    Unreachable(String),

    #[error("oracle API error (status {status}): {body}")]
    Api { status: u16, body: String },

    #[error("oracle returned an invalid response: {0}")]
    InvalidResponse(String),

    #[error("oracle API key is not configured")]
    MissingCredentials,
}

impl OracleError {
    /// Whether a retry with the same inputs could plausibly succeed.
    pub fn is_transient(&self) -> bool {
        match self {
            OracleError::Timeout | OracleError::Unreachable(_) => true,
            OracleError::Api { status, .. } => *status >= 500,
            OracleError::InvalidResponse(_) | OracleError::MissingCredentials => false,
        }
    }
}
