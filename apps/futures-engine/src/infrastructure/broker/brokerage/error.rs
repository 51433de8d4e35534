//! Brokerage client error types.

use thiserror::Error;

use crate::application::ports::BrokerError;

/// Errors from the brokerage REST client.
///
/// Every variant carries enough context (endpoint, status, body, attempt
/// count) to diagnose a failure from the log line alone.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BrokerageError {
    /// HTTP client could not be built.
    #[error("HTTP client error: {0}")]
    Http(String),

    /// Login rejected or token missing from the response.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed {
        /// Server-provided reason.
        message: String,
    },

    /// Second consecutive 401 after a token refresh.
    #[error("Unauthorized after token refresh: {endpoint}")]
    Unauthorized {
        /// Request path.
        endpoint: String,
    },

    /// Still throttled or unavailable after every retry.
    #[error("Retries exhausted for {endpoint} after {attempts} attempts (status {status:?}): {body}")]
    RetriesExhausted {
        /// Request path.
        endpoint: String,
        /// Last HTTP status.
        status: Option<u16>,
        /// Last response body or transport error.
        body: String,
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// Timeout or connection failure on every attempt.
    #[error("Network error calling {endpoint} after {attempts} attempts: {message}")]
    Network {
        /// Request path.
        endpoint: String,
        /// Last transport error.
        message: String,
        /// Attempts made, including the first.
        attempts: u32,
    },

    /// Non-retryable HTTP status.
    #[error("API error {status} from {endpoint}: {body}")]
    Api {
        /// Request path.
        endpoint: String,
        /// HTTP status.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// 2xx response whose body did not parse.
    #[error("Unparseable response from {endpoint}: {message}; body: {body}")]
    UnparseableResponse {
        /// Request path.
        endpoint: String,
        /// Parser error.
        message: String,
        /// Raw response body.
        body: String,
    },

    /// Request rejected with a `failureReason` in a 2xx body.
    #[error("Request to {endpoint} rejected: {reason} ({text})")]
    Rejected {
        /// Request path.
        endpoint: String,
        /// Failure code.
        reason: String,
        /// Failure description.
        text: String,
    },
}

impl BrokerageError {
    /// Request path the error came from, when known.
    #[must_use]
    pub fn endpoint(&self) -> Option<&str> {
        match self {
            Self::Unauthorized { endpoint }
            | Self::RetriesExhausted { endpoint, .. }
            | Self::Network { endpoint, .. }
            | Self::Api { endpoint, .. }
            | Self::UnparseableResponse { endpoint, .. }
            | Self::Rejected { endpoint, .. } => Some(endpoint),
            Self::Http(_) | Self::AuthenticationFailed { .. } => None,
        }
    }
}

impl From<BrokerageError> for BrokerError {
    fn from(err: BrokerageError) -> Self {
        Self::Remote {
            source: Box::new(err),
        }
    }
}
