//! Brokerage client configuration.

use std::fmt;
use std::time::Duration;

/// Login credentials for the token endpoint.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Account login name.
    pub username: String,
    /// Account password.
    pub password: String,
    /// Registered application id.
    pub app_id: String,
    /// Application version string.
    pub app_version: String,
    /// API client id.
    pub client_id: String,
    /// API client secret.
    pub client_secret: String,
    /// Stable device identifier.
    pub device_id: String,
}

impl Credentials {
    /// Whether any field needed to log in is blank.
    #[must_use]
    pub fn is_incomplete(&self) -> bool {
        [
            &self.username,
            &self.password,
            &self.app_id,
            &self.client_id,
            &self.client_secret,
            &self.device_id,
        ]
        .iter()
        .any(|field| field.trim().is_empty())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("app_id", &self.app_id)
            .field("app_version", &self.app_version)
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("device_id", &self.device_id)
            .finish()
    }
}

/// Configuration for the brokerage REST client.
#[derive(Debug, Clone)]
pub struct BrokerageConfig {
    /// API base URL, without trailing slash.
    pub base_url: String,
    /// Login credentials.
    pub credentials: Credentials,
    /// HTTP request timeout.
    pub timeout: Duration,
    /// Retry policy for throttled and unavailable responses.
    pub retry: RetryPolicy,
}

impl BrokerageConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(base_url: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            credentials,
            timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
        }
    }

    /// Set the HTTP timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the retry policy.
    #[must_use]
    pub const fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Retry policy.
///
/// Attempt `n` (zero-based) waits `initial_delay * 2^n` before retrying.
/// After `max_retries` retries the call fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum number of retries after the first attempt.
    pub max_retries: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(500),
        }
    }
}

impl RetryPolicy {
    /// Delay before retry number `attempt` (zero-based).
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 1_u32.checked_shl(attempt).unwrap_or(u32::MAX);
        self.initial_delay.saturating_mul(factor)
    }
}
