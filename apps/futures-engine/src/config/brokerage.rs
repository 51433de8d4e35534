//! Brokerage connection configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::infrastructure::broker::brokerage::{BrokerageConfig, Credentials, RetryPolicy};

/// Brokerage REST settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrokerageSettings {
    /// API base URL.
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Login name.
    #[serde(default)]
    pub username: String,
    /// Password.
    #[serde(default)]
    pub password: String,
    /// Registered application id.
    #[serde(default = "default_app_id")]
    pub app_id: String,
    /// Application version.
    #[serde(default = "default_app_version")]
    pub app_version: String,
    /// API client id.
    #[serde(default)]
    pub client_id: String,
    /// API client secret.
    #[serde(default)]
    pub client_secret: String,
    /// Device id.
    #[serde(default)]
    pub device_id: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Backoff for throttled and unavailable responses.
    #[serde(default)]
    pub retry: RetrySettings,
}

/// Retry settings.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct RetrySettings {
    /// Retries after the first attempt.
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// First backoff delay in milliseconds; doubles per retry.
    #[serde(default = "default_initial_delay_ms")]
    pub initial_delay_ms: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_delay_ms: default_initial_delay_ms(),
        }
    }
}

impl BrokerageSettings {
    /// Login credentials.
    #[must_use]
    pub fn credentials(&self) -> Credentials {
        Credentials {
            username: self.username.clone(),
            password: self.password.clone(),
            app_id: self.app_id.clone(),
            app_version: self.app_version.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            device_id: self.device_id.clone(),
        }
    }

    /// Client configuration.
    #[must_use]
    pub fn to_client_config(&self) -> BrokerageConfig {
        BrokerageConfig::new(&self.base_url, self.credentials())
            .with_timeout(Duration::from_secs(self.timeout_secs))
            .with_retry(RetryPolicy {
                max_retries: self.retry.max_retries,
                initial_delay: Duration::from_millis(self.retry.initial_delay_ms),
            })
    }
}

fn default_base_url() -> String {
    "https://demo.api.example-futures.com/v1".to_string()
}

fn default_app_id() -> String {
    "futures-engine".to_string()
}

fn default_app_version() -> String {
    "1.0".to_string()
}

const fn default_timeout_secs() -> u64 {
    30
}

const fn default_max_retries() -> u32 {
    3
}

const fn default_initial_delay_ms() -> u64 {
    500
}
