//! HTTP client wrapper with authentication and retry logic.
//!
//! Retry policy, applied to every call:
//! - 401: drop the cached token, log in again, retry once. A second 401
//!   is fatal.
//! - 429 / 503 / transport errors: exponential backoff up to
//!   `max_retries`, then fatal.
//! - Any other non-2xx, or a 2xx body that does not parse: fatal.

use chrono::{Duration as ChronoDuration, Utc};
use reqwest::{Client, Method, StatusCode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::api_types::{AuthRequest, AuthResponse};
use super::config::{BrokerageConfig, Credentials, RetryPolicy};
use super::error::BrokerageError;
use super::token::{AccessToken, TokenCache};

/// Token lifetime assumed when the login response omits an expiry.
const DEFAULT_TOKEN_TTL_MINUTES: i64 = 60;

/// Path of the login endpoint.
pub const AUTH_PATH: &str = "/auth/token";

/// Result of one request after retries.
enum Outcome {
    Body(String),
    Unauthorized,
}

/// Error category for determining retry behavior.
#[derive(Debug, PartialEq, Eq)]
enum ErrorCategory {
    Unauthorized,
    Retryable,
    Fatal,
}

/// Categorize HTTP status code for retry handling.
const fn categorize_status(status: StatusCode) -> ErrorCategory {
    match status.as_u16() {
        401 => ErrorCategory::Unauthorized,
        429 | 503 => ErrorCategory::Retryable,
        _ => ErrorCategory::Fatal,
    }
}

/// HTTP client for the brokerage API.
#[derive(Debug)]
pub struct BrokerageHttpClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
    retry: RetryPolicy,
    tokens: TokenCache,
}

impl BrokerageHttpClient {
    /// Create a new HTTP client from config.
    ///
    /// # Errors
    ///
    /// Returns error if credentials are incomplete or the HTTP client
    /// cannot be built.
    pub fn new(config: &BrokerageConfig) -> Result<Self, BrokerageError> {
        if config.credentials.is_incomplete() {
            return Err(BrokerageError::AuthenticationFailed {
                message: "Brokerage credentials are incomplete".to_string(),
            });
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| BrokerageError::Http(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            credentials: config.credentials.clone(),
            retry: config.retry,
            tokens: TokenCache::new(),
        })
    }

    /// The shared token cache.
    #[must_use]
    pub const fn tokens(&self) -> &TokenCache {
        &self.tokens
    }

    /// Make an authenticated GET request.
    ///
    /// # Errors
    ///
    /// See the module-level retry policy.
    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T, BrokerageError> {
        self.request(Method::GET, path, None::<&()>).await
    }

    /// Make an authenticated POST request.
    ///
    /// # Errors
    ///
    /// See the module-level retry policy.
    pub async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, BrokerageError> {
        self.request(Method::POST, path, Some(body)).await
    }

    /// Log in and return a fresh token. Does not touch the cache.
    ///
    /// # Errors
    ///
    /// Returns `AuthenticationFailed` if the server rejects the login or
    /// omits the token.
    pub async fn authenticate(&self) -> Result<AccessToken, BrokerageError> {
        let body = AuthRequest {
            name: self.credentials.username.clone(),
            password: self.credentials.password.clone(),
            app_id: self.credentials.app_id.clone(),
            app_version: self.credentials.app_version.clone(),
            cid: self.credentials.client_id.clone(),
            sec: self.credentials.client_secret.clone(),
            device_id: self.credentials.device_id.clone(),
        };

        let text = match self
            .send_with_backoff(Method::POST, AUTH_PATH, Some(&body), None)
            .await?
        {
            Outcome::Body(text) => text,
            Outcome::Unauthorized => {
                return Err(BrokerageError::AuthenticationFailed {
                    message: "Login rejected with 401".to_string(),
                });
            }
        };

        let response: AuthResponse = parse(AUTH_PATH, &text)?;
        if let Some(error_text) = response.error_text {
            return Err(BrokerageError::AuthenticationFailed {
                message: error_text,
            });
        }
        let value = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| BrokerageError::AuthenticationFailed {
                message: "Login response has no access token".to_string(),
            })?;
        let expires_at = response
            .expires_at
            .unwrap_or_else(|| Utc::now() + ChronoDuration::minutes(DEFAULT_TOKEN_TTL_MINUTES));

        debug!(expires_at = %expires_at, "Brokerage login succeeded");
        Ok(AccessToken::new(value, expires_at))
    }

    /// Authenticated request with a single re-login on 401.
    async fn request<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
    ) -> Result<T, BrokerageError> {
        let mut reauthenticated = false;

        loop {
            let token = self
                .tokens
                .get_or_authenticate(|| self.authenticate())
                .await?;

            match self
                .send_with_backoff(method.clone(), path, body, Some(token.value()))
                .await?
            {
                Outcome::Body(text) => return parse(path, &text),
                Outcome::Unauthorized if reauthenticated => {
                    return Err(BrokerageError::Unauthorized {
                        endpoint: path.to_string(),
                    });
                }
                Outcome::Unauthorized => {
                    warn!(endpoint = path, "Token rejected, re-authenticating");
                    self.tokens.invalidate(&token).await;
                    reauthenticated = true;
                }
            }
        }
    }

    /// Send one request, retrying throttled, unavailable and transport
    /// failures with exponential backoff.
    async fn send_with_backoff<B: Serialize + Sync>(
        &self,
        method: Method,
        path: &str,
        body: Option<&B>,
        bearer: Option<&str>,
    ) -> Result<Outcome, BrokerageError> {
        let url = format!("{}{path}", self.base_url);
        let mut attempt: u32 = 0;

        loop {
            let mut request = self.client.request(method.clone(), &url);
            if let Some(token) = bearer {
                request = request.bearer_auth(token);
            }
            if let Some(b) = body {
                request = request.json(b);
            }

            let (status, text) = match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let text = response.text().await.unwrap_or_default();
                    (Some(status), text)
                }
                Err(e) => (None, e.to_string()),
            };

            if let Some(code) = status {
                if code.is_success() {
                    return Ok(Outcome::Body(text));
                }
                match categorize_status(code) {
                    ErrorCategory::Unauthorized => return Ok(Outcome::Unauthorized),
                    ErrorCategory::Fatal => {
                        return Err(BrokerageError::Api {
                            endpoint: path.to_string(),
                            status: code.as_u16(),
                            body: text,
                        });
                    }
                    ErrorCategory::Retryable => {}
                }
            }

            if attempt >= self.retry.max_retries {
                let attempts = attempt + 1;
                return Err(match status {
                    Some(code) => BrokerageError::RetriesExhausted {
                        endpoint: path.to_string(),
                        status: Some(code.as_u16()),
                        body: text,
                        attempts,
                    },
                    None => BrokerageError::Network {
                        endpoint: path.to_string(),
                        message: text,
                        attempts,
                    },
                });
            }

            let delay = self.retry.delay_for(attempt);
            warn!(
                endpoint = path,
                status = status.map(|s| s.as_u16()),
                delay_ms = delay.as_millis(),
                attempt = attempt + 1,
                "Retryable brokerage error, backing off"
            );
            tokio::time::sleep(delay).await;
            attempt += 1;
        }
    }
}

/// Parse a 2xx body. An empty body parses as JSON `null`.
fn parse<T: DeserializeOwned>(endpoint: &str, text: &str) -> Result<T, BrokerageError> {
    let source = if text.trim().is_empty() { "null" } else { text };
    serde_json::from_str(source).map_err(|e| BrokerageError::UnparseableResponse {
        endpoint: endpoint.to_string(),
        message: e.to_string(),
        body: text.to_string(),
    })
}
