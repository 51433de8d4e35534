//! Brokerage REST integration.
//!
//! - `config`: base URL, credentials, timeout and retry policy
//! - `token`: single-flight bearer-token cache
//! - `http_client`: authenticated requests with backoff and re-login
//! - `client`: typed bracket, cancel, liquidate, status and balance calls
//! - `api_types`: JSON wire types

pub mod api_types;
mod client;
mod config;
mod error;
mod http_client;
mod token;

pub use client::{BracketIds, BrokerageClient};
pub use config::{BrokerageConfig, Credentials, RetryPolicy};
pub use error::BrokerageError;
pub use http_client::{AUTH_PATH, BrokerageHttpClient};
pub use token::{AccessToken, TokenCache};
