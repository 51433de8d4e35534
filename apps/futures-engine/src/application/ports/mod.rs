//! Application Ports (Driven)
//!
//! Ports define interfaces for interacting with execution backends.

mod broker_port;

pub use broker_port::{BrokerError, BrokerPort};
