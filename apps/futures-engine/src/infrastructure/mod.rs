//! Infrastructure Layer
//!
//! Adapters for the ports defined in the application layer:
//!
//! - `broker/`: simulated broker, brokerage REST client, live account adapter
//! - `config/`: dependency wiring from the loaded configuration

pub mod broker;
pub mod config;
