//! Broker adapters.

pub mod brokerage;
pub mod live;
mod simulated;

pub use live::{LiveAccount, LiveBrokerAdapter};
pub use simulated::SimulatedBroker;
