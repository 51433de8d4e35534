//! Application Layer
//!
//! Orchestrates domain logic against execution backends:
//!
//! - **Ports**: the broker contract every backend implements
//! - **Rules**: the ordered status-transition pipeline
//! - **Lead broker**: fan-out across backends and performance reporting

pub mod lead_broker;
pub mod ports;
pub mod report;
pub mod rules;

pub use lead_broker::LeadBroker;
pub use ports::{BrokerError, BrokerPort};
pub use report::{FeeTotals, OrderReport, StrategyTally};
pub use rules::{Rule, RuleAction, RulePipeline, RuleTiming};
