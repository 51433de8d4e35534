// Allow unwrap/expect in tests - tests should panic on unexpected errors
#![cfg_attr(
    test,
    allow(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::significant_drop_tightening,
        clippy::too_many_lines,
        clippy::needless_pass_by_value,
        clippy::items_after_statements
    )
)]

//! Futures Engine - Order Lifecycle & Multi-Broker Execution
//!
//! Advances planned futures trades bar-by-bar and mirrors every lifecycle
//! decision onto a simulator and any number of live brokerage accounts.
//!
//! # Architecture (Clean Architecture + DDD + Hexagonal)
//!
//! ## Layers (inside → outside)
//!
//! - **Domain**: Pure business logic, no I/O
//!   - `order`: Order aggregate, status lifecycle, events
//!   - `market`: Candles, tick rounding, minute snapping
//!   - `sizing`: Micro/standard instruments, risk-budget sizing, report snapshots
//!
//! - **Application**: Orchestration
//!   - `ports`: `BrokerPort`, the contract every backend implements
//!   - `rules`: The ordered status-transition pipeline
//!   - `lead_broker`: Fan-out coordinator and performance report
//!
//! - **Infrastructure**: Adapters
//!   - `broker`: Simulated broker, brokerage REST client, live account adapter
//!   - `config`: Dependency injection container
//!
//! Configuration loading lives in [`config`]; subscriber setup in [`telemetry`].

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::pedantic)]

// =============================================================================
// Clean Architecture Layers
// =============================================================================

/// Domain layer - Core business logic with no external dependencies.
pub mod domain;

/// Application layer - Ports, rule pipeline, fan-out.
pub mod application;

/// Infrastructure layer - Adapters and external integrations.
pub mod infrastructure;

/// Configuration loading and validation.
pub mod config;

/// Tracing subscriber setup.
pub mod telemetry;

// =============================================================================
// Re-exports
// =============================================================================

// Domain re-exports
pub use domain::market::Candle;
pub use domain::order::{
    CancelReason, EntryType, NewOrder, Order, OrderError, OrderEvent, OrderStatus, OrderType,
};
pub use domain::sizing::{ContractTier, InstrumentSpec, InstrumentTable, RiskProfile};

// Application re-exports
pub use application::{
    BrokerError, BrokerPort, LeadBroker, OrderReport, Rule, RuleAction, RulePipeline, RuleTiming,
};

// Infrastructure re-exports
pub use infrastructure::broker::brokerage::{BrokerageClient, BrokerageConfig, BrokerageError};
pub use infrastructure::broker::{LiveAccount, LiveBrokerAdapter, SimulatedBroker};
pub use infrastructure::config::Container;
