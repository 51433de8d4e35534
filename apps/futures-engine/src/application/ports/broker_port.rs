//! Broker Port (Driven Port)
//!
//! Interface every execution backend implements. Each operation takes the
//! current order version and the candle that triggered it, and returns the
//! next order version.

use async_trait::async_trait;

use crate::domain::market::Candle;
use crate::domain::order::{CancelReason, Order, OrderError};
use crate::domain::sizing::SizingError;

/// Broker port error.
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// Operation invoked with the order in the wrong status.
    #[error(transparent)]
    InvalidTransition(#[from] OrderError),

    /// Position could not be sized.
    #[error(transparent)]
    Sizing(#[from] SizingError),

    /// Remote brokerage call failed.
    #[error("Remote broker error: {source}")]
    Remote {
        /// Underlying transport or API error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },

    /// Fan-out coordinator built without delegates.
    #[error("Lead broker requires at least one delegate")]
    NoDelegates,

    /// A fan-out delegate failed.
    #[error("Delegate '{name}' failed: {source}")]
    Delegate {
        /// Delegate name.
        name: String,
        /// Delegate error.
        source: Box<BrokerError>,
    },
}

impl BrokerError {
    /// Whether the error indicates a rule-ordering bug rather than an
    /// external failure.
    #[must_use]
    pub fn is_precondition_violation(&self) -> bool {
        match self {
            Self::InvalidTransition(_) => true,
            Self::Delegate { source, .. } => source.is_precondition_violation(),
            _ => false,
        }
    }
}

/// Port for broker interactions.
#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Name used in logs and delegate errors.
    fn name(&self) -> &str;

    /// Place the entry order. `PlaceNow` orders fill immediately.
    ///
    /// Precondition: status is `Planned` or `PlaceNow`.
    async fn place_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError>;

    /// Record the entry fill.
    ///
    /// Precondition: status is `Placed`.
    async fn fill_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError>;

    /// Close at the target.
    ///
    /// Precondition: status is `Filled`.
    async fn take_profit(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError>;

    /// Close at the stop.
    ///
    /// Precondition: status is `Filled`.
    async fn take_loss(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError>;

    /// Forced exit at the candle close.
    ///
    /// Precondition: status is `Filled`.
    async fn exit_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError>;

    /// Cancel with a reason.
    ///
    /// Precondition: status is not terminal.
    async fn cancel_order(
        &self,
        order: Order,
        candle: &Candle,
        reason: CancelReason,
    ) -> Result<Order, BrokerError>;
}
