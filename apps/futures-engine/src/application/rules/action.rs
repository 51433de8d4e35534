//! Broker calls a rule can request.

use std::fmt;

use crate::application::ports::{BrokerError, BrokerPort};
use crate::domain::market::Candle;
use crate::domain::order::{CancelReason, Order};

/// A broker-contract call selected by a rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuleAction {
    /// `place_order`.
    Place,
    /// `fill_order`.
    Fill,
    /// `take_profit`.
    TakeProfit,
    /// `take_loss`.
    TakeLoss,
    /// `exit_order` at the candle close.
    Exit,
    /// `cancel_order` with a reason.
    Cancel(CancelReason),
}

impl RuleAction {
    /// Invoke the matching broker operation.
    ///
    /// # Errors
    ///
    /// Propagates the broker's error.
    pub async fn apply<B: BrokerPort + ?Sized>(
        self,
        broker: &B,
        order: Order,
        candle: &Candle,
    ) -> Result<Order, BrokerError> {
        match self {
            Self::Place => broker.place_order(order, candle).await,
            Self::Fill => broker.fill_order(order, candle).await,
            Self::TakeProfit => broker.take_profit(order, candle).await,
            Self::TakeLoss => broker.take_loss(order, candle).await,
            Self::Exit => broker.exit_order(order, candle).await,
            Self::Cancel(reason) => broker.cancel_order(order, candle, reason).await,
        }
    }
}

impl fmt::Display for RuleAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Place => write!(f, "place"),
            Self::Fill => write!(f, "fill"),
            Self::TakeProfit => write!(f, "take_profit"),
            Self::TakeLoss => write!(f, "take_loss"),
            Self::Exit => write!(f, "exit"),
            Self::Cancel(reason) => write!(f, "cancel({})", reason.code()),
        }
    }
}
