//! Simulated broker.
//!
//! Advances orders from candle data alone. No network, no remote state;
//! this is the reference backend the live adapters are checked against.

use async_trait::async_trait;
use tracing::info;

use crate::application::ports::{BrokerError, BrokerPort};
use crate::domain::market::Candle;
use crate::domain::order::{CancelReason, Order, OrderStatus};
use crate::domain::sizing::InstrumentTable;

/// Candle-driven broker with no external effects.
#[derive(Debug, Clone)]
pub struct SimulatedBroker {
    name: String,
    instruments: InstrumentTable,
}

impl Default for SimulatedBroker {
    fn default() -> Self {
        Self::new(InstrumentTable::default())
    }
}

impl SimulatedBroker {
    /// Create a simulator using `instruments` for tick sizes.
    #[must_use]
    pub fn new(instruments: InstrumentTable) -> Self {
        Self {
            name: "simulation".to_string(),
            instruments,
        }
    }

    /// Override the delegate name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

#[async_trait]
impl BrokerPort for SimulatedBroker {
    fn name(&self) -> &str {
        &self.name
    }

    async fn place_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        let at = candle.event_time();
        let market = order.status() == OrderStatus::PlaceNow;
        let tick_size = self.instruments.tick_size(order.contract());
        let order = order.with_tick_alignment(tick_size)?.mark_placed(at)?;

        info!(
            broker = %self.name,
            contract = %order.contract(),
            order_type = %order.order_type(),
            entry = %order.entry_point(),
            stop = %order.stop_loss(),
            target = %order.take_profit(),
            at = %at,
            "Simulated order placed"
        );

        if market {
            return self.fill_order(order, candle).await;
        }
        Ok(order)
    }

    async fn fill_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        let at = candle.event_time();
        let order = order.mark_filled(at)?;
        info!(
            broker = %self.name,
            contract = %order.contract(),
            entry = %order.entry_point(),
            at = %at,
            "Simulated order filled"
        );
        Ok(order)
    }

    async fn take_profit(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        let at = candle.event_time();
        let order = order.mark_profit(at, None)?;
        info!(
            broker = %self.name,
            contract = %order.contract(),
            target = %order.take_profit(),
            at = %at,
            "Simulated take profit"
        );
        Ok(order)
    }

    async fn take_loss(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        let at = candle.event_time();
        let order = order.mark_loss(at, None)?;
        info!(
            broker = %self.name,
            contract = %order.contract(),
            stop = %order.stop_loss(),
            at = %at,
            "Simulated stop loss"
        );
        Ok(order)
    }

    async fn exit_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        let at = candle.event_time();
        let order = order.mark_exited(at, candle.close)?;
        info!(
            broker = %self.name,
            contract = %order.contract(),
            price = %candle.close,
            outcome = %order.status(),
            at = %at,
            "Simulated exit"
        );
        Ok(order)
    }

    async fn cancel_order(
        &self,
        order: Order,
        candle: &Candle,
        reason: CancelReason,
    ) -> Result<Order, BrokerError> {
        let at = candle.event_time();
        let order = order.mark_cancelled(at, reason)?;
        info!(
            broker = %self.name,
            contract = %order.contract(),
            reason = ?order.cancel_reason(),
            at = %at,
            "Simulated cancel"
        );
        Ok(order)
    }
}
