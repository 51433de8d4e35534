//! Ordered rule fold.

use tracing::{debug, info};

use super::rule::Rule;
use super::timing::RuleTiming;
use crate::application::ports::{BrokerError, BrokerPort};
use crate::domain::market::Candle;
use crate::domain::order::Order;

/// Ordered list of rules folded over an order on every candle.
///
/// Each rule sees the order as left by the rules before it, so an early
/// rule can enable a later one within the same candle.
#[derive(Debug, Clone)]
pub struct RulePipeline {
    rules: Vec<Rule>,
    timing: RuleTiming,
}

impl Default for RulePipeline {
    fn default() -> Self {
        Self::canonical(RuleTiming::default())
    }
}

impl RulePipeline {
    /// The canonical rule order.
    #[must_use]
    pub fn canonical(timing: RuleTiming) -> Self {
        Self::new(Rule::CANONICAL.to_vec(), timing)
    }

    /// A custom rule order.
    #[must_use]
    pub const fn new(rules: Vec<Rule>, timing: RuleTiming) -> Self {
        Self { rules, timing }
    }

    /// Rules in evaluation order.
    #[must_use]
    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Time limits.
    #[must_use]
    pub const fn timing(&self) -> &RuleTiming {
        &self.timing
    }

    /// Fold every rule over `order` for one candle.
    ///
    /// # Errors
    ///
    /// Stops at the first broker error.
    pub async fn run<B: BrokerPort + ?Sized>(
        &self,
        broker: &B,
        mut order: Order,
        candle: &Candle,
    ) -> Result<Order, BrokerError> {
        for rule in &self.rules {
            let Some(action) = rule.decide(&order, candle, &self.timing) else {
                continue;
            };

            let from = order.status();
            debug!(
                rule = %rule,
                action = %action,
                contract = %order.contract(),
                order_ts = %order.timestamp(),
                "Rule matched"
            );
            order = action.apply(broker, order, candle).await?;

            if order.status() != from {
                info!(
                    rule = %rule,
                    contract = %order.contract(),
                    order_ts = %order.timestamp(),
                    from = %from,
                    to = %order.status(),
                    candle_ts = %candle.timestamp,
                    "Order status changed"
                );
            }
        }
        Ok(order)
    }
}
