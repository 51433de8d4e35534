//! Lead broker: fan-out coordinator.
//!
//! Replicates every broker operation across a list of delegates (one
//! simulation plus any number of live accounts). Delegates run one after
//! another so remote side effects happen in a fixed account order; the
//! caller only ever sees the first delegate's order.

use async_trait::async_trait;
use tracing::{error, instrument};

use super::ports::{BrokerError, BrokerPort};
use super::report::OrderReport;
use super::rules::{RuleAction, RulePipeline};
use crate::domain::market::Candle;
use crate::domain::order::{CancelReason, Order};
use crate::domain::sizing::RiskProfile;

/// Fan-out coordinator and owner of the rule pipeline.
pub struct LeadBroker {
    delegates: Vec<Box<dyn BrokerPort>>,
    pipeline: RulePipeline,
    risk: RiskProfile,
}

impl std::fmt::Debug for LeadBroker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LeadBroker")
            .field("delegates", &self.delegate_names())
            .field("pipeline", &self.pipeline)
            .field("risk", &self.risk)
            .finish()
    }
}

impl LeadBroker {
    /// Create a lead broker over `delegates`.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerError::NoDelegates`] if `delegates` is empty.
    pub fn new(
        delegates: Vec<Box<dyn BrokerPort>>,
        pipeline: RulePipeline,
        risk: RiskProfile,
    ) -> Result<Self, BrokerError> {
        if delegates.is_empty() {
            return Err(BrokerError::NoDelegates);
        }
        Ok(Self {
            delegates,
            pipeline,
            risk,
        })
    }

    /// Delegate names in fan-out order.
    #[must_use]
    pub fn delegate_names(&self) -> Vec<&str> {
        self.delegates.iter().map(|d| d.name()).collect()
    }

    /// The rule pipeline.
    #[must_use]
    pub const fn pipeline(&self) -> &RulePipeline {
        &self.pipeline
    }

    /// Risk profile used for reporting.
    #[must_use]
    pub const fn risk(&self) -> &RiskProfile {
        &self.risk
    }

    /// Advance `order` by one candle through the rule pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first delegate error raised by a matched rule.
    #[instrument(skip_all, fields(contract = %order.contract(), status = %order.status()))]
    pub async fn update_order_status(
        &self,
        order: Order,
        candle: &Candle,
    ) -> Result<Order, BrokerError> {
        self.pipeline.run(self, order, candle).await
    }

    /// Performance report for completed orders.
    #[must_use]
    pub fn order_report(&self, orders: &[Order]) -> OrderReport {
        OrderReport::build(orders, &self.risk)
    }

    /// Apply `action` on every delegate in order.
    ///
    /// Every delegate runs even after a failure. The first error is
    /// returned; otherwise the first delegate's order.
    async fn fan_out(
        &self,
        action: RuleAction,
        order: Order,
        candle: &Candle,
    ) -> Result<Order, BrokerError> {
        let mut lead: Option<Order> = None;
        let mut first_error: Option<BrokerError> = None;

        for delegate in &self.delegates {
            match action
                .clone()
                .apply(delegate.as_ref(), order.clone(), candle)
                .await
            {
                Ok(updated) => {
                    if lead.is_none() {
                        lead = Some(updated);
                    }
                }
                Err(err) => {
                    error!(
                        delegate = delegate.name(),
                        action = %action,
                        contract = %order.contract(),
                        order_ts = %order.timestamp(),
                        error = %err,
                        "Delegate failed"
                    );
                    if first_error.is_none() {
                        first_error = Some(BrokerError::Delegate {
                            name: delegate.name().to_string(),
                            source: Box::new(err),
                        });
                    }
                }
            }
        }

        match (first_error, lead) {
            (Some(err), _) => Err(err),
            (None, Some(order)) => Ok(order),
            (None, None) => Err(BrokerError::NoDelegates),
        }
    }
}

#[async_trait]
impl BrokerPort for LeadBroker {
    fn name(&self) -> &str {
        "lead"
    }

    async fn place_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        self.fan_out(RuleAction::Place, order, candle).await
    }

    async fn fill_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        self.fan_out(RuleAction::Fill, order, candle).await
    }

    async fn take_profit(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        self.fan_out(RuleAction::TakeProfit, order, candle).await
    }

    async fn take_loss(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        self.fan_out(RuleAction::TakeLoss, order, candle).await
    }

    async fn exit_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        self.fan_out(RuleAction::Exit, order, candle).await
    }

    async fn cancel_order(
        &self,
        order: Order,
        candle: &Candle,
        reason: CancelReason,
    ) -> Result<Order, BrokerError> {
        self.fan_out(RuleAction::Cancel(reason), order, candle)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{EntryType, NewOrder, OrderStatus, OrderType};
    use chrono::{DateTime, Duration, TimeZone, Utc};
    use rust_decimal_macros::dec;
    use std::sync::{Arc, Mutex};

    /// Stamps transitions with its own clock offset so results are
    /// distinguishable, and optionally fails every call.
    struct StubBroker {
        name: String,
        offset: Duration,
        fail: bool,
        calls: Arc<Mutex<Vec<String>>>,
    }

    impl StubBroker {
        fn boxed(
            name: &str,
            offset_minutes: i64,
            fail: bool,
            calls: &Arc<Mutex<Vec<String>>>,
        ) -> Box<dyn BrokerPort> {
            Box::new(Self {
                name: name.to_string(),
                offset: Duration::minutes(offset_minutes),
                fail,
                calls: Arc::clone(calls),
            })
        }

        fn record(&self, op: &str) -> Result<(), BrokerError> {
            self.calls
                .lock()
                .unwrap()
                .push(format!("{}:{op}", self.name));
            if self.fail {
                return Err(BrokerError::Remote {
                    source: format!("{} unavailable", self.name).into(),
                });
            }
            Ok(())
        }
    }

    #[async_trait]
    impl BrokerPort for StubBroker {
        fn name(&self) -> &str {
            &self.name
        }

        async fn place_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
            self.record("place")?;
            Ok(order.mark_placed(candle.timestamp + self.offset)?)
        }

        async fn fill_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
            self.record("fill")?;
            Ok(order.mark_filled(candle.timestamp + self.offset)?)
        }

        async fn take_profit(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
            self.record("profit")?;
            Ok(order.mark_profit(candle.timestamp + self.offset, None)?)
        }

        async fn take_loss(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
            self.record("loss")?;
            Ok(order.mark_loss(candle.timestamp + self.offset, None)?)
        }

        async fn exit_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
            self.record("exit")?;
            Ok(order.mark_exited(candle.timestamp + self.offset, candle.close)?)
        }

        async fn cancel_order(
            &self,
            order: Order,
            candle: &Candle,
            reason: CancelReason,
        ) -> Result<Order, BrokerError> {
            self.record("cancel")?;
            Ok(order.mark_cancelled(candle.timestamp + self.offset, reason)?)
        }
    }

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
    }

    fn order() -> Order {
        Order::new(NewOrder::new(
            dec!(95),
            dec!(100),
            t0(),
            OrderType::Long,
            EntryType::ZoneBounce,
            "MESM4",
        ))
        .unwrap()
    }

    fn candle() -> Candle {
        Candle::new(t0() + Duration::minutes(1), dec!(102), dec!(103), dec!(101), dec!(102))
    }

    fn lead(delegates: Vec<Box<dyn BrokerPort>>) -> LeadBroker {
        LeadBroker::new(delegates, RulePipeline::default(), RiskProfile::default()).unwrap()
    }

    #[test]
    fn rejects_empty_delegate_list() {
        let result = LeadBroker::new(vec![], RulePipeline::default(), RiskProfile::default());
        assert!(matches!(result, Err(BrokerError::NoDelegates)));
    }

    #[tokio::test]
    async fn fans_out_and_returns_first_result() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let broker = lead(vec![
            StubBroker::boxed("first", 0, false, &calls),
            StubBroker::boxed("second", 7, false, &calls),
        ]);

        let placed = broker.place_order(order(), &candle()).await.unwrap();

        assert_eq!(*calls.lock().unwrap(), ["first:place", "second:place"]);
        assert_eq!(placed.status(), OrderStatus::Placed);
        assert_eq!(placed.placed_timestamp(), Some(candle().timestamp));
    }

    #[tokio::test]
    async fn every_delegate_runs_and_first_error_wins() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let broker = lead(vec![
            StubBroker::boxed("sim", 0, false, &calls),
            StubBroker::boxed("acct-a", 0, true, &calls),
            StubBroker::boxed("acct-b", 0, true, &calls),
        ]);

        let err = broker
            .cancel_order(order(), &candle(), CancelReason::EndOfDay)
            .await
            .unwrap_err();

        assert_eq!(
            *calls.lock().unwrap(),
            ["sim:cancel", "acct-a:cancel", "acct-b:cancel"]
        );
        assert!(matches!(err, BrokerError::Delegate { ref name, .. } if name == "acct-a"));
    }

    #[tokio::test]
    async fn update_order_status_runs_pipeline_through_delegates() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let broker = lead(vec![
            StubBroker::boxed("sim", 0, false, &calls),
            StubBroker::boxed("live", 0, false, &calls),
        ]);
        // low 99 reaches the long entry at 100
        let bar = Candle::new(t0() + Duration::minutes(1), dec!(101), dec!(102), dec!(99), dec!(101));

        let updated = broker.update_order_status(order(), &bar).await.unwrap();

        assert_eq!(updated.status(), OrderStatus::Filled);
        assert_eq!(
            *calls.lock().unwrap(),
            ["sim:place", "live:place", "sim:fill", "live:fill"]
        );
    }

    #[test]
    fn reports_use_lead_risk_profile() {
        let broker = lead(vec![StubBroker::boxed(
            "sim",
            0,
            false,
            &Arc::new(Mutex::new(Vec::new())),
        )]);
        let report = broker.order_report(&[order()]);
        assert_eq!(report.orders.len(), 1);
        assert_eq!(broker.delegate_names(), ["sim"]);
    }
}
