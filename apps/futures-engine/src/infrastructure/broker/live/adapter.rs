//! Live brokerage adapter implementing `BrokerPort`.
//!
//! Submits bracket orders for one account and reconciles the remote
//! bracket back into the local order on every later call. The remote
//! state is authoritative: a local target touch only becomes Profit once
//! the take-profit child reports a fill.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::application::ports::{BrokerError, BrokerPort};
use crate::domain::market::Candle;
use crate::domain::order::{CancelReason, Order, OrderStateMachine, OrderStatus};
use crate::domain::sizing::{PositionSize, RiskProfile};
use crate::infrastructure::broker::SimulatedBroker;
use crate::infrastructure::broker::brokerage::api_types::{
    BracketChild, BracketOrderRequest, CashBalance, OrderAction, RemoteOrder, RemoteOrderStatus,
    RemoteOrderType,
};
use crate::infrastructure::broker::brokerage::{BracketIds, BrokerageClient, BrokerageError};

use super::shadow::ShadowBook;

/// A brokerage account traded by one adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiveAccount {
    /// Account name; also the `account_id` tag orders use to target it.
    pub name: String,
    /// Numeric account id.
    pub account_id: i64,
    /// Dollar risk per trade for this account.
    pub risk_per_trade: Decimal,
}

/// Broker adapter for one live account.
#[derive(Debug)]
pub struct LiveBrokerAdapter {
    account: LiveAccount,
    client: Arc<BrokerageClient>,
    risk: RiskProfile,
    shadow: ShadowBook,
    mirror: SimulatedBroker,
}

impl LiveBrokerAdapter {
    /// Create an adapter. `risk` supplies the cutoff and instrument table;
    /// the account's own risk budget replaces its `risk_per_trade`.
    #[must_use]
    pub fn new(account: LiveAccount, client: Arc<BrokerageClient>, risk: RiskProfile) -> Self {
        let risk = risk.with_risk_per_trade(account.risk_per_trade);
        let mirror = SimulatedBroker::new(risk.instruments.clone()).with_name(&account.name);
        Self {
            account,
            client,
            risk,
            shadow: ShadowBook::new(),
            mirror,
        }
    }

    /// The traded account.
    #[must_use]
    pub const fn account(&self) -> &LiveAccount {
        &self.account
    }

    /// Number of orders with a remote bracket still tracked.
    #[must_use]
    pub fn tracked_orders(&self) -> usize {
        self.shadow.len()
    }

    /// Cash balances for this account.
    ///
    /// # Errors
    ///
    /// Propagates brokerage errors.
    pub async fn cash_balances(&self) -> Result<Vec<CashBalance>, BrokerageError> {
        let balances = self.client.cash_balances().await?;
        Ok(balances
            .into_iter()
            .filter(|b| b.account_id == self.account.account_id)
            .collect())
    }

    /// Orders tagged for another account are mirrored without remote calls.
    fn owns(&self, order: &Order) -> bool {
        order
            .account_id()
            .is_none_or(|id| id == self.account.name)
    }

    fn bracket_request(
        &self,
        order: &Order,
        position: &PositionSize,
        market: bool,
    ) -> BracketOrderRequest {
        let action = if order.order_type().is_long() {
            OrderAction::Buy
        } else {
            OrderAction::Sell
        };

        BracketOrderRequest {
            account_spec: self.account.name.clone(),
            account_id: self.account.account_id,
            action,
            symbol: position.symbol.clone(),
            order_qty: position.contracts,
            order_type: if market {
                RemoteOrderType::Market
            } else {
                RemoteOrderType::Limit
            },
            price: (!market).then(|| order.entry_point()),
            is_automated: true,
            take_profit: BracketChild {
                action: action.opposite(),
                order_type: RemoteOrderType::Limit,
                price: Some(order.take_profit()),
                stop_price: None,
            },
            stop_loss: BracketChild {
                action: action.opposite(),
                order_type: RemoteOrderType::Stop,
                price: None,
                stop_price: Some(order.stop_loss()),
            },
        }
    }

    /// The exit child that filled, if any. Profit child is checked first.
    async fn filled_child(
        &self,
        ids: &BracketIds,
    ) -> Result<Option<(OrderStatus, RemoteOrder)>, BrokerError> {
        let profit = self.client.order_status(ids.profit).await?;
        if profit.status == RemoteOrderStatus::Filled {
            return Ok(Some((OrderStatus::Profit, profit)));
        }
        let stop = self.client.order_status(ids.stop).await?;
        if stop.status == RemoteOrderStatus::Filled {
            return Ok(Some((OrderStatus::Loss, stop)));
        }
        Ok(None)
    }

    /// Flatten the remote side of a bracket.
    ///
    /// Filled entry: liquidate the position and cancel any child still
    /// working. Working or unrecognised entry: cancel it. Dead entry:
    /// nothing to do.
    async fn cancel_or_liquidate(
        &self,
        ids: &BracketIds,
        main: &RemoteOrder,
    ) -> Result<(), BrokerError> {
        match main.status {
            RemoteOrderStatus::Filled => {
                warn!(
                    account = %self.account.name,
                    instrument_id = main.instrument_id,
                    main = ids.main,
                    "Liquidating LIVE position"
                );
                self.client
                    .liquidate_position(self.account.account_id, main.instrument_id)
                    .await?;
                for child in [ids.profit, ids.stop] {
                    let remote = self.client.order_status(child).await?;
                    if remote.status.is_working() {
                        self.client.cancel_order(child).await?;
                    }
                }
            }
            RemoteOrderStatus::Unknown => {
                error!(
                    account = %self.account.name,
                    main = ids.main,
                    "Remote entry in unrecognised state, cancelling anyway"
                );
                if let Err(err) = self.client.cancel_order(ids.main).await {
                    error!(
                        account = %self.account.name,
                        main = ids.main,
                        error = %err,
                        "Cancel of unrecognised remote entry failed"
                    );
                }
            }
            status if status.is_working() => {
                info!(
                    account = %self.account.name,
                    main = ids.main,
                    "Cancelling working LIVE entry"
                );
                self.client.cancel_order(ids.main).await?;
            }
            status => {
                debug!(
                    account = %self.account.name,
                    main = ids.main,
                    status = ?status,
                    "Remote entry already inactive"
                );
            }
        }
        Ok(())
    }

    fn record_close(
        &self,
        order: Order,
        outcome: OrderStatus,
        child: &RemoteOrder,
        at: DateTime<Utc>,
    ) -> Result<Order, BrokerError> {
        let closed = child.fill_timestamp.unwrap_or(at);
        self.shadow.remove(order.timestamp());
        let order = if outcome == OrderStatus::Profit {
            order.mark_profit(closed, child.avg_fill_price)?
        } else {
            order.mark_loss(closed, child.avg_fill_price)?
        };
        info!(
            account = %self.account.name,
            contract = %order.contract(),
            outcome = %order.status(),
            price = ?child.avg_fill_price,
            at = %closed,
            "LIVE position closed"
        );
        Ok(order)
    }

    fn record_cancel(
        &self,
        order: Order,
        at: DateTime<Utc>,
        reason: CancelReason,
    ) -> Result<Order, BrokerError> {
        self.shadow.remove(order.timestamp());
        let order = order.mark_cancelled(at, reason)?;
        info!(
            account = %self.account.name,
            contract = %order.contract(),
            reason = ?order.cancel_reason(),
            at = %at,
            "LIVE order cancelled"
        );
        Ok(order)
    }

    /// Shared path for `take_profit` and `take_loss`.
    async fn reconcile_close(
        &self,
        order: Order,
        candle: &Candle,
        intended: OrderStatus,
    ) -> Result<Order, BrokerError> {
        OrderStateMachine::validate_transition(order.status(), intended)?;
        let at = candle.event_time();

        let Some(ids) = self.shadow.get(order.timestamp()) else {
            debug!(
                account = %self.account.name,
                contract = %order.contract(),
                "No remote bracket tracked, closing locally"
            );
            return Ok(if intended == OrderStatus::Profit {
                order.mark_profit(at, None)?
            } else {
                order.mark_loss(at, None)?
            });
        };

        let main = self.client.order_status(ids.main).await?;
        if main.status.is_dead() {
            return self.record_cancel(order, at, CancelReason::RemoteCancelled);
        }
        if main.status != RemoteOrderStatus::Filled {
            warn!(
                account = %self.account.name,
                contract = %order.contract(),
                main = ids.main,
                status = ?main.status,
                expected = %intended,
                "Exit reached before remote entry filled, withdrawing bracket"
            );
            self.cancel_or_liquidate(&ids, &main).await?;
            let detail = format!(
                "exit reached while entry {} was {:?}",
                ids.main, main.status
            );
            return self.record_cancel(order, at, CancelReason::RemoteAnomaly(detail));
        }

        if let Some((outcome, child)) = self.filled_child(&ids).await? {
            return self.record_close(order, outcome, &child, at);
        }

        let detail = format!(
            "entry {} filled but neither exit {} nor {} filled",
            ids.main, ids.profit, ids.stop
        );
        error!(
            account = %self.account.name,
            contract = %order.contract(),
            main = ids.main,
            profit = ids.profit,
            stop = ids.stop,
            expected = %intended,
            "Remote bracket anomaly, flattening"
        );
        self.cancel_or_liquidate(&ids, &main).await?;
        self.record_cancel(order, at, CancelReason::RemoteAnomaly(detail))
    }
}

#[async_trait]
impl BrokerPort for LiveBrokerAdapter {
    fn name(&self) -> &str {
        &self.account.name
    }

    async fn place_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        if !self.owns(&order) {
            return self.mirror.place_order(order, candle).await;
        }
        OrderStateMachine::validate_transition(order.status(), OrderStatus::Placed)?;

        let at = candle.event_time();
        let market = order.status() == OrderStatus::PlaceNow;
        let tick_size = self.risk.instruments.tick_size(order.contract());
        let order = order.with_tick_alignment(tick_size)?;

        if let Some(ids) = self.shadow.get(order.timestamp()) {
            info!(
                account = %self.account.name,
                contract = %order.contract(),
                main = ids.main,
                "Bracket already submitted, not resubmitting"
            );
            let order = order.mark_placed(at)?;
            if market {
                return self.fill_order(order, candle).await;
            }
            return Ok(order);
        }

        let position = self.risk.size(&order)?;

        if position.is_empty() {
            warn!(
                account = %self.account.name,
                contract = %order.contract(),
                budget = %self.risk.budget_for(&order),
                at_risk_points = %order.at_risk_points(),
                "Risk budget below one contract, not submitting"
            );
            return Ok(order.mark_cancelled(at, CancelReason::ZeroContracts)?);
        }

        let request = self.bracket_request(&order, &position, market);
        warn!(
            account = %self.account.name,
            symbol = %request.symbol,
            side = ?request.action,
            contracts = request.order_qty,
            entry = ?request.price,
            stop = %order.stop_loss(),
            target = %order.take_profit(),
            "Submitting LIVE bracket order - this will execute real trades"
        );

        let ids = self.client.place_bracket(&request).await?;
        self.shadow.insert(order.timestamp(), ids);
        let order = order.mark_placed(at)?;

        info!(
            account = %self.account.name,
            main = ids.main,
            profit = ids.profit,
            stop = ids.stop,
            "LIVE order submitted"
        );

        if market {
            return self.fill_order(order, candle).await;
        }
        Ok(order)
    }

    async fn fill_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        if !self.owns(&order) {
            return self.mirror.fill_order(order, candle).await;
        }
        OrderStateMachine::validate_transition(order.status(), OrderStatus::Filled)?;
        let at = candle.event_time();

        let Some(ids) = self.shadow.get(order.timestamp()) else {
            return Ok(order.mark_filled(at)?);
        };

        let main = self.client.order_status(ids.main).await?;
        if main.status.is_dead() {
            return self.record_cancel(order, at, CancelReason::RemoteCancelled);
        }

        let filled_at = if main.status == RemoteOrderStatus::Filled {
            main.fill_timestamp.unwrap_or(at)
        } else {
            at
        };
        let order = order.mark_filled(filled_at)?;
        info!(
            account = %self.account.name,
            contract = %order.contract(),
            remote_status = ?main.status,
            price = ?main.avg_fill_price,
            at = %filled_at,
            "LIVE order filled"
        );
        Ok(order)
    }

    async fn take_profit(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        if !self.owns(&order) {
            return self.mirror.take_profit(order, candle).await;
        }
        self.reconcile_close(order, candle, OrderStatus::Profit).await
    }

    async fn take_loss(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        if !self.owns(&order) {
            return self.mirror.take_loss(order, candle).await;
        }
        self.reconcile_close(order, candle, OrderStatus::Loss).await
    }

    async fn exit_order(&self, order: Order, candle: &Candle) -> Result<Order, BrokerError> {
        if !self.owns(&order) {
            return self.mirror.exit_order(order, candle).await;
        }
        OrderStateMachine::validate_transition(order.status(), OrderStatus::Loss)?;
        let at = candle.event_time();

        if let Some(ids) = self.shadow.get(order.timestamp()) {
            let main = self.client.order_status(ids.main).await?;
            if main.status == RemoteOrderStatus::Filled {
                if let Some((outcome, child)) = self.filled_child(&ids).await? {
                    return self.record_close(order, outcome, &child, at);
                }
            }
            self.cancel_or_liquidate(&ids, &main).await?;
            self.shadow.remove(order.timestamp());
        }

        let order = order.mark_exited(at, candle.close)?;
        warn!(
            account = %self.account.name,
            contract = %order.contract(),
            price = %candle.close,
            outcome = %order.status(),
            at = %at,
            "LIVE position exited"
        );
        Ok(order)
    }

    async fn cancel_order(
        &self,
        order: Order,
        candle: &Candle,
        reason: CancelReason,
    ) -> Result<Order, BrokerError> {
        if !self.owns(&order) {
            return self.mirror.cancel_order(order, candle, reason).await;
        }
        OrderStateMachine::validate_transition(order.status(), OrderStatus::Cancelled)?;
        let at = candle.event_time();

        if let Some(ids) = self.shadow.get(order.timestamp()) {
            let main = self.client.order_status(ids.main).await?;
            self.cancel_or_liquidate(&ids, &main).await?;
        }
        self.record_cancel(order, at, reason)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::order::{EntryType, NewOrder, OrderType};
    use crate::infrastructure::broker::brokerage::{BrokerageConfig, Credentials, RetryPolicy};
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;
    use serde_json::json;
    use wiremock::matchers::{body_json, body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap()
    }

    fn credentials() -> Credentials {
        Credentials {
            username: "trader".to_string(),
            password: "hunter2".to_string(),
            app_id: "futures-engine".to_string(),
            app_version: "1.0".to_string(),
            client_id: "42".to_string(),
            client_secret: "s3cret".to_string(),
            device_id: "device-1".to_string(),
        }
    }

    async fn setup(risk_per_trade: Decimal) -> (MockServer, LiveBrokerAdapter) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/auth/token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "tok",
                "expiresAt": "2099-01-01T00:00:00Z"
            })))
            .mount(&server)
            .await;

        let config = BrokerageConfig::new(server.uri(), credentials()).with_retry(RetryPolicy {
            max_retries: 1,
            initial_delay: std::time::Duration::from_millis(1),
        });
        let client = Arc::new(BrokerageClient::new(&config).unwrap());
        let account = LiveAccount {
            name: "DEMO1".to_string(),
            account_id: 1001,
            risk_per_trade,
        };
        let adapter = LiveBrokerAdapter::new(account, client, RiskProfile::default());
        (server, adapter)
    }

    async fn mount_status(
        server: &MockServer,
        id: i64,
        status: &str,
        fill: Option<(Decimal, DateTime<Utc>)>,
    ) {
        Mock::given(method("GET"))
            .and(path("/order/status"))
            .and(query_param("id", id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": id,
                "accountId": 1001,
                "contractId": 555,
                "timestamp": "2024-03-04T14:30:00Z",
                "action": "Buy",
                "ordStatus": status
            })))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path("/order/versions"))
            .and(query_param("orderId", id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "id": 1, "orderId": id, "orderQty": 2, "orderType": "Limit", "price": 5004.5 }
            ])))
            .mount(server)
            .await;
        let fills = fill.map_or_else(
            || json!([]),
            |(price, at)| {
                json!([{
                    "id": 90,
                    "orderId": id,
                    "timestamp": at.to_rfc3339(),
                    "qty": 2,
                    "price": price.to_string().parse::<f64>().unwrap()
                }])
            },
        );
        Mock::given(method("GET"))
            .and(path("/fill/list"))
            .and(query_param("orderId", id.to_string()))
            .respond_with(ResponseTemplate::new(200).set_body_json(fills))
            .mount(server)
            .await;
    }

    async fn mount_cancel(server: &MockServer, id: i64, times: u64) {
        Mock::given(method("POST"))
            .and(path("/order/cancel"))
            .and(body_json(json!({ "orderId": id })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commandId": 1 })))
            .expect(times)
            .mount(server)
            .await;
    }

    fn order() -> Order {
        Order::new(NewOrder::new(
            dec!(5000),
            dec!(5004.5),
            t0(),
            OrderType::Long,
            EntryType::ZoneBounce,
            "MESM4",
        ))
        .unwrap()
    }

    fn filled_order() -> Order {
        order()
            .mark_placed(t0())
            .unwrap()
            .mark_filled(t0() + Duration::minutes(1))
            .unwrap()
    }

    fn candle(minutes: i64) -> Candle {
        Candle::new(
            t0() + Duration::minutes(minutes),
            dec!(5010),
            dec!(5014),
            dec!(5009),
            dec!(5012),
        )
    }

    fn ids() -> BracketIds {
        BracketIds {
            main: 7,
            profit: 8,
            stop: 9,
        }
    }

    #[tokio::test]
    async fn place_submits_sized_bracket() {
        let (server, adapter) = setup(dec!(550)).await;
        // 4.5 points at $5 per micro = $22.50; 550 / 22.5 = 24 micros -> 2 ES.
        Mock::given(method("POST"))
            .and(path("/order/placeBracket"))
            .and(body_partial_json(json!({
                "accountSpec": "DEMO1",
                "accountId": 1001,
                "action": "Buy",
                "symbol": "ESM4",
                "orderQty": 2,
                "orderType": "Limit",
                "takeProfit": { "action": "Sell", "orderType": "Limit" },
                "stopLoss": { "action": "Sell", "orderType": "Stop" }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "mainOrderId": 7,
                "profitChildId": 8,
                "stopChildId": 9
            })))
            .expect(1)
            .mount(&server)
            .await;

        let placed = adapter.place_order(order(), &candle(1)).await.unwrap();

        assert_eq!(placed.status(), OrderStatus::Placed);
        assert_eq!(adapter.shadow.get(t0()), Some(ids()));
        assert_eq!(adapter.tracked_orders(), 1);
    }

    #[tokio::test]
    async fn place_below_one_contract_cancels_without_remote_call() {
        let (server, adapter) = setup(dec!(10)).await;
        Mock::given(method("POST"))
            .and(path("/order/placeBracket"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let result = adapter.place_order(order(), &candle(1)).await.unwrap();

        assert_eq!(result.status(), OrderStatus::Cancelled);
        assert_eq!(result.cancel_reason(), Some(&CancelReason::ZeroContracts));
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn rejected_bracket_is_remote_error() {
        let (server, adapter) = setup(dec!(550)).await;
        Mock::given(method("POST"))
            .and(path("/order/placeBracket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "failureReason": "RiskCheck",
                "failureText": "Exceeds margin"
            })))
            .mount(&server)
            .await;

        let err = adapter.place_order(order(), &candle(1)).await.unwrap_err();

        assert!(matches!(err, BrokerError::Remote { .. }));
        assert!(err.to_string().contains("Exceeds margin"));
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn foreign_account_orders_are_mirrored_locally() {
        let (server, adapter) = setup(dec!(550)).await;
        let foreign = Order::new(
            NewOrder::new(
                dec!(5000),
                dec!(5004.5),
                t0(),
                OrderType::Long,
                EntryType::ZoneBounce,
                "MESM4",
            )
            .with_account_id("OTHER"),
        )
        .unwrap();

        let placed = adapter.place_order(foreign, &candle(1)).await.unwrap();

        assert_eq!(placed.status(), OrderStatus::Placed);
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn fill_uses_remote_fill_time() {
        let (server, adapter) = setup(dec!(550)).await;
        let fill_time = t0() + Duration::seconds(95);
        mount_status(&server, 7, "Filled", Some((dec!(5004.5), fill_time))).await;
        adapter.shadow.insert(t0(), ids());
        let placed = order().mark_placed(t0()).unwrap();

        let filled = adapter.fill_order(placed, &candle(2)).await.unwrap();

        assert_eq!(filled.status(), OrderStatus::Filled);
        assert_eq!(filled.filled_timestamp(), Some(fill_time));
    }

    #[tokio::test]
    async fn fill_on_dead_remote_entry_cancels() {
        let (server, adapter) = setup(dec!(550)).await;
        mount_status(&server, 7, "Rejected", None).await;
        adapter.shadow.insert(t0(), ids());
        let placed = order().mark_placed(t0()).unwrap();

        let result = adapter.fill_order(placed, &candle(2)).await.unwrap();

        assert_eq!(result.status(), OrderStatus::Cancelled);
        assert_eq!(result.cancel_reason(), Some(&CancelReason::RemoteCancelled));
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn take_profit_records_child_fill() {
        let (server, adapter) = setup(dec!(550)).await;
        let close_time = t0() + Duration::minutes(10);
        mount_status(&server, 7, "Filled", Some((dec!(5004.5), t0()))).await;
        mount_status(&server, 8, "Filled", Some((dec!(5013.75), close_time))).await;
        adapter.shadow.insert(t0(), ids());

        let closed = adapter
            .take_profit(filled_order(), &candle(10))
            .await
            .unwrap();

        assert_eq!(closed.status(), OrderStatus::Profit);
        assert_eq!(closed.closed_at(), Some(dec!(5013.75)));
        assert_eq!(closed.close_timestamp(), Some(close_time));
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn take_profit_reports_stop_fill_as_loss() {
        let (server, adapter) = setup(dec!(550)).await;
        mount_status(&server, 7, "Filled", Some((dec!(5004.5), t0()))).await;
        mount_status(&server, 8, "Canceled", None).await;
        mount_status(&server, 9, "Filled", Some((dec!(5000), t0()))).await;
        adapter.shadow.insert(t0(), ids());

        let closed = adapter
            .take_profit(filled_order(), &candle(10))
            .await
            .unwrap();

        assert_eq!(closed.status(), OrderStatus::Loss);
        assert_eq!(closed.closed_at(), None);
    }

    #[tokio::test]
    async fn take_profit_with_working_entry_withdraws_bracket() {
        let (server, adapter) = setup(dec!(550)).await;
        mount_status(&server, 7, "Working", None).await;
        mount_cancel(&server, 7, 1).await;
        adapter.shadow.insert(t0(), ids());

        let result = adapter
            .take_profit(filled_order(), &candle(10))
            .await
            .unwrap();

        assert_eq!(result.status(), OrderStatus::Cancelled);
        assert!(matches!(
            result.cancel_reason(),
            Some(CancelReason::RemoteAnomaly(_))
        ));
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn repeated_placement_reuses_tracked_bracket() {
        let (server, adapter) = setup(dec!(550)).await;
        Mock::given(method("POST"))
            .and(path("/order/placeBracket"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "mainOrderId": 7,
                "profitChildId": 8,
                "stopChildId": 9
            })))
            .expect(1)
            .mount(&server)
            .await;

        adapter.place_order(order(), &candle(1)).await.unwrap();
        let again = adapter.place_order(order(), &candle(2)).await.unwrap();

        assert_eq!(again.status(), OrderStatus::Placed);
        assert_eq!(adapter.shadow.get(t0()), Some(ids()));
        assert_eq!(adapter.tracked_orders(), 1);
    }

    #[tokio::test]
    async fn cancel_unrecognised_entry_still_sends_cancel() {
        let (server, adapter) = setup(dec!(550)).await;
        mount_status(&server, 7, "Suspended", None).await;
        mount_cancel(&server, 7, 1).await;
        adapter.shadow.insert(t0(), ids());
        let placed = order().mark_placed(t0()).unwrap();

        let cancelled = adapter
            .cancel_order(placed, &candle(11), CancelReason::UnfilledTimeout)
            .await
            .unwrap();

        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn anomaly_liquidates_and_cancels_working_children() {
        let (server, adapter) = setup(dec!(550)).await;
        mount_status(&server, 7, "Filled", Some((dec!(5004.5), t0()))).await;
        mount_status(&server, 8, "Working", None).await;
        mount_status(&server, 9, "Working", None).await;
        Mock::given(method("POST"))
            .and(path("/order/liquidatePosition"))
            .and(body_json(json!({ "accountId": 1001, "instrumentId": 555 })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commandId": 3 })))
            .expect(1)
            .mount(&server)
            .await;
        mount_cancel(&server, 8, 1).await;
        mount_cancel(&server, 9, 1).await;
        adapter.shadow.insert(t0(), ids());

        let result = adapter
            .take_profit(filled_order(), &candle(10))
            .await
            .unwrap();

        assert_eq!(result.status(), OrderStatus::Cancelled);
        assert!(matches!(
            result.cancel_reason(),
            Some(CancelReason::RemoteAnomaly(_))
        ));
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn cancel_working_entry_cancels_remote_main() {
        let (server, adapter) = setup(dec!(550)).await;
        mount_status(&server, 7, "Working", None).await;
        mount_cancel(&server, 7, 1).await;
        adapter.shadow.insert(t0(), ids());
        let placed = order().mark_placed(t0()).unwrap();

        let cancelled = adapter
            .cancel_order(placed, &candle(11), CancelReason::UnfilledTimeout)
            .await
            .unwrap();

        assert_eq!(cancelled.status(), OrderStatus::Cancelled);
        assert_eq!(
            cancelled.cancel_reason(),
            Some(&CancelReason::UnfilledTimeout)
        );
    }

    #[tokio::test]
    async fn cancel_terminal_order_makes_no_remote_calls() {
        let (server, adapter) = setup(dec!(550)).await;
        adapter.shadow.insert(t0(), ids());
        let closed = filled_order().mark_profit(t0(), None).unwrap();

        let err = adapter
            .cancel_order(closed, &candle(11), CancelReason::EndOfDay)
            .await
            .unwrap_err();

        assert!(err.is_precondition_violation());
        assert!(server.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn exit_without_child_fill_liquidates_at_close() {
        let (server, adapter) = setup(dec!(550)).await;
        mount_status(&server, 7, "Filled", Some((dec!(5004.5), t0()))).await;
        mount_status(&server, 8, "Working", None).await;
        mount_status(&server, 9, "Working", None).await;
        Mock::given(method("POST"))
            .and(path("/order/liquidatePosition"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "commandId": 4 })))
            .expect(1)
            .mount(&server)
            .await;
        mount_cancel(&server, 8, 1).await;
        mount_cancel(&server, 9, 1).await;
        adapter.shadow.insert(t0(), ids());

        let exited = adapter
            .exit_order(filled_order(), &candle(25))
            .await
            .unwrap();

        assert_eq!(exited.status(), OrderStatus::Profit);
        assert_eq!(exited.closed_at(), Some(dec!(5012)));
        assert_eq!(adapter.tracked_orders(), 0);
    }

    #[tokio::test]
    async fn cash_balances_filter_to_account() {
        let (server, adapter) = setup(dec!(550)).await;
        Mock::given(method("GET"))
            .and(path("/cashBalance/list"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                { "accountId": 1001, "tradeDate": "2024-03-04", "currency": "USD", "amount": 50000.0 },
                { "accountId": 2002, "tradeDate": "2024-03-04", "currency": "USD", "amount": 12000.0 }
            ])))
            .mount(&server)
            .await;

        let balances = adapter.cash_balances().await.unwrap();

        assert_eq!(balances.len(), 1);
        assert_eq!(balances[0].amount, dec!(50000));
    }
}
