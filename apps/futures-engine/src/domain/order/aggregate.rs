//! Order Aggregate
//!
//! One planned trade: an entry zone `[low, high]`, a direction and a
//! strategy tag. Entry, stop and target prices are derived from the zone.
//! Every transition consumes the order and returns the next version, so a
//! caller can never observe a half-applied change.

use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::errors::OrderError;
use super::events::{OrderCancelled, OrderClosed, OrderEvent, OrderFilled, OrderPlaced};
use super::state_machine::OrderStateMachine;
use super::value_objects::{CancelReason, EntryType, OrderStatus, OrderType};
use crate::domain::market::round_to_tick;

/// Default risk multiple for the take-profit distance.
pub const DEFAULT_PROFIT_MULTIPLIER: Decimal = dec!(2);

/// Lower clamp applied to `realized_r`.
const MIN_REALIZED_R: Decimal = dec!(-1.2);

/// Headroom above the profit multiplier allowed in `realized_r`.
const REALIZED_R_HEADROOM: Decimal = dec!(0.2);

/// Command to plan a new order.
#[derive(Debug, Clone)]
pub struct NewOrder {
    /// Lower bound of the entry zone.
    pub low: Decimal,
    /// Upper bound of the entry zone.
    pub high: Decimal,
    /// Decision time.
    pub timestamp: DateTime<Utc>,
    /// Direction.
    pub order_type: OrderType,
    /// Strategy tag.
    pub entry_type: EntryType,
    /// Instrument symbol.
    pub contract: String,
    /// Enter at market instead of resting at the zone edge.
    pub place_now: bool,
    /// Risk multiple for the target distance.
    pub profit_multiplier: Decimal,
    /// Absolute take-profit override.
    pub profit_cap: Option<Decimal>,
    /// Owning account tag.
    pub account_id: Option<String>,
    /// Scaling applied to the account's risk budget.
    pub risk_multiplier: Option<Decimal>,
}

impl NewOrder {
    /// Plan a resting order with default multipliers.
    #[must_use]
    pub fn new(
        low: Decimal,
        high: Decimal,
        timestamp: DateTime<Utc>,
        order_type: OrderType,
        entry_type: EntryType,
        contract: impl Into<String>,
    ) -> Self {
        Self {
            low,
            high,
            timestamp,
            order_type,
            entry_type,
            contract: contract.into(),
            place_now: false,
            profit_multiplier: DEFAULT_PROFIT_MULTIPLIER,
            profit_cap: None,
            account_id: None,
            risk_multiplier: None,
        }
    }

    /// Enter at market on the next candle.
    #[must_use]
    pub const fn at_market(mut self) -> Self {
        self.place_now = true;
        self
    }

    /// Set the profit multiplier.
    #[must_use]
    pub const fn with_profit_multiplier(mut self, multiplier: Decimal) -> Self {
        self.profit_multiplier = multiplier;
        self
    }

    /// Override the take-profit price.
    #[must_use]
    pub const fn with_profit_cap(mut self, cap: Decimal) -> Self {
        self.profit_cap = Some(cap);
        self
    }

    /// Tag the order with its owning account.
    #[must_use]
    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    /// Scale the account's risk budget for this order.
    #[must_use]
    pub const fn with_risk_multiplier(mut self, multiplier: Decimal) -> Self {
        self.risk_multiplier = Some(multiplier);
        self
    }

    /// Validate the command parameters.
    ///
    /// # Errors
    ///
    /// Returns error if the zone is empty or inverted, a multiplier is not
    /// positive, or the contract symbol is blank.
    pub fn validate(&self) -> Result<(), OrderError> {
        if self.high <= self.low {
            return Err(OrderError::InvalidBounds {
                low: self.low,
                high: self.high,
            });
        }

        if self.profit_multiplier <= Decimal::ZERO {
            return Err(OrderError::InvalidParameters {
                field: "profit_multiplier".to_string(),
                message: format!("must be positive, got {}", self.profit_multiplier),
            });
        }

        if let Some(multiplier) = self.risk_multiplier {
            if multiplier <= Decimal::ZERO {
                return Err(OrderError::InvalidParameters {
                    field: "risk_multiplier".to_string(),
                    message: format!("must be positive, got {multiplier}"),
                });
            }
        }

        if self.contract.trim().is_empty() {
            return Err(OrderError::InvalidParameters {
                field: "contract".to_string(),
                message: "Contract symbol cannot be empty".to_string(),
            });
        }

        Ok(())
    }
}

/// Order Aggregate Root.
#[allow(clippy::struct_field_names)]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    low: Decimal,
    high: Decimal,
    timestamp: DateTime<Utc>,
    order_type: OrderType,
    entry_type: EntryType,
    contract: String,
    status: OrderStatus,
    profit_multiplier: Decimal,
    profit_cap: Option<Decimal>,
    placed_timestamp: Option<DateTime<Utc>>,
    filled_timestamp: Option<DateTime<Utc>>,
    close_timestamp: Option<DateTime<Utc>>,
    cancel_reason: Option<CancelReason>,
    account_id: Option<String>,
    closed_at: Option<Decimal>,
    risk_multiplier: Option<Decimal>,
    #[serde(skip)]
    events: Vec<OrderEvent>,
}

impl Order {
    /// Create a new order from a command.
    ///
    /// The order starts `Planned`, or `PlaceNow` for market entries.
    ///
    /// # Errors
    ///
    /// Returns error if command validation fails.
    pub fn new(cmd: NewOrder) -> Result<Self, OrderError> {
        cmd.validate()?;

        Ok(Self {
            low: cmd.low,
            high: cmd.high,
            timestamp: cmd.timestamp,
            order_type: cmd.order_type,
            entry_type: cmd.entry_type,
            contract: cmd.contract,
            status: if cmd.place_now {
                OrderStatus::PlaceNow
            } else {
                OrderStatus::Planned
            },
            profit_multiplier: cmd.profit_multiplier,
            profit_cap: cmd.profit_cap,
            placed_timestamp: None,
            filled_timestamp: None,
            close_timestamp: None,
            cancel_reason: None,
            account_id: cmd.account_id,
            closed_at: None,
            risk_multiplier: cmd.risk_multiplier,
            events: Vec::new(),
        })
    }

    // ========================================================================
    // Getters
    // ========================================================================

    /// Lower bound of the entry zone.
    #[must_use]
    pub const fn low(&self) -> Decimal {
        self.low
    }

    /// Upper bound of the entry zone.
    #[must_use]
    pub const fn high(&self) -> Decimal {
        self.high
    }

    /// Decision time. Also the order's identity across brokers.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Direction.
    #[must_use]
    pub const fn order_type(&self) -> OrderType {
        self.order_type
    }

    /// Strategy tag.
    #[must_use]
    pub const fn entry_type(&self) -> &EntryType {
        &self.entry_type
    }

    /// Instrument symbol.
    #[must_use]
    pub fn contract(&self) -> &str {
        &self.contract
    }

    /// Current status.
    #[must_use]
    pub const fn status(&self) -> OrderStatus {
        self.status
    }

    /// Risk multiple for the target distance.
    #[must_use]
    pub const fn profit_multiplier(&self) -> Decimal {
        self.profit_multiplier
    }

    /// Take-profit override.
    #[must_use]
    pub const fn profit_cap(&self) -> Option<Decimal> {
        self.profit_cap
    }

    /// When the entry order was placed.
    #[must_use]
    pub const fn placed_timestamp(&self) -> Option<DateTime<Utc>> {
        self.placed_timestamp
    }

    /// When the entry filled.
    #[must_use]
    pub const fn filled_timestamp(&self) -> Option<DateTime<Utc>> {
        self.filled_timestamp
    }

    /// When the order closed or was cancelled.
    #[must_use]
    pub const fn close_timestamp(&self) -> Option<DateTime<Utc>> {
        self.close_timestamp
    }

    /// Cancellation reason, set only when cancelled.
    #[must_use]
    pub const fn cancel_reason(&self) -> Option<&CancelReason> {
        self.cancel_reason.as_ref()
    }

    /// Owning account tag.
    #[must_use]
    pub fn account_id(&self) -> Option<&str> {
        self.account_id.as_deref()
    }

    /// Actual exit price when it differs from the nominal target/stop.
    #[must_use]
    pub const fn closed_at(&self) -> Option<Decimal> {
        self.closed_at
    }

    /// Per-order risk scaling.
    #[must_use]
    pub const fn risk_multiplier(&self) -> Option<Decimal> {
        self.risk_multiplier
    }

    // ========================================================================
    // Derived prices
    // ========================================================================

    /// Entry price: the zone edge price must reach to fill.
    #[must_use]
    pub const fn entry_point(&self) -> Decimal {
        match self.order_type {
            OrderType::Long => self.high,
            OrderType::Short => self.low,
        }
    }

    /// Stop price: the far edge of the zone.
    #[must_use]
    pub const fn stop_loss(&self) -> Decimal {
        match self.order_type {
            OrderType::Long => self.low,
            OrderType::Short => self.high,
        }
    }

    /// Target price.
    #[must_use]
    pub fn take_profit(&self) -> Decimal {
        self.profit_cap.unwrap_or_else(|| {
            self.entry_point()
                + self.order_type.sign() * self.at_risk_points() * self.profit_multiplier
        })
    }

    /// Points between entry and stop.
    #[must_use]
    pub fn at_risk_points(&self) -> Decimal {
        self.high - self.low
    }

    /// Dollars at risk per contract for an instrument's point value.
    #[must_use]
    pub fn at_risk_per_contract(&self, point_value: Decimal) -> Decimal {
        self.at_risk_points() * point_value
    }

    /// Exit price used for P&L: the recorded fill if any, else the nominal
    /// target or stop.
    #[must_use]
    pub fn exit_price(&self) -> Option<Decimal> {
        match self.status {
            OrderStatus::Profit => Some(self.closed_at.unwrap_or_else(|| self.take_profit())),
            OrderStatus::Loss => Some(self.closed_at.unwrap_or_else(|| self.stop_loss())),
            _ => None,
        }
    }

    /// Realized R-multiple, clamped to `[-1.2, profit_multiplier + 0.2]`.
    ///
    /// `None` unless the order closed at Profit or Loss.
    #[must_use]
    pub fn realized_r(&self) -> Option<Decimal> {
        let exit = self.exit_price()?;
        let risk = self.at_risk_points();
        if risk <= Decimal::ZERO {
            return None;
        }
        let raw = (exit - self.entry_point()) * self.order_type.sign() / risk;
        Some(raw.clamp(MIN_REALIZED_R, self.profit_multiplier + REALIZED_R_HEADROOM))
    }

    /// Time elapsed since the decision.
    #[must_use]
    pub fn age(&self, now: DateTime<Utc>) -> Duration {
        now - self.timestamp
    }

    /// Check if the order is working or open.
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.status.is_active()
    }

    /// Check if the order closed at Profit or Loss.
    #[must_use]
    pub const fn is_profit_or_loss(&self) -> bool {
        self.status.is_profit_or_loss()
    }

    /// Check if the order is in a terminal state.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    // ========================================================================
    // Transformations
    // ========================================================================

    /// Round the zone bounds and any profit cap to the tick grid.
    ///
    /// # Errors
    ///
    /// Returns error if the zone collapses after rounding.
    pub fn with_tick_alignment(mut self, tick_size: Decimal) -> Result<Self, OrderError> {
        let low = round_to_tick(self.low, tick_size);
        let high = round_to_tick(self.high, tick_size);
        if high <= low {
            return Err(OrderError::InvalidBounds { low, high });
        }
        self.low = low;
        self.high = high;
        self.profit_cap = self.profit_cap.map(|cap| round_to_tick(cap, tick_size));
        Ok(self)
    }

    /// Entry order is working.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Planned` or `PlaceNow`.
    pub fn mark_placed(mut self, at: DateTime<Utc>) -> Result<Self, OrderError> {
        self.transition(OrderStatus::Placed)?;
        self.placed_timestamp.get_or_insert(at);
        self.events.push(OrderEvent::Placed(OrderPlaced {
            order_timestamp: self.timestamp,
            contract: self.contract.clone(),
            order_type: self.order_type,
            entry_point: self.entry_point(),
            occurred_at: at,
        }));
        Ok(self)
    }

    /// Entry filled.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Placed` or `PlaceNow`.
    pub fn mark_filled(mut self, at: DateTime<Utc>) -> Result<Self, OrderError> {
        self.transition(OrderStatus::Filled)?;
        self.placed_timestamp.get_or_insert(at);
        self.filled_timestamp.get_or_insert(at);
        self.events.push(OrderEvent::Filled(OrderFilled {
            order_timestamp: self.timestamp,
            contract: self.contract.clone(),
            entry_point: self.entry_point(),
            occurred_at: at,
        }));
        Ok(self)
    }

    /// Closed at or beyond the target.
    ///
    /// `closed_at` is recorded only when it differs from the target.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Filled`.
    pub fn mark_profit(
        self,
        at: DateTime<Utc>,
        closed_at: Option<Decimal>,
    ) -> Result<Self, OrderError> {
        let nominal = self.take_profit();
        self.close(OrderStatus::Profit, at, closed_at.filter(|p| *p != nominal))
    }

    /// Closed at or beyond the stop.
    ///
    /// `closed_at` is recorded only when it differs from the stop.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Filled`.
    pub fn mark_loss(
        self,
        at: DateTime<Utc>,
        closed_at: Option<Decimal>,
    ) -> Result<Self, OrderError> {
        let nominal = self.stop_loss();
        self.close(OrderStatus::Loss, at, closed_at.filter(|p| *p != nominal))
    }

    /// Forced exit at `price`: Profit when strictly better than entry,
    /// otherwise Loss.
    ///
    /// # Errors
    ///
    /// Returns error unless the order is `Filled`.
    pub fn mark_exited(self, at: DateTime<Utc>, price: Decimal) -> Result<Self, OrderError> {
        let gain = (price - self.entry_point()) * self.order_type.sign();
        let outcome = if gain > Decimal::ZERO {
            OrderStatus::Profit
        } else {
            OrderStatus::Loss
        };
        self.close(outcome, at, Some(price))
    }

    /// Cancel with a reason.
    ///
    /// # Errors
    ///
    /// Returns error if the order is already terminal.
    pub fn mark_cancelled(
        mut self,
        at: DateTime<Utc>,
        reason: CancelReason,
    ) -> Result<Self, OrderError> {
        let previous_status = self.status;
        self.transition(OrderStatus::Cancelled)?;
        self.close_timestamp.get_or_insert(at);
        self.cancel_reason = Some(reason.clone());
        self.events.push(OrderEvent::Cancelled(OrderCancelled {
            order_timestamp: self.timestamp,
            contract: self.contract.clone(),
            previous_status,
            reason,
            occurred_at: at,
        }));
        Ok(self)
    }

    fn close(
        mut self,
        outcome: OrderStatus,
        at: DateTime<Utc>,
        closed_at: Option<Decimal>,
    ) -> Result<Self, OrderError> {
        self.transition(outcome)?;
        self.close_timestamp.get_or_insert(at);
        if closed_at.is_some() {
            self.closed_at = closed_at;
        }
        self.events.push(OrderEvent::Closed(OrderClosed {
            order_timestamp: self.timestamp,
            contract: self.contract.clone(),
            outcome,
            closed_at: self.closed_at,
            occurred_at: at,
        }));
        Ok(self)
    }

    fn transition(&mut self, to: OrderStatus) -> Result<(), OrderError> {
        OrderStateMachine::validate_transition(self.status, to)?;
        self.status = to;
        Ok(())
    }

    // ========================================================================
    // Events
    // ========================================================================

    /// Pending events, oldest first.
    #[must_use]
    pub fn events(&self) -> &[OrderEvent] {
        &self.events
    }

    /// Drain pending events.
    pub fn take_events(&mut self) -> Vec<OrderEvent> {
        std::mem::take(&mut self.events)
    }
}
