//! Status-transition rules.
//!
//! Each rule is a pure guard over `(order, candle)`. Rules never call the
//! broker themselves; they return the action to take, which keeps every
//! rule testable on its own.

use std::fmt;

use rust_decimal::Decimal;

use super::action::RuleAction;
use super::timing::RuleTiming;
use crate::domain::market::Candle;
use crate::domain::order::{CancelReason, Order, OrderStatus, OrderType};

/// One guarded rule in the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Rule {
    /// Filled order whose candle crossed both stop and target.
    TallCandle,
    /// Filled order whose candle crossed exactly one of stop or target.
    ShortCandle,
    /// Planned order goes to the broker.
    Placement,
    /// Placed order whose candle reached the entry.
    Fill,
    /// Market entry placed and filled at once.
    MarketOrder,
    /// Session close: cancel resting orders, exit open positions.
    EndOfDay,
    /// A full candle beyond the target before entry.
    FullCandleOutside,
    /// A wick through the target after the grace period.
    StaleWickOutside,
    /// Unfilled past the hard ceiling.
    UnfilledTimeout,
}

impl Rule {
    /// Rules in evaluation order.
    pub const CANONICAL: [Self; 9] = [
        Self::TallCandle,
        Self::ShortCandle,
        Self::Placement,
        Self::Fill,
        Self::MarketOrder,
        Self::EndOfDay,
        Self::FullCandleOutside,
        Self::StaleWickOutside,
        Self::UnfilledTimeout,
    ];

    /// Stable rule name for logs.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::TallCandle => "tall_candle",
            Self::ShortCandle => "short_candle",
            Self::Placement => "placement",
            Self::Fill => "fill",
            Self::MarketOrder => "market_order",
            Self::EndOfDay => "end_of_day",
            Self::FullCandleOutside => "full_candle_outside",
            Self::StaleWickOutside => "stale_wick_outside",
            Self::UnfilledTimeout => "unfilled_timeout",
        }
    }

    /// Decide whether this rule fires for the order's current status.
    #[must_use]
    pub fn decide(self, order: &Order, candle: &Candle, timing: &RuleTiming) -> Option<RuleAction> {
        let status = order.status();
        match self {
            Self::TallCandle => {
                if status != OrderStatus::Filled
                    || !crosses_target(order, candle)
                    || !crosses_stop(order, candle)
                {
                    return None;
                }
                // Bearish bars are assumed to print the high first.
                let long_wins = !candle.is_bullish();
                let wins = match order.order_type() {
                    OrderType::Long => long_wins,
                    OrderType::Short => !long_wins,
                };
                Some(if wins {
                    RuleAction::TakeProfit
                } else {
                    RuleAction::TakeLoss
                })
            }
            Self::ShortCandle => {
                if status != OrderStatus::Filled {
                    return None;
                }
                match (crosses_target(order, candle), crosses_stop(order, candle)) {
                    (true, false) => Some(RuleAction::TakeProfit),
                    (false, true) => Some(RuleAction::TakeLoss),
                    _ => None,
                }
            }
            Self::Placement => (status == OrderStatus::Planned).then_some(RuleAction::Place),
            Self::Fill => {
                let reached = match order.order_type() {
                    OrderType::Long => candle.low <= order.entry_point(),
                    OrderType::Short => candle.high >= order.entry_point(),
                };
                (status == OrderStatus::Placed && reached).then_some(RuleAction::Fill)
            }
            Self::MarketOrder => (status == OrderStatus::PlaceNow).then_some(RuleAction::Place),
            Self::EndOfDay => {
                if !timing.is_end_of_day(candle.timestamp) {
                    return None;
                }
                match status {
                    OrderStatus::Filled => Some(RuleAction::Exit),
                    OrderStatus::Planned | OrderStatus::Placed | OrderStatus::PlaceNow => {
                        Some(RuleAction::Cancel(CancelReason::EndOfDay))
                    }
                    _ => None,
                }
            }
            Self::FullCandleOutside => {
                if !status.is_pending_entry() || order.entry_type().tolerates_full_candle_outside()
                {
                    return None;
                }
                let target = order.take_profit();
                let outside = match order.order_type() {
                    OrderType::Long => candle.low > target,
                    OrderType::Short => candle.high < target,
                };
                outside.then_some(RuleAction::Cancel(CancelReason::FullCandleOutside))
            }
            Self::StaleWickOutside => {
                if !status.is_pending_entry() || order.age(candle.timestamp) < timing.stale_grace {
                    return None;
                }
                crosses_target(order, candle)
                    .then_some(RuleAction::Cancel(CancelReason::StaleWickOutside))
            }
            Self::UnfilledTimeout => (status.is_pending_entry()
                && order.age(candle.timestamp) > timing.unfilled_timeout)
                .then_some(RuleAction::Cancel(CancelReason::UnfilledTimeout)),
        }
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn crosses_target(order: &Order, candle: &Candle) -> bool {
    reaches(order.order_type(), candle, order.take_profit(), true)
}

fn crosses_stop(order: &Order, candle: &Candle) -> bool {
    reaches(order.order_type(), candle, order.stop_loss(), false)
}

/// Whether the candle reached `price` on the favourable (`favourable`) or
/// adverse side for the order's direction.
fn reaches(order_type: OrderType, candle: &Candle, price: Decimal, favourable: bool) -> bool {
    match (order_type, favourable) {
        (OrderType::Long, true) | (OrderType::Short, false) => candle.high >= price,
        (OrderType::Long, false) | (OrderType::Short, true) => candle.low <= price,
    }
}
