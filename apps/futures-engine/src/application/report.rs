//! Performance report over completed orders.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::domain::order::{Order, OrderStatus};
use crate::domain::sizing::{ContractTier, RiskProfile, SerializableOrder};

/// Round-trip fees split by contract tier.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeeTotals {
    /// Fees on micro contracts.
    pub micro: Decimal,
    /// Fees on standard contracts.
    pub standard: Decimal,
}

impl FeeTotals {
    /// Fees across both tiers.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.micro + self.standard
    }

    fn add(&mut self, tier: ContractTier, fees: Decimal) {
        match tier {
            ContractTier::Micro => self.micro += fees,
            ContractTier::Standard => self.standard += fees,
        }
    }
}

/// Wins and losses for one strategy tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyTally {
    /// Orders closed at Profit.
    pub wins: u32,
    /// Orders closed at Loss.
    pub losses: u32,
}

impl StrategyTally {
    /// Fraction of closed orders that won; zero when none closed.
    #[must_use]
    pub fn win_rate(&self) -> Decimal {
        let closed = self.wins + self.losses;
        if closed == 0 {
            return Decimal::ZERO;
        }
        Decimal::from(self.wins) / Decimal::from(closed)
    }
}

/// Aggregate results for a set of orders.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderReport {
    /// Per-order snapshots, in input order.
    pub orders: Vec<SerializableOrder>,
    /// Orders closed at Profit.
    pub winning: u32,
    /// Orders closed at Loss.
    pub losing: u32,
    /// Mean net dollars per winning order.
    pub avg_win_dollars: Decimal,
    /// Mean net dollars lost per losing order, as a positive magnitude.
    pub avg_loss_dollars: Decimal,
    /// Largest peak-to-trough drop in cumulative P&L.
    pub max_drawdown_dollars: Decimal,
    /// Fees on closed orders.
    pub total_fees: FeeTotals,
    /// Net P&L across closed orders.
    pub total_pnl: Decimal,
    /// Wins and losses keyed by strategy tag.
    pub win_rates_by_strategy: BTreeMap<String, StrategyTally>,
    /// Contracts of orders left out because they could not be sized.
    pub r#unsized: Vec<String>,
}

impl OrderReport {
    /// Build a report for `orders` sized under `profile`. Orders that cannot
    /// be sized are listed in `unsized` and otherwise ignored.
    #[must_use]
    pub fn build(orders: &[Order], profile: &RiskProfile) -> Self {
        let mut report = Self::default();
        let mut snapshots = Vec::with_capacity(orders.len());
        for order in orders {
            match SerializableOrder::from_order(order.clone(), profile) {
                Ok(snap) => snapshots.push(snap),
                Err(err) => {
                    warn!(
                        contract = %order.contract(),
                        order_ts = %order.timestamp(),
                        error = %err,
                        "Order left out of report"
                    );
                    report.r#unsized.push(order.contract().to_string());
                }
            }
        }

        let mut gross_win = Decimal::ZERO;
        let mut gross_loss = Decimal::ZERO;

        for snap in &snapshots {
            let Some(pnl) = snap.pnl() else {
                continue;
            };
            let tally = report
                .win_rates_by_strategy
                .entry(snap.order.entry_type().tag())
                .or_default();

            match snap.order.status() {
                OrderStatus::Profit => {
                    report.winning += 1;
                    tally.wins += 1;
                    gross_win += pnl;
                }
                OrderStatus::Loss => {
                    report.losing += 1;
                    tally.losses += 1;
                    gross_loss -= pnl;
                }
                _ => continue,
            }

            report.total_fees.add(snap.tier, snap.fees);
            report.total_pnl += pnl;
        }

        if report.winning > 0 {
            report.avg_win_dollars = gross_win / Decimal::from(report.winning);
        }
        if report.losing > 0 {
            report.avg_loss_dollars = gross_loss / Decimal::from(report.losing);
        }
        report.max_drawdown_dollars = max_drawdown(&snapshots);
        report.orders = snapshots;

        report
    }

    /// Fraction of closed orders that won.
    #[must_use]
    pub fn win_rate(&self) -> Decimal {
        StrategyTally {
            wins: self.winning,
            losses: self.losing,
        }
        .win_rate()
    }
}

/// Largest drop from a running peak of cumulative P&L, with closes taken in
/// `close_timestamp` order and the peak starting at zero.
fn max_drawdown(snapshots: &[SerializableOrder]) -> Decimal {
    let mut closes: Vec<_> = snapshots
        .iter()
        .filter_map(|snap| Some((snap.order.close_timestamp()?, snap.pnl()?)))
        .collect();
    closes.sort_by_key(|(closed, _)| *closed);

    let mut cumulative = Decimal::ZERO;
    let mut peak = Decimal::ZERO;
    let mut max_drawdown = Decimal::ZERO;
    for (_, pnl) in closes {
        cumulative += pnl;
        peak = peak.max(cumulative);
        max_drawdown = max_drawdown.max(peak - cumulative);
    }
    max_drawdown
}
