//! Domain events for the order lifecycle.
//!
//! Transitions on [`super::Order`] append events to a pending list; the
//! caller drains them with `take_events()` and decides how to emit them.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::value_objects::{CancelReason, OrderStatus, OrderType};

/// All possible order events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderEvent {
    /// Entry order working at the broker.
    Placed(OrderPlaced),
    /// Entry filled; position open.
    Filled(OrderFilled),
    /// Position closed at target, stop, or forced exit.
    Closed(OrderClosed),
    /// Order cancelled before or instead of closing.
    Cancelled(OrderCancelled),
}

impl OrderEvent {
    /// Decision timestamp of the order this event belongs to.
    #[must_use]
    pub const fn order_timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Placed(e) => e.order_timestamp,
            Self::Filled(e) => e.order_timestamp,
            Self::Closed(e) => e.order_timestamp,
            Self::Cancelled(e) => e.order_timestamp,
        }
    }

    /// Get the timestamp when this event occurred.
    #[must_use]
    pub const fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            Self::Placed(e) => e.occurred_at,
            Self::Filled(e) => e.occurred_at,
            Self::Closed(e) => e.occurred_at,
            Self::Cancelled(e) => e.occurred_at,
        }
    }

    /// Get the event type name.
    #[must_use]
    pub const fn event_type(&self) -> &'static str {
        match self {
            Self::Placed(_) => "ORDER_PLACED",
            Self::Filled(_) => "ORDER_FILLED",
            Self::Closed(_) => "ORDER_CLOSED",
            Self::Cancelled(_) => "ORDER_CANCELLED",
        }
    }
}

/// Event: entry order placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderPlaced {
    /// Order decision timestamp.
    pub order_timestamp: DateTime<Utc>,
    /// Instrument symbol.
    pub contract: String,
    /// Direction.
    pub order_type: OrderType,
    /// Entry price.
    pub entry_point: Decimal,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Event: entry filled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderFilled {
    /// Order decision timestamp.
    pub order_timestamp: DateTime<Utc>,
    /// Instrument symbol.
    pub contract: String,
    /// Entry price.
    pub entry_point: Decimal,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Event: position closed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderClosed {
    /// Order decision timestamp.
    pub order_timestamp: DateTime<Utc>,
    /// Instrument symbol.
    pub contract: String,
    /// Profit or Loss.
    pub outcome: OrderStatus,
    /// Actual exit price, when it differs from the nominal target/stop.
    pub closed_at: Option<Decimal>,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

/// Event: order cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderCancelled {
    /// Order decision timestamp.
    pub order_timestamp: DateTime<Utc>,
    /// Instrument symbol.
    pub contract: String,
    /// Status the order held when cancelled.
    pub previous_status: OrderStatus,
    /// Cancellation reason.
    pub reason: CancelReason,
    /// When the event occurred.
    pub occurred_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn event_accessors() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 3, 4, 14, 41, 0).unwrap();
        let event = OrderEvent::Cancelled(OrderCancelled {
            order_timestamp: ts,
            contract: "MESM4".to_string(),
            previous_status: OrderStatus::Planned,
            reason: CancelReason::UnfilledTimeout,
            occurred_at: later,
        });

        assert_eq!(event.order_timestamp(), ts);
        assert_eq!(event.occurred_at(), later);
        assert_eq!(event.event_type(), "ORDER_CANCELLED");
    }

    #[test]
    fn event_serializes_with_type_tag() {
        let ts = Utc.with_ymd_and_hms(2024, 3, 4, 14, 30, 0).unwrap();
        let event = OrderEvent::Filled(OrderFilled {
            order_timestamp: ts,
            contract: "MNQM4".to_string(),
            entry_point: Decimal::new(18_000, 0),
            occurred_at: ts,
        });
        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("\"type\":\"FILLED\""));
    }
}
