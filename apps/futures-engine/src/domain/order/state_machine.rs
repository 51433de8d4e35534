//! Order State Machine
//!
//! Validates lifecycle transitions. Transitions only move forward;
//! terminal states accept nothing.

use super::errors::OrderError;
use super::value_objects::OrderStatus;

/// Order State Machine for validating transitions.
pub struct OrderStateMachine;

impl OrderStateMachine {
    /// Check if a state transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: OrderStatus, to: OrderStatus) -> bool {
        matches!(
            (from, to),
            // From Planned
            (OrderStatus::Planned, OrderStatus::Placed)
                | (OrderStatus::Planned, OrderStatus::Cancelled)
                // From PlaceNow (market entry)
                | (OrderStatus::PlaceNow, OrderStatus::Placed)
                | (OrderStatus::PlaceNow, OrderStatus::Filled)
                | (OrderStatus::PlaceNow, OrderStatus::Cancelled)
                // From Placed
                | (OrderStatus::Placed, OrderStatus::Filled)
                | (OrderStatus::Placed, OrderStatus::Cancelled)
                // From Filled
                | (OrderStatus::Filled, OrderStatus::Profit)
                | (OrderStatus::Filled, OrderStatus::Loss)
                | (OrderStatus::Filled, OrderStatus::Cancelled)
        )
    }

    /// Validate a state transition.
    ///
    /// # Errors
    ///
    /// Returns error if the transition is invalid.
    pub fn validate_transition(from: OrderStatus, to: OrderStatus) -> Result<(), OrderError> {
        if Self::is_valid_transition(from, to) {
            Ok(())
        } else {
            Err(OrderError::InvalidStateTransition {
                from,
                to,
                reason: Self::transition_error_reason(from, to),
            })
        }
    }

    /// Get a human-readable reason for an invalid transition.
    #[must_use]
    pub fn transition_error_reason(from: OrderStatus, to: OrderStatus) -> String {
        match from {
            OrderStatus::Profit | OrderStatus::Loss => {
                format!("Order is already closed, cannot transition to {to}")
            }
            OrderStatus::Cancelled => format!("Order is cancelled, cannot transition to {to}"),
            _ => format!("Invalid transition from {from} to {to}"),
        }
    }

    /// Get all valid next states from a given state.
    #[must_use]
    pub fn valid_next_states(from: OrderStatus) -> Vec<OrderStatus> {
        match from {
            OrderStatus::Planned => vec![OrderStatus::Placed, OrderStatus::Cancelled],
            OrderStatus::PlaceNow => vec![
                OrderStatus::Placed,
                OrderStatus::Filled,
                OrderStatus::Cancelled,
            ],
            OrderStatus::Placed => vec![OrderStatus::Filled, OrderStatus::Cancelled],
            OrderStatus::Filled => vec![
                OrderStatus::Profit,
                OrderStatus::Loss,
                OrderStatus::Cancelled,
            ],
            // Terminal states
            OrderStatus::Profit | OrderStatus::Loss | OrderStatus::Cancelled => vec![],
        }
    }
}
