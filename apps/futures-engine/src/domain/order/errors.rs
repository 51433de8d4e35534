//! Order lifecycle errors.

use std::fmt;

use rust_decimal::Decimal;

use super::value_objects::OrderStatus;

/// Errors raised by the order aggregate.
///
/// All of these are programming-error class: they mean the caller
/// built an invalid order or invoked an operation out of order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Entry zone bounds are inverted or empty.
    InvalidBounds {
        /// Lower bound.
        low: Decimal,
        /// Upper bound.
        high: Decimal,
    },

    /// Invalid state transition attempted.
    InvalidStateTransition {
        /// Current order status.
        from: OrderStatus,
        /// Attempted status.
        to: OrderStatus,
        /// Reason for failure.
        reason: String,
    },

    /// Invalid order parameters.
    InvalidParameters {
        /// Field with invalid value.
        field: String,
        /// Error message.
        message: String,
    },
}

impl fmt::Display for OrderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidBounds { low, high } => {
                write!(f, "Invalid entry zone: high {high} must exceed low {low}")
            }
            Self::InvalidStateTransition { from, to, reason } => {
                write!(
                    f,
                    "Invalid order state transition: {from} -> {to}: {reason}"
                )
            }
            Self::InvalidParameters { field, message } => {
                write!(f, "Invalid order parameter '{field}': {message}")
            }
        }
    }
}

impl std::error::Error for OrderError {}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn invalid_bounds_display() {
        let err = OrderError::InvalidBounds {
            low: dec!(100),
            high: dec!(99.75),
        };
        let msg = err.to_string();
        assert!(msg.contains("99.75"));
        assert!(msg.contains("100"));
    }

    #[test]
    fn invalid_state_transition_display() {
        let err = OrderError::InvalidStateTransition {
            from: OrderStatus::Planned,
            to: OrderStatus::Profit,
            reason: "Order is not filled".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("PLANNED"));
        assert!(msg.contains("PROFIT"));
    }

    #[test]
    fn order_error_is_std_error() {
        let err: Box<dyn std::error::Error> = Box::new(OrderError::InvalidParameters {
            field: "contract".to_string(),
            message: "empty".to_string(),
        });
        assert!(err.to_string().contains("contract"));
    }
}
