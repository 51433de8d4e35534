//! Order lifecycle bounded context.
//!
//! The [`Order`] aggregate, its value objects, and the transition table
//! that keeps every lifecycle change moving forward.

mod aggregate;
mod errors;
mod events;
mod state_machine;
pub mod value_objects;

pub use aggregate::{DEFAULT_PROFIT_MULTIPLIER, NewOrder, Order};
pub use errors::OrderError;
pub use events::{OrderCancelled, OrderClosed, OrderEvent, OrderFilled, OrderPlaced};
pub use state_machine::OrderStateMachine;
pub use value_objects::{CancelReason, EntryType, OrderStatus, OrderType};
