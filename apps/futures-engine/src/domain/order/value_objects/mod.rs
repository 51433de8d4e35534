//! Value objects for the order lifecycle.

mod entry_type;
mod order_status;
mod order_type;
mod reasons;

pub use entry_type::EntryType;
pub use order_status::OrderStatus;
pub use order_type::OrderType;
pub use reasons::CancelReason;
