//! Position sizing.
//!
//! Converts an account's dollar risk budget into a contract count and
//! denomination, and prices the resulting position for reporting.

mod errors;
mod instrument;
mod position;
mod snapshot;

pub use errors::SizingError;
pub use instrument::{ContractTier, DEFAULT_TICK_SIZE, InstrumentSpec, InstrumentTable};
pub use position::{
    DEFAULT_MICRO_CUTOFF, MICRO_PER_STANDARD, PositionSize, RiskProfile, size_position,
};
pub use snapshot::SerializableOrder;
