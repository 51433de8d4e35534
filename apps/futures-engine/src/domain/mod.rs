//! Domain Layer
//!
//! Pure trading logic with no I/O.
//!
//! # Bounded Contexts
//!
//! - [`order`]: Order lifecycle, derived prices and transition table
//! - [`market`]: Candles, tick alignment and timestamp snapping
//! - [`sizing`]: Risk-budget position sizing and fee-aware snapshots

pub mod market;
pub mod order;
pub mod sizing;
