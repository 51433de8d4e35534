//! Market data value types and price/time normalisation.

mod candle;
mod tick;
mod time;

pub use candle::{Candle, ONE_MINUTE};
pub use tick::round_to_tick;
pub use time::snap_to_minute;
