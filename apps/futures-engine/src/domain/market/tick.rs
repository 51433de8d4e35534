//! Tick-size price alignment.

use rust_decimal::{Decimal, RoundingStrategy};

/// Round `price` to the nearest multiple of `tick_size`, ties to even.
///
/// A non-positive tick size leaves the price unchanged.
#[must_use]
pub fn round_to_tick(price: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size <= Decimal::ZERO {
        return price;
    }
    let ticks = (price / tick_size).round_dp_with_strategy(0, RoundingStrategy::MidpointNearestEven);
    (ticks * tick_size).normalize()
}
