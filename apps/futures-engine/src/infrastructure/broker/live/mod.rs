//! Live brokerage account adapter.

mod adapter;
mod shadow;

pub use adapter::{LiveAccount, LiveBrokerAdapter};
pub use shadow::ShadowBook;
