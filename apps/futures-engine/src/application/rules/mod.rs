//! Rule pipeline.
//!
//! A fixed, ordered list of guarded rules advances each order by one
//! candle. Rules are pure; the pipeline turns their decisions into broker
//! calls.

mod action;
mod pipeline;
mod rule;
mod timing;

pub use action::RuleAction;
pub use pipeline::RulePipeline;
pub use rule::Rule;
pub use timing::RuleTiming;
