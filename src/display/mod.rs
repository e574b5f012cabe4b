//! Human-readable renderings of load plans.
pub mod plan;

pub use plan::explain;
