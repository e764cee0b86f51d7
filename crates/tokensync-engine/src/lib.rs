// Engine module - folds normalized usage records (types) into the statistics
// shown locally by the CLI. No filesystem or network access lives here.

mod aggregate;
mod ranking;

pub use aggregate::{StatsAccumulator, aggregate};
pub use ranking::{ModelShare, daily_series, top_models};
