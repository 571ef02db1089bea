//! Per-station traffic aggregation.

pub mod aggregate;
pub mod synthetic;
pub mod types;

pub use aggregate::{aggregate, aggregate_bucketed};
pub use types::{StationTraffic, TimeFilter, TrafficPattern, TrafficSnapshot};
