//! Outcome collection and summary statistics.
mod collector;
mod percentiles;
mod stats;


pub use collector::{CollectorHandle, OutcomeSink, ResultSet, spawn_collector};
pub use stats::compute_summary;
