//! Value types shared by the rate controller, dispatcher, and statistics.
mod config;
mod outcome;
mod summary;

pub use config::{HttpMethod, PositiveU64, TestConfig};
pub use outcome::{ErrorKind, Outcome, RequestOutcome};
pub use summary::{BucketCounts, LatencyStats, PerformanceBucket, Percentiles, Share, Summary};
