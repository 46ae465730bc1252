use std::collections::BTreeMap;
use std::time::Duration;

use super::ErrorKind;

/// Upper bound (exclusive) of the fast bucket.
pub const FAST_LATENCY_LIMIT: Duration = Duration::from_millis(100);
/// Lower bound (inclusive) of the slow bucket.
pub const SLOW_LATENCY_FLOOR: Duration = Duration::from_millis(500);

/// A count and its share of some denominator, in hundredths of a percent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Share {
    pub count: u64,
    pub percent_x100: u64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LatencyStats {
    pub count: u64,
    pub mean: Duration,
    pub median: Duration,
    pub min: Duration,
    pub max: Duration,
    pub std_dev: Duration,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Percentiles {
    pub p50: Duration,
    pub p75: Duration,
    pub p90: Duration,
    pub p95: Duration,
    pub p99: Duration,
}

impl Percentiles {
    #[must_use]
    pub const fn rows(&self) -> [(u64, Duration); 5] {
        [
            (50, self.p50),
            (75, self.p75),
            (90, self.p90),
            (95, self.p95),
            (99, self.p99),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceBucket {
    Fast,
    Medium,
    Slow,
}

impl PerformanceBucket {
    #[must_use]
    pub fn classify(latency: Duration) -> Self {
        if latency < FAST_LATENCY_LIMIT {
            PerformanceBucket::Fast
        } else if latency < SLOW_LATENCY_FLOOR {
            PerformanceBucket::Medium
        } else {
            PerformanceBucket::Slow
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PerformanceBucket::Fast => "Fast (< 100ms)",
            PerformanceBucket::Medium => "Medium (100-500ms)",
            PerformanceBucket::Slow => "Slow (>= 500ms)",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BucketCounts {
    pub fast: Share,
    pub medium: Share,
    pub slow: Share,
}

impl BucketCounts {
    #[must_use]
    pub const fn rows(&self) -> [(PerformanceBucket, Share); 3] {
        [
            (PerformanceBucket::Fast, self.fast),
            (PerformanceBucket::Medium, self.medium),
            (PerformanceBucket::Slow, self.slow),
        ]
    }
}

/// Statistics for one finished (or cancelled) run.
///
/// Rates and percentages are fixed point, scaled by 100: a
/// `success_rate_x100` of `9_950` reads as 99.50%. Latency figures only
/// cover successful requests and are all zero when there were none.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub total_attempted: u64,
    pub successful: u64,
    pub failed: u64,
    pub success_rate_x100: u64,
    pub duration: Duration,
    pub target_rps: u64,
    pub actual_rps_x100: u64,
    pub throughput_efficiency_x100: u64,
    pub latency: LatencyStats,
    pub percentiles: Percentiles,
    pub status_codes: BTreeMap<u16, Share>,
    pub errors: BTreeMap<ErrorKind, Share>,
    pub buckets: BucketCounts,
}
