use std::collections::BTreeMap;
use std::time::Duration;

use crate::domain::{
    BucketCounts, ErrorKind, LatencyStats, Outcome, PerformanceBucket, Share, Summary, TestConfig,
};

use super::ResultSet;
use super::percentiles::{compute_percentiles, percentile};

/// Fixed-point scale for percentages (`x100` of a percent).
const PERCENT_X100: u128 = 10_000;
/// Fixed-point scale for rates (`x100`).
const RATE_X100: u128 = 100;
const MICROS_PER_SEC: u128 = 1_000_000;

/// Computes the run summary from a finalized result set.
///
/// Pure: the same results, config and duration always produce an identical
/// [`Summary`]. Empty denominators report zero instead of dividing.
#[must_use]
pub fn compute_summary(results: &ResultSet, config: &TestConfig, duration: Duration) -> Summary {
    let mut success_micros: Vec<u64> = Vec::with_capacity(results.len());
    let mut status_counts: BTreeMap<u16, u64> = BTreeMap::new();
    let mut error_counts: BTreeMap<ErrorKind, u64> = BTreeMap::new();
    let mut fast: u64 = 0;
    let mut medium: u64 = 0;
    let mut slow: u64 = 0;

    for result in results.iter() {
        let latency = result.latency();
        match result.outcome {
            Outcome::Success { status_code, .. } => {
                success_micros.push(duration_micros(latency));
                let count = status_counts.entry(status_code).or_insert(0);
                *count = count.saturating_add(1);
                match PerformanceBucket::classify(latency) {
                    PerformanceBucket::Fast => fast = fast.saturating_add(1),
                    PerformanceBucket::Medium => medium = medium.saturating_add(1),
                    PerformanceBucket::Slow => slow = slow.saturating_add(1),
                }
            }
            Outcome::Failure { error_kind, .. } => {
                let count = error_counts.entry(error_kind).or_insert(0);
                *count = count.saturating_add(1);
            }
        }
    }

    success_micros.sort_unstable();

    let total_attempted = u64::try_from(results.len()).unwrap_or(u64::MAX);
    let successful = u64::try_from(success_micros.len()).unwrap_or(u64::MAX);
    let failed = total_attempted.saturating_sub(successful);

    let target_rps = config.target_rps.get();
    let actual_rps_x100 = actual_rps_x100(total_attempted, duration);
    let throughput_efficiency_x100 = u64::try_from(
        u128::from(actual_rps_x100)
            .saturating_mul(RATE_X100)
            .checked_div(u128::from(target_rps))
            .unwrap_or(0),
    )
    .unwrap_or(u64::MAX);

    Summary {
        total_attempted,
        successful,
        failed,
        success_rate_x100: percent_x100(successful, total_attempted),
        duration,
        target_rps,
        actual_rps_x100,
        throughput_efficiency_x100,
        latency: latency_stats(&success_micros),
        percentiles: compute_percentiles(&success_micros),
        status_codes: shares(status_counts, successful),
        errors: shares(error_counts, failed),
        buckets: BucketCounts {
            fast: share(fast, successful),
            medium: share(medium, successful),
            slow: share(slow, successful),
        },
    }
}

fn latency_stats(sorted_micros: &[u64]) -> LatencyStats {
    let (Some(&min), Some(&max)) = (sorted_micros.first(), sorted_micros.last()) else {
        return LatencyStats::default();
    };
    let count = u128::try_from(sorted_micros.len()).unwrap_or(u128::MAX);

    let mut sum: u128 = 0;
    let mut sum_sq: u128 = 0;
    for &value in sorted_micros {
        let value = u128::from(value);
        sum = sum.saturating_add(value);
        sum_sq = sum_sq.saturating_add(value.saturating_mul(value));
    }
    let mean = sum.checked_div(count).unwrap_or(0);

    // Population variance: (n * sum(x^2) - sum(x)^2) / n^2.
    let spread = count
        .saturating_mul(sum_sq)
        .saturating_sub(sum.saturating_mul(sum));
    let variance = spread
        .checked_div(count.saturating_mul(count))
        .unwrap_or(0);

    LatencyStats {
        count: u64::try_from(count).unwrap_or(u64::MAX),
        mean: micros_to_duration(mean),
        median: percentile(sorted_micros, 50),
        min: Duration::from_micros(min),
        max: Duration::from_micros(max),
        std_dev: micros_to_duration(variance.isqrt()),
    }
}

fn actual_rps_x100(total: u64, duration: Duration) -> u64 {
    let elapsed_micros = duration.as_micros();
    if elapsed_micros == 0 {
        return 0;
    }
    let scaled = u128::from(total)
        .saturating_mul(RATE_X100)
        .saturating_mul(MICROS_PER_SEC)
        .checked_div(elapsed_micros)
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

fn shares<K: Ord>(counts: BTreeMap<K, u64>, denominator: u64) -> BTreeMap<K, Share> {
    counts
        .into_iter()
        .map(|(key, count)| (key, share(count, denominator)))
        .collect()
}

fn share(count: u64, denominator: u64) -> Share {
    Share {
        count,
        percent_x100: percent_x100(count, denominator),
    }
}

fn percent_x100(count: u64, denominator: u64) -> u64 {
    let scaled = u128::from(count)
        .saturating_mul(PERCENT_X100)
        .checked_div(u128::from(denominator))
        .unwrap_or(0);
    u64::try_from(scaled).unwrap_or(u64::MAX)
}

fn duration_micros(latency: Duration) -> u64 {
    u64::try_from(latency.as_micros()).unwrap_or(u64::MAX)
}

fn micros_to_duration(micros: u128) -> Duration {
    Duration::from_micros(u64::try_from(micros).unwrap_or(u64::MAX))
}
