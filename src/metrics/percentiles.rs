use std::time::Duration;

use crate::domain::Percentiles;

/// Scale of percentile ranks and interpolation fractions.
pub(super) const PERCENT_DIVISOR: u128 = 100;

pub(super) fn compute_percentiles(sorted_micros: &[u64]) -> Percentiles {
    Percentiles {
        p50: percentile(sorted_micros, 50),
        p75: percentile(sorted_micros, 75),
        p90: percentile(sorted_micros, 90),
        p95: percentile(sorted_micros, 95),
        p99: percentile(sorted_micros, 99),
    }
}

/// Linear interpolation between closest ranks, `rank = p / 100 * (n - 1)`.
///
/// `sorted_micros` must be sorted ascending. An empty slice yields zero.
pub(super) fn percentile(sorted_micros: &[u64], percentile: u64) -> Duration {
    let Some(last) = sorted_micros.len().checked_sub(1) else {
        return Duration::ZERO;
    };
    let last_rank = u128::try_from(last).unwrap_or(u128::MAX);
    let rank_x100 = u128::from(percentile.min(100)).saturating_mul(last_rank);
    let lower = rank_x100.checked_div(PERCENT_DIVISOR).unwrap_or(0);
    let fraction = rank_x100.checked_rem(PERCENT_DIVISOR).unwrap_or(0);

    let lower_idx = usize::try_from(lower).unwrap_or(last).min(last);
    let lower_value = sorted_micros.get(lower_idx).copied().unwrap_or(0);
    let upper_value = sorted_micros
        .get(lower_idx.saturating_add(1))
        .copied()
        .unwrap_or(lower_value);

    let offset = u128::from(upper_value.saturating_sub(lower_value))
        .saturating_mul(fraction)
        .checked_div(PERCENT_DIVISOR)
        .unwrap_or(0);
    let micros = lower_value.saturating_add(u64::try_from(offset).unwrap_or(u64::MAX));
    Duration::from_micros(micros)
}
