use std::time::Duration;

use crate::domain::PositiveU64;

/// Highest rate served by per-request pacing.
const PACED_MAX_RPS: u64 = 99;
/// Highest rate served by uncapped batching.
const BATCHED_MAX_RPS: u64 = 999;
/// In-flight requests allowed per unit of target rate.
const CONCURRENCY_FACTOR: u64 = 2;
const CONCURRENCY_CAP: u64 = 2_000;
const BATCH_CAP: u64 = 1_000;
const ONE_SECOND: Duration = Duration::from_secs(1);
const NANOS_PER_SEC: u64 = 1_000_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    /// 1-99 rps: one request per tick, ticks spaced evenly over the second.
    Paced,
    /// 100-999 rps: the whole second's worth per tick.
    Batched,
    /// 1000+ rps: batches and concurrency capped.
    Capped,
}

impl Tier {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Tier::Paced => "paced",
            Tier::Batched => "batched",
            Tier::Capped => "capped",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TierPlan {
    pub tier: Tier,
    pub concurrency_bound: usize,
    pub batch_size: u64,
    pub tick: Duration,
}

impl TierPlan {
    /// Selects the strategy for a target rate. Pure.
    #[must_use]
    pub fn for_rate(target_rps: PositiveU64) -> Self {
        let rps = target_rps.get();
        let doubled = rps.saturating_mul(CONCURRENCY_FACTOR);

        if rps <= PACED_MAX_RPS {
            let tick_nanos = NANOS_PER_SEC.checked_div(rps).unwrap_or(NANOS_PER_SEC);
            return Self {
                tier: Tier::Paced,
                concurrency_bound: to_usize(doubled),
                batch_size: 1,
                tick: Duration::from_nanos(tick_nanos),
            };
        }

        if rps <= BATCHED_MAX_RPS {
            return Self {
                tier: Tier::Batched,
                concurrency_bound: to_usize(doubled),
                batch_size: rps,
                tick: ONE_SECOND,
            };
        }

        Self {
            tier: Tier::Capped,
            concurrency_bound: to_usize(doubled.min(CONCURRENCY_CAP)),
            batch_size: rps.min(BATCH_CAP),
            tick: ONE_SECOND,
        }
    }
}

fn to_usize(value: u64) -> usize {
    usize::try_from(value).unwrap_or(usize::MAX)
}
