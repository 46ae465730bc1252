use std::collections::BTreeSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use super::{RateController, Tier, TierPlan};
use crate::domain::{ErrorKind, HttpMethod, PositiveU64, RequestOutcome, TestConfig};
use crate::error::{AppError, AppResult};
use crate::http::Dispatch;
use crate::metrics::{compute_summary, spawn_collector};
use crate::shutdown_handlers::shutdown_channel;

/// Sleeps for a fixed latency and tracks how many calls overlap.
#[derive(Default)]
struct Recorder {
    latency: Duration,
    fail_with: Option<ErrorKind>,
    in_flight: AtomicUsize,
    peak: AtomicUsize,
    ids: Mutex<Vec<u64>>,
}

impl Recorder {
    fn new(latency: Duration) -> Self {
        Self {
            latency,
            ..Self::default()
        }
    }

    fn peak(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    fn ids(&self) -> Vec<u64> {
        self.ids
            .lock()
            .map(|ids| ids.clone())
            .unwrap_or_else(|poisoned| poisoned.into_inner().clone())
    }
}

#[async_trait]
impl Dispatch for Recorder {
    async fn dispatch(&self, request_id: u64) -> RequestOutcome {
        let now = self.in_flight.fetch_add(1, Ordering::SeqCst).saturating_add(1);
        self.peak.fetch_max(now, Ordering::SeqCst);
        if let Ok(mut ids) = self.ids.lock() {
            ids.push(request_id);
        }
        tokio::time::sleep(self.latency).await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
        match self.fail_with {
            Some(kind) => RequestOutcome::failure(kind, self.latency),
            None => RequestOutcome::success(200, self.latency),
        }
    }
}

fn run_paused_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .start_paused(true)
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn run_real_clock_test<F>(future: F) -> AppResult<()>
where
    F: Future<Output = AppResult<()>>,
{
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .map_err(|err| AppError::validation(format!("Failed to build runtime: {}", err)))?;
    runtime.block_on(future)
}

fn positive(value: u64) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(AppError::validation)
}

fn test_config(rps: u64, total: u64) -> AppResult<TestConfig> {
    let url = url::Url::parse("http://127.0.0.1:9/")
        .map_err(|err| AppError::validation(format!("bad url: {}", err)))?;
    Ok(TestConfig::new(url, HttpMethod::Get, positive(rps)?, positive(total)?))
}

#[test]
fn tier_table_boundaries() -> AppResult<()> {
    let cases = [
        (1, Tier::Paced, 2, 1, Duration::from_secs(1)),
        (4, Tier::Paced, 8, 1, Duration::from_millis(250)),
        (99, Tier::Paced, 198, 1, Duration::from_nanos(10_101_010)),
        (100, Tier::Batched, 200, 100, Duration::from_secs(1)),
        (999, Tier::Batched, 1_998, 999, Duration::from_secs(1)),
        (1_000, Tier::Capped, 2_000, 1_000, Duration::from_secs(1)),
        (1_500, Tier::Capped, 2_000, 1_000, Duration::from_secs(1)),
        (50_000, Tier::Capped, 2_000, 1_000, Duration::from_secs(1)),
    ];
    for (rps, tier, bound, batch, tick) in cases {
        let plan = TierPlan::for_rate(positive(rps)?);
        let expected = TierPlan {
            tier,
            concurrency_bound: bound,
            batch_size: batch,
            tick,
        };
        if plan != expected {
            return Err(AppError::validation(format!(
                "rps {}: expected {:?}, got {:?}",
                rps, expected, plan
            )));
        }
    }
    Ok(())
}

#[test]
fn tier_plan_is_deterministic() -> AppResult<()> {
    let rps = positive(321)?;
    if TierPlan::for_rate(rps) != TierPlan::for_rate(rps) {
        return Err(AppError::validation("Tier selection must be pure"));
    }
    Ok(())
}

#[test]
fn dispatches_exactly_total_with_unique_ids() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(100, 250)?;
        let recorder = Arc::new(Recorder::new(Duration::from_millis(10)));
        let controller = RateController::new(&config, Arc::clone(&recorder));
        let (sink, collector) = spawn_collector();
        let (shutdown_tx, _) = shutdown_channel();

        let completion = controller.run(sink, shutdown_tx.subscribe()).await;
        let results = collector.finish().await?;

        if completion.dispatched != 250 || results.len() != 250 || completion.cancelled {
            return Err(AppError::validation(format!(
                "Unexpected completion {:?} with {} results",
                completion,
                results.len()
            )));
        }
        let ids: BTreeSet<u64> = recorder.ids().into_iter().collect();
        if ids.len() != 250 || ids.first() != Some(&1) || ids.last() != Some(&250) {
            return Err(AppError::validation("Request ids must be 1..=250"));
        }
        // Batches of 100, 100 and 50 at 0s, 1s and 2s.
        if completion.duration < Duration::from_secs(2)
            || completion.duration >= Duration::from_secs(3)
        {
            return Err(AppError::validation(format!(
                "Unexpected duration {:?}",
                completion.duration
            )));
        }
        Ok(())
    })
}

#[test]
fn paced_tier_spaces_requests_evenly() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(4, 4)?;
        let recorder = Arc::new(Recorder::new(Duration::from_millis(1)));
        let controller = RateController::new(&config, Arc::clone(&recorder));
        let (sink, collector) = spawn_collector();
        let (shutdown_tx, _) = shutdown_channel();

        let completion = controller.run(sink, shutdown_tx.subscribe()).await;
        drop(collector.finish().await?);

        // Four requests at 0, 250, 500 and 750ms; no sleep after the last.
        if completion.duration < Duration::from_millis(750)
            || completion.duration >= Duration::from_secs(1)
        {
            return Err(AppError::validation(format!(
                "Unexpected duration {:?}",
                completion.duration
            )));
        }
        Ok(())
    })
}

#[test]
fn paced_tier_holds_rate_on_real_clock() -> AppResult<()> {
    run_real_clock_test(async {
        let config = test_config(99, 297)?;
        let controller = RateController::new(&config, Arc::new(Recorder::new(Duration::ZERO)));
        let (sink, collector) = spawn_collector();
        let (shutdown_tx, _) = shutdown_channel();

        let completion = controller.run(sink, shutdown_tx.subscribe()).await;
        let results = collector.finish().await?;
        let summary = compute_summary(&results, &config, completion.duration);

        // 296 gaps of 1/99s is about 2.99s; timer rounding must not pile up.
        if completion.dispatched != 297
            || completion.duration >= Duration::from_millis(3_150)
            || summary.throughput_efficiency_x100 < 9_500
        {
            return Err(AppError::validation(format!(
                "Paced tier drifted: {:?}, efficiency x100 {}",
                completion, summary.throughput_efficiency_x100
            )));
        }
        Ok(())
    })
}

#[test]
fn concurrency_never_exceeds_bound() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(10, 50)?;
        let recorder = Arc::new(Recorder::new(Duration::from_secs(5)));
        let controller = RateController::new(&config, Arc::clone(&recorder));
        let bound = controller.plan().concurrency_bound;
        let (sink, collector) = spawn_collector();
        let (shutdown_tx, _) = shutdown_channel();

        let completion = controller.run(sink, shutdown_tx.subscribe()).await;
        drop(collector.finish().await?);

        if recorder.peak() != bound {
            return Err(AppError::validation(format!(
                "Expected peak {} to reach bound {}",
                recorder.peak(),
                bound
            )));
        }
        if completion.dispatched != 50 {
            return Err(AppError::validation("Expected all requests dispatched"));
        }
        Ok(())
    })
}

#[test]
fn cancellation_stops_new_batches() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(100, 1000)?;
        let recorder = Arc::new(Recorder::new(Duration::from_millis(20)));
        let controller = RateController::new(&config, Arc::clone(&recorder));
        let (sink, collector) = spawn_collector();
        let (shutdown_tx, _) = shutdown_channel();
        let shutdown_rx = shutdown_tx.subscribe();

        let trigger = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(3_500)).await;
            drop(shutdown_tx.send(()));
        });

        let completion = controller.run(sink, shutdown_rx).await;
        let results = collector.finish().await?;
        trigger
            .await
            .map_err(|err| AppError::validation(format!("trigger failed: {}", err)))?;

        if !completion.cancelled || completion.dispatched != 400 {
            return Err(AppError::validation(format!(
                "Expected cancel after 400, got {:?}",
                completion
            )));
        }
        let summary = compute_summary(&results, &config, completion.duration);
        if summary.total_attempted != 400 || summary.successful != 400 {
            return Err(AppError::validation(format!(
                "Unexpected summary totals: {} / {}",
                summary.total_attempted, summary.successful
            )));
        }
        Ok(())
    })
}

#[test]
fn closed_shutdown_channel_never_cancels() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(50, 20)?;
        let recorder = Arc::new(Recorder::new(Duration::from_millis(5)));
        let controller = RateController::new(&config, recorder);
        let (sink, collector) = spawn_collector();
        let (shutdown_tx, shutdown_rx) = shutdown_channel();
        drop(shutdown_tx);

        let completion = controller.run(sink, shutdown_rx).await;
        let results = collector.finish().await?;
        if completion.cancelled || results.len() != 20 {
            return Err(AppError::validation(format!(
                "Unexpected completion {:?}",
                completion
            )));
        }
        Ok(())
    })
}

#[test]
fn all_timeouts_still_summarize() -> AppResult<()> {
    run_paused_test(async {
        let config = test_config(10, 10)?;
        let recorder = Arc::new(Recorder {
            latency: Duration::from_secs(30),
            fail_with: Some(ErrorKind::Timeout),
            ..Recorder::default()
        });
        let controller = RateController::new(&config, recorder);
        let (sink, collector) = spawn_collector();
        let (shutdown_tx, _) = shutdown_channel();

        let completion = controller.run(sink, shutdown_tx.subscribe()).await;
        let results = collector.finish().await?;
        let summary = compute_summary(&results, &config, completion.duration);

        if summary.successful != 0 || summary.failed != 10 || summary.success_rate_x100 != 0 {
            return Err(AppError::validation("Expected ten failures"));
        }
        let timeouts = summary.errors.get(&ErrorKind::Timeout).copied();
        if timeouts.map(|share| (share.count, share.percent_x100)) != Some((10, 10_000)) {
            return Err(AppError::validation(format!(
                "Unexpected timeout share {:?}",
                timeouts
            )));
        }
        if summary.latency.count != 0 || summary.percentiles.p99 != Duration::ZERO {
            return Err(AppError::validation("Latency stats must be zeroed"));
        }
        Ok(())
    })
}
