use std::sync::Arc;

use tokio::sync::watch;
use tracing::{info, warn};

use crate::domain::{Summary, TestConfig};
use crate::error::AppResult;
use crate::http::{ClientTimeouts, Dispatch, HttpDispatcher, build_client};
use crate::metrics::{compute_summary, spawn_collector};
use crate::rate::{RateController, RunCompletion, TierPlan};
use crate::shutdown::ShutdownSender;

use super::progress;

/// Knobs that shape how a run is observed, not what it sends.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub progress: bool,
    pub no_color: bool,
    pub timeouts: ClientTimeouts,
}

/// Everything a finished or cancelled run produced.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub summary: Summary,
    pub completion: RunCompletion,
}

/// Runs one load test against `config.url`.
///
/// Request-level failures never fail the run; they end up in the summary.
/// A shutdown signal on `shutdown_tx` stops new batches, waits for the
/// requests already in flight and still returns a report.
///
/// # Errors
///
/// Returns an error when the HTTP client cannot be built or the result
/// collector task fails.
pub async fn run_load_test(
    config: &TestConfig,
    shutdown_tx: &ShutdownSender,
    options: RunOptions,
) -> AppResult<RunReport> {
    let plan = TierPlan::for_rate(config.target_rps);
    let client = build_client(&plan, options.timeouts)?;
    let dispatcher = Arc::new(HttpDispatcher::new(client, config)?);
    execute_run(config, dispatcher, shutdown_tx, options).await
}

pub(crate) async fn execute_run<D>(
    config: &TestConfig,
    dispatcher: Arc<D>,
    shutdown_tx: &ShutdownSender,
    options: RunOptions,
) -> AppResult<RunReport>
where
    D: Dispatch + 'static,
{
    let shutdown_rx = shutdown_tx.subscribe();
    let (sink, collector) = spawn_collector();
    let (done_tx, done_rx) = watch::channel(false);
    let progress_handle = options.progress.then(|| {
        progress::setup_progress_indicator(
            sink.counter(),
            config.total_requests.get(),
            options.no_color,
            done_rx,
        )
    });

    let controller = RateController::new(config, dispatcher);
    let completion = controller.run(sink, shutdown_rx).await;
    drop(controller);

    drop(done_tx.send(true));
    if let Some(handle) = progress_handle
        && let Err(err) = handle.await
    {
        warn!("Progress indicator failed: {}", err);
    }

    let collected = collector.collected();
    let results = collector.finish().await?;
    info!(
        "Collected {} outcomes for {} dispatched requests.",
        collected, completion.dispatched
    );
    let summary = compute_summary(&results, config, completion.duration);
    Ok(RunReport {
        summary,
        completion,
    })
}
