use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, broadcast};
use tokio::task::JoinSet;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::domain::TestConfig;
use crate::http::Dispatch;
use crate::metrics::OutcomeSink;
use crate::shutdown::ShutdownReceiver;

use super::TierPlan;

/// How a run ended, as seen by the controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunCompletion {
    pub dispatched: u64,
    pub duration: Duration,
    pub cancelled: bool,
}

/// Mutable bookkeeping for a single run; never shared outside the controller.
struct RunState {
    dispatched: u64,
    started: Instant,
    cancelled: bool,
    shutdown_rx: ShutdownReceiver,
}

impl RunState {
    fn new(shutdown_rx: ShutdownReceiver) -> Self {
        Self {
            dispatched: 0,
            started: Instant::now(),
            cancelled: false,
            shutdown_rx,
        }
    }

    /// Non-blocking check used between batches.
    fn poll_cancelled(&mut self) -> bool {
        if !self.cancelled {
            match self.shutdown_rx.try_recv() {
                Ok(()) | Err(broadcast::error::TryRecvError::Lagged(_)) => self.cancel(),
                Err(broadcast::error::TryRecvError::Empty)
                | Err(broadcast::error::TryRecvError::Closed) => {}
            }
        }
        self.cancelled
    }

    fn cancel(&mut self) {
        if !self.cancelled {
            info!(
                "Cancellation requested after {} dispatched requests; no new batches will start.",
                self.dispatched
            );
        }
        self.cancelled = true;
    }
}

/// Resolves once shutdown is signalled. A closed channel means nobody can
/// cancel the run anymore, so it never resolves in that case.
async fn shutdown_signalled(shutdown_rx: &mut ShutdownReceiver) {
    match shutdown_rx.recv().await {
        Ok(()) | Err(broadcast::error::RecvError::Lagged(_)) => {}
        Err(broadcast::error::RecvError::Closed) => std::future::pending::<()>().await,
    }
}

/// Drives `total_requests` dispatches in timed batches under the tier's
/// admission gate.
pub struct RateController<D> {
    plan: TierPlan,
    total_requests: u64,
    dispatcher: Arc<D>,
}

impl<D> RateController<D>
where
    D: Dispatch + 'static,
{
    #[must_use]
    pub fn new(config: &TestConfig, dispatcher: Arc<D>) -> Self {
        Self {
            plan: TierPlan::for_rate(config.target_rps),
            total_requests: config.total_requests.get(),
            dispatcher,
        }
    }

    #[must_use]
    pub const fn plan(&self) -> TierPlan {
        self.plan
    }

    /// Runs until every request has been issued and has finished, or until
    /// shutdown is signalled and the requests already in flight have
    /// finished.
    pub async fn run(&self, sink: OutcomeSink, shutdown_rx: ShutdownReceiver) -> RunCompletion {
        let mut state = RunState::new(shutdown_rx);
        let gate = Arc::new(Semaphore::new(self.plan.concurrency_bound));
        let mut in_flight: JoinSet<()> = JoinSet::new();

        info!(
            "Starting {} tier: batch={} tick={:?} concurrency={} total={}",
            self.plan.tier.as_str(),
            self.plan.batch_size,
            self.plan.tick,
            self.plan.concurrency_bound,
            self.total_requests
        );

        // Ticks stay on a fixed schedule; an overrun tick fires at once and
        // the schedule restarts from there without bursting to catch up.
        let mut ticker = tokio::time::interval(self.plan.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        while state.dispatched < self.total_requests {
            if state.poll_cancelled() {
                break;
            }

            let interrupted = tokio::select! {
                () = shutdown_signalled(&mut state.shutdown_rx) => true,
                tick = ticker.tick() => {
                    let late = Instant::now().saturating_duration_since(tick);
                    if late >= self.plan.tick {
                        debug!("Tick started {:?} late.", late);
                    }
                    false
                }
            };
            if interrupted {
                state.cancel();
                break;
            }

            let owed = self
                .plan
                .batch_size
                .min(self.total_requests.saturating_sub(state.dispatched));

            for _ in 0..owed {
                let permit = tokio::select! {
                    () = shutdown_signalled(&mut state.shutdown_rx) => None,
                    permit = Arc::clone(&gate).acquire_owned() => permit.ok(),
                };
                let Some(permit) = permit else {
                    state.cancel();
                    break;
                };

                state.dispatched = state.dispatched.saturating_add(1);
                let request_id = state.dispatched;
                let dispatcher = Arc::clone(&self.dispatcher);
                let sink = sink.clone();
                in_flight.spawn(async move {
                    let outcome = dispatcher.dispatch(request_id).await;
                    sink.record(outcome);
                    drop(permit);
                });

                reap_finished(&mut in_flight);
            }

            if state.cancelled {
                break;
            }
        }

        drop(sink);
        debug!(
            "Dispatch finished; waiting for {} in-flight requests.",
            in_flight.len()
        );
        while let Some(joined) = in_flight.join_next().await {
            if let Err(err) = joined {
                warn!("Request task failed: {}", err);
            }
        }

        let completion = RunCompletion {
            dispatched: state.dispatched,
            duration: state.started.elapsed(),
            cancelled: state.cancelled,
        };
        info!(
            "Run finished: dispatched={} duration={:?} cancelled={}",
            completion.dispatched, completion.duration, completion.cancelled
        );
        completion
    }
}

fn reap_finished(in_flight: &mut JoinSet<()>) {
    while let Some(joined) = in_flight.try_join_next() {
        if let Err(err) = joined {
            warn!("Request task failed: {}", err);
        }
    }
}
