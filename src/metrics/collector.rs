use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::{sync::mpsc, task::JoinHandle};
use tracing::{debug, error};

use crate::domain::RequestOutcome;
use crate::error::AppResult;

/// Append handle given to every in-flight request.
///
/// Cloning is cheap; the collector finishes once every clone is dropped.
#[derive(Clone, Debug)]
pub struct OutcomeSink {
    tx: mpsc::UnboundedSender<RequestOutcome>,
    collected: Arc<AtomicU64>,
}

impl OutcomeSink {
    pub fn record(&self, outcome: RequestOutcome) {
        if self.tx.send(outcome).is_err() {
            error!("Result collector stopped before an outcome could be recorded.");
        }
    }

    #[must_use]
    pub fn collected(&self) -> u64 {
        self.collected.load(Ordering::Acquire)
    }

    #[must_use]
    pub fn counter(&self) -> Arc<AtomicU64> {
        Arc::clone(&self.collected)
    }
}

pub struct CollectorHandle {
    task: JoinHandle<Vec<RequestOutcome>>,
    collected: Arc<AtomicU64>,
}

impl CollectorHandle {
    #[must_use]
    pub fn collected(&self) -> u64 {
        self.collected.load(Ordering::Acquire)
    }

    /// Waits for every sink to be dropped and returns the finalized results.
    ///
    /// # Errors
    ///
    /// Returns an error if the collector task panicked.
    pub async fn finish(self) -> AppResult<ResultSet> {
        let outcomes = self.task.await?;
        debug!("Result collector finished with {} outcomes.", outcomes.len());
        Ok(ResultSet::from_outcomes(outcomes))
    }
}

/// Starts the collector task and returns the append side plus its handle.
#[must_use]
pub fn spawn_collector() -> (OutcomeSink, CollectorHandle) {
    let (tx, mut rx) = mpsc::unbounded_channel::<RequestOutcome>();
    let collected = Arc::new(AtomicU64::new(0));
    let counter = Arc::clone(&collected);

    let task = tokio::spawn(async move {
        let mut outcomes = Vec::new();
        while let Some(outcome) = rx.recv().await {
            outcomes.push(outcome);
            counter.fetch_add(1, Ordering::AcqRel);
        }
        outcomes
    });

    (
        OutcomeSink {
            tx,
            collected: Arc::clone(&collected),
        },
        CollectorHandle { task, collected },
    )
}

/// Every outcome of one run, in arrival order. Read-only once built.
#[derive(Debug, Clone, Default)]
pub struct ResultSet {
    outcomes: Vec<RequestOutcome>,
}

impl ResultSet {
    #[must_use]
    pub const fn from_outcomes(outcomes: Vec<RequestOutcome>) -> Self {
        Self { outcomes }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &RequestOutcome> {
        self.outcomes.iter()
    }
}
