use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use tracing::debug;

use crate::args::DEFAULT_USER_AGENT;
use crate::error::{AppError, AppResult, HttpError};
use crate::rate::TierPlan;

use super::dns::{CachingResolver, DNS_CACHE_TTL};

/// Connect and total request timeouts applied to every dispatched request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientTimeouts {
    pub connect: Duration,
    pub total: Duration,
}

impl Default for ClientTimeouts {
    fn default() -> Self {
        Self {
            connect: Duration::from_secs(10),
            total: Duration::from_secs(30),
        }
    }
}

/// Builds the run-scoped client: pool sized to the tier's concurrency bound
/// and a DNS cache with a five minute TTL. Dropping the client tears both
/// down.
///
/// # Errors
///
/// Returns an error when the TLS backend or client configuration fails.
pub fn build_client(plan: &TierPlan, timeouts: ClientTimeouts) -> AppResult<Client> {
    debug!(
        "Building HTTP client: pool={} connect_timeout={:?} timeout={:?}",
        plan.concurrency_bound, timeouts.connect, timeouts.total
    );
    Client::builder()
        .connect_timeout(timeouts.connect)
        .timeout(timeouts.total)
        .pool_max_idle_per_host(plan.concurrency_bound)
        .dns_resolver(Arc::new(CachingResolver::new(DNS_CACHE_TTL)))
        .user_agent(DEFAULT_USER_AGENT)
        .build()
        .map_err(|err| AppError::http(HttpError::BuildClientFailed { source: err }))
}
