use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use reqwest::dns::{Addrs, Name, Resolve, Resolving};
use tokio::time::Instant;
use tracing::debug;

pub const DNS_CACHE_TTL: Duration = Duration::from_secs(300);

type ResolveError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Clone)]
struct CachedAddrs {
    addrs: Arc<[SocketAddr]>,
    resolved_at: Instant,
}

/// Resolver shared by every request of a run; answers are reused until the
/// TTL expires.
#[derive(Debug, Clone)]
pub struct CachingResolver {
    ttl: Duration,
    entries: Arc<Mutex<HashMap<String, CachedAddrs>>>,
}

impl CachingResolver {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    #[must_use]
    pub fn cached(&self, host: &str) -> Option<Arc<[SocketAddr]>> {
        let entries = self.entries();
        entries
            .get(host)
            .filter(|entry| entry.resolved_at.elapsed() < self.ttl)
            .map(|entry| Arc::clone(&entry.addrs))
    }

    pub fn store(&self, host: &str, addrs: Vec<SocketAddr>) -> Arc<[SocketAddr]> {
        let addrs: Arc<[SocketAddr]> = addrs.into();
        self.entries().insert(
            host.to_owned(),
            CachedAddrs {
                addrs: Arc::clone(&addrs),
                resolved_at: Instant::now(),
            },
        );
        addrs
    }

    async fn lookup(&self, host: &str) -> Result<Arc<[SocketAddr]>, ResolveError> {
        if let Some(addrs) = self.cached(host) {
            return Ok(addrs);
        }

        // Port 0 is replaced with the request's port by the connector.
        let addrs: Vec<SocketAddr> = tokio::net::lookup_host((host, 0)).await?.collect();
        if addrs.is_empty() {
            return Err(Box::new(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("No addresses resolved for {}.", host),
            )));
        }
        debug!("Resolved {} to {} address(es).", host, addrs.len());
        Ok(self.store(host, addrs))
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, CachedAddrs>> {
        match self.entries.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Resolve for CachingResolver {
    fn resolve(&self, name: Name) -> Resolving {
        let resolver = self.clone();
        Box::pin(async move {
            let addrs = resolver.lookup(name.as_str()).await?;
            let iter: Addrs = Box::new(addrs.iter().copied().collect::<Vec<_>>().into_iter());
            Ok(iter)
        })
    }
}
