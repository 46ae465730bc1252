//! HTTP client setup and single-request dispatch.
mod client;
mod dispatch;
mod dns;
mod identity;


pub use client::{ClientTimeouts, build_client};
pub use dispatch::{Dispatch, HttpDispatcher, classify_error};
pub use dns::{CachingResolver, DNS_CACHE_TTL};
pub use identity::{DEFAULT_USER_AGENT_POOL, UserAgentPool};
