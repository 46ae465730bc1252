use std::error::Error as StdError;
use std::sync::Arc;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::{
    Client, Url,
    header::{CONTENT_TYPE, HeaderValue, USER_AGENT},
};
use tokio::time::Instant;
use tracing::debug;

use crate::domain::{ErrorKind, HttpMethod, RequestOutcome, TestConfig};
use crate::error::AppResult;

use super::identity::UserAgentPool;

/// Issues one request and always reports an outcome.
///
/// Implementations never surface request-level failures as errors; they are
/// folded into [`RequestOutcome::failure`].
#[async_trait]
pub trait Dispatch: Send + Sync {
    async fn dispatch(&self, request_id: u64) -> RequestOutcome;
}

#[derive(Debug, Clone)]
pub struct HttpDispatcher {
    client: Client,
    method: HttpMethod,
    url: Url,
    body: Option<Arc<serde_json::Value>>,
    user_agents: Option<UserAgentPool>,
}

impl HttpDispatcher {
    /// Prepares the per-run request template.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured User-Agent pool is invalid.
    pub fn new(client: Client, config: &TestConfig) -> AppResult<Self> {
        let user_agents = if config.rotate_user_agent {
            Some(UserAgentPool::from_values(&config.user_agents)?)
        } else {
            None
        };
        Ok(Self {
            client,
            method: config.method,
            url: config.url.clone(),
            body: config.request_body().cloned().map(Arc::new),
            user_agents,
        })
    }

    async fn send(&self) -> Result<reqwest::Response, reqwest::Error> {
        let mut builder = self
            .client
            .request(self.method.to_reqwest(), self.url.clone())
            .header(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Some(user_agent) = self.user_agents.as_ref().and_then(UserAgentPool::pick) {
            builder = builder.header(USER_AGENT, user_agent.clone());
        }
        if let Some(body) = self.body.as_deref() {
            builder = builder.json(body);
        }
        let request = builder.build()?;
        self.client.execute(request).await
    }
}

#[async_trait]
impl Dispatch for HttpDispatcher {
    /// The outcome is fixed once the status line arrives. The body is then
    /// drained so the connection can be reused; a broken or slow body never
    /// changes the outcome or its latency.
    async fn dispatch(&self, request_id: u64) -> RequestOutcome {
        let start = Instant::now();
        match self.send().await {
            Ok(response) => {
                let status = response.status().as_u16();
                let outcome = RequestOutcome::success(status, start.elapsed());
                if let Err(err) = drain_response_body(response).await {
                    debug!("Request {} body was not fully read: {}", request_id, err);
                }
                outcome
            }
            Err(err) => {
                let kind = classify_error(&err);
                debug!("Request {} failed ({}): {}", request_id, kind.as_str(), err);
                RequestOutcome::failure(kind, start.elapsed())
            }
        }
    }
}

/// Maps a client error onto exactly one [`ErrorKind`].
#[must_use]
pub fn classify_error(err: &reqwest::Error) -> ErrorKind {
    if err.is_timeout() || has_io_source(err, |io| io.kind() == std::io::ErrorKind::TimedOut) {
        return ErrorKind::Timeout;
    }
    if err.is_connect() || has_io_source(err, |_| true) {
        return ErrorKind::ConnectionError;
    }
    if err.is_builder()
        || err.is_request()
        || err.is_body()
        || err.is_decode()
        || err.is_redirect()
        || err.is_status()
    {
        return ErrorKind::ClientError;
    }
    ErrorKind::Unexpected
}

fn has_io_source(err: &reqwest::Error, matches: impl Fn(&std::io::Error) -> bool) -> bool {
    let mut source = err.source();
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>()
            && matches(io)
        {
            return true;
        }
        source = cause.source();
    }
    false
}

async fn drain_response_body(response: reqwest::Response) -> Result<u64, reqwest::Error> {
    let mut stream = response.bytes_stream();
    let mut total_bytes: u64 = 0;
    while let Some(chunk) = stream.next().await {
        let bytes = chunk?;
        total_bytes = total_bytes.saturating_add(u64::try_from(bytes.len()).unwrap_or(u64::MAX));
    }
    Ok(total_bytes)
}
