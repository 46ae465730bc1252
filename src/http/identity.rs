use std::sync::Arc;

use rand::seq::SliceRandom;
use reqwest::header::HeaderValue;

use crate::error::{AppError, AppResult, HttpError, ValidationError};

/// Built-in browser identities used when rotation is enabled without a
/// custom pool.
pub const DEFAULT_USER_AGENT_POOL: [&str; 8] = [
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (X11; Linux x86_64; rv:89.0) Gecko/20100101 Firefox/89.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Edge/91.0.864.59",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/14.1.1 Safari/605.1.15",
];

/// Header values validated once up front and picked uniformly per request.
#[derive(Debug, Clone)]
pub struct UserAgentPool {
    values: Arc<[HeaderValue]>,
}

impl UserAgentPool {
    /// Parses the pool, falling back to the built-in catalog when empty.
    ///
    /// # Errors
    ///
    /// Returns an error if a value is not a valid header value.
    pub fn from_values(values: &[String]) -> AppResult<Self> {
        let parsed = if values.is_empty() {
            DEFAULT_USER_AGENT_POOL
                .into_iter()
                .map(HeaderValue::from_static)
                .collect::<Vec<_>>()
        } else {
            let mut parsed = Vec::with_capacity(values.len());
            for value in values {
                let header = HeaderValue::from_str(value).map_err(|err| {
                    AppError::http(HttpError::InvalidUserAgent {
                        value: value.clone(),
                        source: err,
                    })
                })?;
                parsed.push(header);
            }
            parsed
        };
        if parsed.is_empty() {
            return Err(AppError::validation(ValidationError::EmptyUserAgentPool));
        }
        Ok(Self {
            values: parsed.into(),
        })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    #[must_use]
    pub fn pick(&self) -> Option<&HeaderValue> {
        self.values.choose(&mut rand::thread_rng())
    }
}
