use std::num::NonZeroU64;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, ValidationError};

#[derive(Debug, Clone, Copy, ValueEnum, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HttpMethod {
    #[serde(alias = "GET")]
    Get,
    #[serde(alias = "POST")]
    Post,
    #[serde(alias = "PUT")]
    Put,
    #[serde(alias = "DELETE")]
    Delete,
}

impl HttpMethod {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }

    /// Only POST and PUT send a request body.
    #[must_use]
    pub const fn carries_body(self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put)
    }

    #[must_use]
    pub fn to_reqwest(self) -> reqwest::Method {
        match self {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
            HttpMethod::Put => reqwest::Method::PUT,
            HttpMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            _ => Err(AppError::validation(ValidationError::InvalidMethod {
                value: s.to_owned(),
            })),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct PositiveU64(NonZeroU64);

impl PositiveU64 {
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0.get()
    }
}

impl TryFrom<u64> for PositiveU64 {
    type Error = ValidationError;

    fn try_from(value: u64) -> Result<Self, Self::Error> {
        NonZeroU64::new(value)
            .map(PositiveU64)
            .ok_or(ValidationError::ValueTooSmall { min: 1 })
    }
}

impl std::str::FromStr for PositiveU64 {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let value: u64 = s
            .trim()
            .parse()
            .map_err(|err| ValidationError::InvalidNumber { source: err })?;
        PositiveU64::try_from(value)
    }
}

impl From<PositiveU64> for u64 {
    fn from(value: PositiveU64) -> Self {
        value.get()
    }
}

/// Immutable description of one load test run.
///
/// Built once by the config collector and only ever borrowed by the engine.
/// The positive counts are carried by [`PositiveU64`], so a constructed
/// config always has `target_rps > 0` and `total_requests > 0`.
#[derive(Debug, Clone, PartialEq)]
pub struct TestConfig {
    pub url: Url,
    pub method: HttpMethod,
    pub body: Option<serde_json::Value>,
    pub target_rps: PositiveU64,
    pub total_requests: PositiveU64,
    pub rotate_user_agent: bool,
    pub user_agents: Vec<String>,
}

impl TestConfig {
    #[must_use]
    pub fn new(
        url: Url,
        method: HttpMethod,
        target_rps: PositiveU64,
        total_requests: PositiveU64,
    ) -> Self {
        Self {
            url,
            method,
            body: None,
            target_rps,
            total_requests,
            rotate_user_agent: false,
            user_agents: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_body(mut self, body: serde_json::Value) -> Self {
        self.body = Some(body);
        self
    }

    #[must_use]
    pub fn with_user_agent_rotation(mut self, user_agents: Vec<String>) -> Self {
        self.rotate_user_agent = true;
        self.user_agents = user_agents;
        self
    }

    /// The body actually sent on the wire, if the method carries one.
    #[must_use]
    pub fn request_body(&self) -> Option<&serde_json::Value> {
        if self.method.carries_body() {
            self.body.as_ref()
        } else {
            None
        }
    }
}
