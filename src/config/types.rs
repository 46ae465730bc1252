use serde::Deserialize;

use crate::domain::HttpMethod;

/// On-disk configuration. Every key is optional; command-line values win.
#[derive(Debug, Default, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub url: Option<String>,
    pub method: Option<HttpMethod>,
    pub body: Option<serde_json::Value>,
    pub rps: Option<u64>,
    pub requests: Option<u64>,
    pub random_user_agent: Option<bool>,
    pub user_agents: Option<Vec<String>>,
    pub output: Option<String>,
}
