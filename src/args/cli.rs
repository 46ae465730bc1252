use clap::Parser;

use super::parsers::{parse_bool_env, parse_positive_u64};
use crate::domain::{HttpMethod, PositiveU64};

#[derive(Debug, Parser, Clone, Default)]
#[clap(
    version,
    about = "Tiered-rate async HTTP load tester - sustained RPS pacing, bounded concurrency, and latency/error statistics for API capacity testing."
)]
pub struct TesterArgs {
    /// Target URL (http:// or https://)
    #[arg(long, short, env = "RATEWAVE_URL")]
    pub url: Option<String>,

    /// HTTP method to use
    #[arg(long, short = 'X', ignore_case = true)]
    pub method: Option<HttpMethod>,

    /// JSON request body (sent for POST/PUT)
    #[arg(long, short)]
    pub data: Option<String>,

    /// Target requests per second
    #[arg(long = "rps", short = 'r', value_parser = parse_positive_u64)]
    pub rps: Option<PositiveU64>,

    /// Total number of requests to send
    #[arg(long = "requests", short = 'n', value_parser = parse_positive_u64)]
    pub requests: Option<PositiveU64>,

    /// Rotate the User-Agent header across requests
    #[arg(
        long = "random-user-agent",
        value_parser = parse_bool_env,
        num_args = 0..=1,
        default_missing_value = "true"
    )]
    pub random_user_agent: Option<bool>,

    /// User-Agent values to rotate through (repeatable; defaults to a built-in browser set)
    #[arg(long = "user-agent", short = 'A')]
    pub user_agents: Vec<String>,

    /// Path to config file (TOML or JSON)
    #[arg(long, short = 'c', env = "RATEWAVE_CONFIG")]
    pub config: Option<String>,

    /// Write the summary as JSON to this path
    #[arg(long, short = 'o')]
    pub output: Option<String>,

    /// Never prompt; fail when a required value is missing
    #[arg(long = "no-prompt")]
    pub no_prompt: bool,

    /// Disable the progress line
    #[arg(long = "no-progress")]
    pub no_progress: bool,

    /// Disable colored output
    #[arg(long = "no-color")]
    pub no_color: bool,

    /// Enable debug logging
    #[arg(long, short)]
    pub verbose: bool,
}
