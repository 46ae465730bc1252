use crate::args::{PositiveU64, TesterArgs};
use crate::error::{AppError, AppResult, ConfigError};

use super::types::ConfigFile;

/// Fills every value the command line left unset from the config file.
///
/// # Errors
///
/// Returns an error when a count in the file is zero.
pub fn apply_config(args: &mut TesterArgs, config: ConfigFile) -> AppResult<()> {
    if args.url.is_none() {
        args.url = config.url;
    }
    if args.method.is_none() {
        args.method = config.method;
    }
    if args.data.is_none() {
        args.data = config.body.map(|body| match body {
            serde_json::Value::String(raw) => raw,
            other => other.to_string(),
        });
    }
    if args.rps.is_none()
        && let Some(rps) = config.rps
    {
        args.rps = Some(ensure_positive_u64(rps, "rps")?);
    }
    if args.requests.is_none()
        && let Some(requests) = config.requests
    {
        args.requests = Some(ensure_positive_u64(requests, "requests")?);
    }
    if args.random_user_agent.is_none() {
        args.random_user_agent = config.random_user_agent;
    }
    if args.user_agents.is_empty() {
        args.user_agents = config.user_agents.unwrap_or_default();
    }
    if args.output.is_none() {
        args.output = config.output;
    }
    Ok(())
}

fn ensure_positive_u64(value: u64, field: &str) -> AppResult<PositiveU64> {
    PositiveU64::try_from(value).map_err(|err| {
        AppError::config(ConfigError::FieldMustBePositive {
            field: field.to_owned(),
            source: err,
        })
    })
}
