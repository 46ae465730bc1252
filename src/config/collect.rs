use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::args::parsers::{parse_json_body, parse_target_url};
use crate::args::{HttpMethod, PositiveU64, Prompter, TesterArgs};
use crate::domain::TestConfig;
use crate::error::{AppError, AppResult, ValidationError};

/// Builds the run configuration from already-merged arguments, asking the
/// prompter for anything still missing.
///
/// Without a prompter the method defaults to GET, User-Agent rotation
/// defaults to off, and a missing URL or count is an error.
///
/// # Errors
///
/// Returns an error for a malformed URL or body, a missing required value,
/// or a closed prompt input.
pub fn collect_config<R, W>(
    args: &TesterArgs,
    mut prompter: Option<&mut Prompter<R, W>>,
) -> AppResult<TestConfig>
where
    R: BufRead,
    W: Write,
{
    let url = match (args.url.as_deref(), prompter.as_deref_mut()) {
        (Some(raw), _) => parse_target_url(raw).map_err(AppError::validation)?,
        (None, Some(prompter)) => prompter.url()?,
        (None, None) => return Err(missing("url", "url")),
    };

    let method = match (args.method, prompter.as_deref_mut()) {
        (Some(method), _) => method,
        (None, Some(prompter)) => prompter.method()?,
        (None, None) => HttpMethod::Get,
    };

    let body = if method.carries_body() {
        match (args.data.as_deref(), prompter.as_deref_mut()) {
            (Some(raw), _) => Some(parse_json_body(raw).map_err(AppError::validation)?),
            (None, Some(prompter)) => Some(prompter.body()?),
            (None, None) => None,
        }
    } else {
        if args.data.is_some() {
            warn!("Ignoring request body: {} requests carry no body.", method.as_str());
        }
        None
    };

    let target_rps = positive_or_prompt(args.rps, prompter.as_deref_mut(), Field::Rps)?;
    let total_requests =
        positive_or_prompt(args.requests, prompter.as_deref_mut(), Field::Requests)?;

    let rotate = match (args.random_user_agent, prompter.as_deref_mut()) {
        (Some(rotate), _) => rotate,
        (None, _) if !args.user_agents.is_empty() => true,
        (None, Some(prompter)) => prompter.random_user_agent()?,
        (None, None) => false,
    };

    let mut config = TestConfig::new(url, method, target_rps, total_requests);
    if let Some(body) = body {
        config = config.with_body(body);
    }
    if rotate {
        config = config.with_user_agent_rotation(args.user_agents.clone());
    }
    debug!("Collected config: {:?}", config);
    Ok(config)
}

#[derive(Clone, Copy)]
enum Field {
    Rps,
    Requests,
}

fn positive_or_prompt<R, W>(
    value: Option<PositiveU64>,
    prompter: Option<&mut Prompter<R, W>>,
    field: Field,
) -> AppResult<PositiveU64>
where
    R: BufRead,
    W: Write,
{
    match (value, prompter, field) {
        (Some(value), _, _) => Ok(value),
        (None, Some(prompter), Field::Rps) => prompter.rps(),
        (None, Some(prompter), Field::Requests) => prompter.total_requests(),
        (None, None, Field::Rps) => Err(missing("requests per second", "rps")),
        (None, None, Field::Requests) => Err(missing("total requests", "requests")),
    }
}

fn missing(field: &'static str, flag: &'static str) -> AppError {
    AppError::validation(ValidationError::MissingField { field, flag })
}
