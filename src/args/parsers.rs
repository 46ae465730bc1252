use url::Url;

use crate::domain::PositiveU64;
use crate::error::{AppError, AppResult, ValidationError};

pub(super) fn parse_positive_u64(s: &str) -> AppResult<PositiveU64> {
    s.parse::<PositiveU64>().map_err(AppError::from)
}

pub(crate) fn parse_bool_env(s: &str) -> AppResult<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" | "on" => Ok(true),
        "0" | "false" | "no" | "n" | "off" => Ok(false),
        _ => Err(AppError::validation(ValidationError::InvalidBoolean {
            value: s.to_owned(),
        })),
    }
}

/// Accepts absolute `http`/`https` URLs with a host.
pub(crate) fn parse_target_url(s: &str) -> Result<Url, ValidationError> {
    let trimmed = s.trim();
    let url = Url::parse(trimmed).map_err(|err| ValidationError::InvalidUrl {
        url: trimmed.to_owned(),
        source: err,
    })?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ValidationError::UnsupportedScheme {
            url: trimmed.to_owned(),
        });
    }
    if url.host_str().is_none_or(str::is_empty) {
        return Err(ValidationError::MissingHost {
            url: trimmed.to_owned(),
        });
    }
    Ok(url)
}

pub(crate) fn parse_json_body(s: &str) -> Result<serde_json::Value, ValidationError> {
    serde_json::from_str(s).map_err(|err| ValidationError::InvalidBody { source: err })
}
