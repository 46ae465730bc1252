use thiserror::Error;

#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Value must be >= {min}.")]
    ValueTooSmall { min: u64 },
    #[error("Invalid value: {source}")]
    InvalidNumber {
        #[source]
        source: std::num::ParseIntError,
    },
    #[error("Invalid boolean '{value}'. Expected true/false, yes/no, on/off, or 1/0.")]
    InvalidBoolean { value: String },
    #[error("Missing {field} (set --{flag} or provide it in config).")]
    MissingField {
        field: &'static str,
        flag: &'static str,
    },
    #[error("Invalid URL '{url}': {source}")]
    InvalidUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },
    #[error("Invalid URL '{url}'. Please include http:// or https://")]
    UnsupportedScheme { url: String },
    #[error("Invalid URL '{url}'. Host must not be empty.")]
    MissingHost { url: String },
    #[error("Invalid HTTP method '{value}'. Use GET, POST, PUT, or DELETE.")]
    InvalidMethod { value: String },
    #[error("Invalid JSON body: {source}")]
    InvalidBody {
        #[source]
        source: serde_json::Error,
    },
    #[error("User-Agent pool must not be empty when rotation is enabled.")]
    EmptyUserAgentPool,
    #[error("Input closed before {field} was provided.")]
    PromptClosed { field: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}")]
    TestExpectation { message: &'static str },
    #[cfg(test)]
    #[error("Test expectation failed: {message}: {value}")]
    TestExpectationValue {
        message: &'static str,
        value: String,
    },
}
