use std::io::{BufRead, Write};

use tracing::warn;
use url::Url;

use super::parsers::{parse_json_body, parse_target_url};
use crate::domain::{HttpMethod, PositiveU64};
use crate::error::{AppError, AppResult, ValidationError};

/// Line-oriented questions for values not given on the command line or in
/// a config file. Each question repeats until it gets a valid answer; a
/// closed input fails with [`ValidationError::PromptClosed`].
pub struct Prompter<R, W> {
    input: R,
    output: W,
}

impl<R, W> Prompter<R, W>
where
    R: BufRead,
    W: Write,
{
    pub const fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// # Errors
    ///
    /// Returns an error if the input closes or the terminal cannot be written.
    pub fn url(&mut self) -> AppResult<Url> {
        loop {
            let answer = self.ask("Enter API URL (e.g., https://example.com/api): ", "url")?;
            if answer.is_empty() {
                self.say("URL cannot be empty.")?;
                continue;
            }
            match parse_target_url(&answer) {
                Ok(url) => return Ok(url),
                Err(_) => self.say("Invalid URL format. Please include http:// or https://")?,
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the input closes or the terminal cannot be written.
    pub fn method(&mut self) -> AppResult<HttpMethod> {
        loop {
            let answer = self.ask("Enter HTTP method (GET/POST/PUT/DELETE): ", "method")?;
            match answer.parse::<HttpMethod>() {
                Ok(method) => return Ok(method),
                Err(_) => self.say("Invalid method. Please enter GET, POST, PUT, or DELETE.")?,
            }
        }
    }

    /// Empty input and malformed JSON both fall back to an empty object.
    ///
    /// # Errors
    ///
    /// Returns an error if the input closes or the terminal cannot be written.
    pub fn body(&mut self) -> AppResult<serde_json::Value> {
        let answer = self.ask(
            "Enter request body (JSON format, or press Enter for empty): ",
            "body",
        )?;
        if answer.is_empty() {
            return Ok(empty_body());
        }
        match parse_json_body(&answer) {
            Ok(body) => Ok(body),
            Err(err) => {
                warn!("Discarding request body: {}", err);
                self.say("Invalid JSON format. Using empty body.")?;
                Ok(empty_body())
            }
        }
    }

    /// # Errors
    ///
    /// Returns an error if the input closes or the terminal cannot be written.
    pub fn rps(&mut self) -> AppResult<PositiveU64> {
        self.positive(
            "Enter number of requests per second: ",
            "requests per second",
            "Requests per second must be greater than 0.",
        )
    }

    /// # Errors
    ///
    /// Returns an error if the input closes or the terminal cannot be written.
    pub fn total_requests(&mut self) -> AppResult<PositiveU64> {
        self.positive(
            "Enter total number of requests to send: ",
            "total requests",
            "Total requests must be greater than 0.",
        )
    }

    /// # Errors
    ///
    /// Returns an error if the input closes or the terminal cannot be written.
    pub fn random_user_agent(&mut self) -> AppResult<bool> {
        loop {
            let answer = self.ask("Use random User-Agent headers? (yes/no): ", "user agent")?;
            match answer.to_ascii_lowercase().as_str() {
                "yes" | "y" => return Ok(true),
                "no" | "n" => return Ok(false),
                _ => self.say("Please enter 'yes' or 'no'.")?,
            }
        }
    }

    fn positive(
        &mut self,
        question: &str,
        field: &'static str,
        non_positive: &str,
    ) -> AppResult<PositiveU64> {
        loop {
            let answer = self.ask(question, field)?;
            match answer.parse::<i128>() {
                Ok(value) => match u64::try_from(value).map(PositiveU64::try_from) {
                    Ok(Ok(positive)) => return Ok(positive),
                    Ok(Err(_)) | Err(_) => self.say(non_positive)?,
                },
                Err(_) => self.say("Please enter a valid number.")?,
            }
        }
    }

    fn ask(&mut self, question: &str, field: &'static str) -> AppResult<String> {
        write!(self.output, "{}", question)?;
        self.output.flush()?;
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Err(AppError::validation(ValidationError::PromptClosed {
                field,
            }));
        }
        Ok(line.trim().to_owned())
    }

    fn say(&mut self, message: &str) -> AppResult<()> {
        writeln!(self.output, "{}", message)?;
        Ok(())
    }
}

fn empty_body() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}
