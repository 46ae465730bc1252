//! CLI argument types, parsing helpers, and interactive prompts.
mod cli;
mod defaults;
pub(crate) mod parsers;
mod prompt;


pub use crate::domain::{HttpMethod, PositiveU64};
pub use cli::TesterArgs;
pub use prompt::Prompter;

pub(crate) use defaults::DEFAULT_USER_AGENT;
