//! Run orchestration and the user-facing renderings of its result.
mod export;
mod progress;
mod runner;
pub(crate) mod summary;

#[cfg(test)]
mod tests;

pub(crate) use export::export_json;
pub(crate) use summary::{render_completion, render_run_header};
pub use runner::{RunOptions, RunReport, run_load_test};
pub use summary::render_summary;
