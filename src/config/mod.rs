//! Configuration loading, merging, and collection into a [`TestConfig`].
//!
//! [`TestConfig`]: crate::domain::TestConfig
mod apply;
mod collect;
mod loader;
pub mod types;


pub use apply::apply_config;
pub use collect::collect_config;
pub use loader::load_config;

#[cfg(test)]
pub(crate) use loader::{load_config_file, load_config_from};
