//! Application configuration module.
//!
//! Manages the TOML config file that points the CLI at a catalog API
//! instance.

#[allow(clippy::module_inception)]
mod config;
mod paths;

#[allow(clippy::module_name_repetitions)]
pub use config::{ApiConfig, AppConfig};
pub use paths::resolve_config_path;
