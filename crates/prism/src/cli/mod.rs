//! Command handlers.

pub mod config;
pub mod run;

use std::path::Path;

use prism_core::{Config, ConfigError};

/// Load configuration from `path`, or from the default location.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}
