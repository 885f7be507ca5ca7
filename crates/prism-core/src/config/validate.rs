//! Configuration validation with range checks.

use std::collections::HashSet;

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.batch.input_root.is_empty() {
            return Err(ConfigError::ValidationError(
                "batch.input_root must not be empty".into(),
            ));
        }
        if self.transform.width == 0 || self.transform.height == 0 {
            return Err(ConfigError::ValidationError(
                "transform.width and transform.height must be > 0".into(),
            ));
        }
        if self.transform.filter_type().is_none() {
            return Err(ConfigError::ValidationError(format!(
                "transform.filter '{}' is not a known filter",
                self.transform.filter
            )));
        }
        if self.transform.angles.is_empty() {
            return Err(ConfigError::ValidationError(
                "transform.angles must list at least one angle".into(),
            ));
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.transform.angles.iter().find(|a| !seen.insert(**a)) {
            return Err(ConfigError::ValidationError(format!(
                "transform.angles contains {dup} more than once"
            )));
        }
        if self.pipeline.buffer_size == 0 {
            return Err(ConfigError::ValidationError(
                "pipeline.buffer_size must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.limits.max_image_dimension == 0 {
            return Err(ConfigError::ValidationError(
                "limits.max_image_dimension must be > 0".into(),
            ));
        }
        if !matches!(self.save.format.as_str(), "jpeg" | "jpg" | "png" | "auto") {
            return Err(ConfigError::ValidationError(format!(
                "save.format '{}' must be one of jpeg, png, auto",
                self.save.format
            )));
        }
        if self.save.jpeg_quality == 0 || self.save.jpeg_quality > 100 {
            return Err(ConfigError::ValidationError(
                "save.jpeg_quality must be between 1 and 100".into(),
            ));
        }
        Ok(())
    }
}
