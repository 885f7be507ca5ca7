//! Sub-configuration structs with their defaults.

use image::imageops::FilterType;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Batch settings: which inputs to process and where outputs land.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Marker substituted (first occurrence) in every input path
    pub input_root: String,

    /// Replacement for `input_root` when deriving output paths
    pub output_root: String,

    /// Input identifiers used when none are given on the command line
    pub inputs: Vec<PathBuf>,

    /// Extensions accepted when an input is a directory
    pub supported_formats: Vec<String>,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            input_root: "images/".to_string(),
            output_root: "images/output/".to_string(),
            inputs: Vec::new(),
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "bmp".to_string(),
                "tiff".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Pixel transform settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Resize target width (aspect ratio is not preserved)
    pub width: u32,

    /// Resize target height
    pub height: u32,

    /// Resize filter: nearest, triangle, catmullrom, gaussian, lanczos3
    pub filter: String,

    /// Ordered rotation angles in degrees, counter-clockwise.
    /// One output variant is written per angle.
    pub angles: Vec<u32>,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            width: 500,
            height: 500,
            filter: "lanczos3".to_string(),
            angles: vec![90, 180, 270, 360],
        }
    }
}

impl TransformConfig {
    /// Resolve the configured filter name.
    pub fn filter_type(&self) -> Option<FilterType> {
        match self.filter.to_lowercase().as_str() {
            "nearest" => Some(FilterType::Nearest),
            "triangle" | "bilinear" => Some(FilterType::Triangle),
            "catmullrom" | "bicubic" => Some(FilterType::CatmullRom),
            "gaussian" => Some(FilterType::Gaussian),
            "lanczos3" => Some(FilterType::Lanczos3),
            _ => None,
        }
    }
}

/// Pipeline settings for backpressure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Jobs buffered between two stages (minimum 1)
    pub buffer_size: usize,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self { buffer_size: 1 }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Maximum file size in megabytes
    pub max_file_size_mb: u64,

    /// Maximum image dimension (width or height)
    pub max_image_dimension: u32,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            max_file_size_mb: 100,
            max_image_dimension: 10000,
        }
    }
}

/// Output encoding settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Encoder: "jpeg", "png", or "auto" (from the output extension)
    pub format: String,

    /// JPEG quality (1-100)
    pub jpeg_quality: u8,

    /// Create missing output directories
    pub create_dirs: bool,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            format: "jpeg".to_string(),
            jpeg_quality: 75,
            create_dirs: true,
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}
