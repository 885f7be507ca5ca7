//! Error types for the Prism image pipeline.
//!
//! Item-scoped errors carry the path they belong to so a failure can be
//! attributed to a single input or output without halting the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

/// Pipeline errors. Most are item-scoped causes wrapped into a
/// [`Failure`](crate::types::Failure); `StagePanicked` is an orchestration fault.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// File not found
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Could not open the source file
    #[error("Failed to open image file {path}: {message}")]
    Open { path: PathBuf, message: String },

    /// Image decoding failed
    #[error("Failed to decode image {path}: {message}")]
    Decode { path: PathBuf, message: String },

    /// Unsupported image format
    #[error("Unsupported format for {path}: {format}")]
    UnsupportedFormat { path: PathBuf, format: String },

    /// File exceeds size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Image dimensions exceed limit
    #[error("Image too large: {path} ({width}x{height} > {max_dim})")]
    ImageTooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max_dim: u32,
    },

    /// Could not create the output file or its directory
    #[error("Failed to create output file {path}: {message}")]
    Create { path: PathBuf, message: String },

    /// Image encoding failed
    #[error("Failed to encode image {path}: {message}")]
    Encode { path: PathBuf, message: String },

    /// A stage worker task panicked or was aborted
    #[error("Stage '{stage}' terminated abnormally: {message}")]
    StagePanicked { stage: String, message: String },
}

/// Convenience type alias for pipeline-specific results.
pub type PipelineResult<T> = std::result::Result<T, PipelineError>;
