//! Core data types flowing through the Prism pipeline.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::PipelineError;

/// The unit of work handed from stage to stage.
///
/// A `Job` owns its image. Sending it over a channel moves the image to the
/// next stage, so no two stages ever see the same bitmap at once.
#[derive(Debug)]
pub struct Job {
    input_path: PathBuf,
    /// Current decoded bitmap
    pub image: DynamicImage,
    /// Where this variant will be persisted
    pub out_path: PathBuf,
}

impl Job {
    /// Create a job for a freshly decoded input.
    pub fn new(input_path: PathBuf, image: DynamicImage, out_path: PathBuf) -> Self {
        Self {
            input_path,
            image,
            out_path,
        }
    }

    /// The source identifier this job was decoded from.
    pub fn input_path(&self) -> &Path {
        &self.input_path
    }

    /// Replace the image, keeping both paths.
    pub fn map_image<F>(self, f: F) -> Self
    where
        F: FnOnce(DynamicImage) -> DynamicImage,
    {
        Self {
            image: f(self.image),
            ..self
        }
    }

    /// Create a sibling job sharing this job's input path.
    pub fn variant(&self, image: DynamicImage, out_path: PathBuf) -> Self {
        Self {
            input_path: self.input_path.clone(),
            image,
            out_path,
        }
    }
}

/// Success marker emitted by the saver for every persisted job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Saved {
    /// Source the variant was derived from
    pub input_path: PathBuf,
    /// File that was written
    pub out_path: PathBuf,
    /// Width of the written image
    pub width: u32,
    /// Height of the written image
    pub height: u32,
}

/// Which side stream a failure was reported on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailureKind {
    /// Decoding an input failed; no job was produced
    Load,
    /// Resizing, grayscale conversion or rotation failed; the job was dropped
    Transform,
    /// Persisting a job failed
    Save,
}

/// An item-scoped failure. Never fatal to the batch.
#[derive(Debug)]
pub struct Failure {
    pub kind: FailureKind,
    /// Input path for load and transform failures, output path for save failures
    pub path: PathBuf,
    pub cause: PipelineError,
}

impl Failure {
    pub fn load(path: PathBuf, cause: PipelineError) -> Self {
        Self {
            kind: FailureKind::Load,
            path,
            cause,
        }
    }

    pub fn transform(path: PathBuf, cause: PipelineError) -> Self {
        Self {
            kind: FailureKind::Transform,
            path,
            cause,
        }
    }

    pub fn save(path: PathBuf, cause: PipelineError) -> Self {
        Self {
            kind: FailureKind::Save,
            path,
            cause,
        }
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            FailureKind::Load => write!(
                f,
                "Error loading image from {}: {}",
                self.path.display(),
                self.cause
            ),
            FailureKind::Transform => write!(
                f,
                "Error transforming image from {}: {}",
                self.path.display(),
                self.cause
            ),
            FailureKind::Save => write!(
                f,
                "Error saving image to {}: {}",
                self.path.display(),
                self.cause
            ),
        }
    }
}

impl std::error::Error for Failure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.cause)
    }
}

/// Outcome of a complete batch run.
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Number of input identifiers submitted
    pub inputs: usize,
    /// Success markers in the order they were drained
    pub saved: Vec<Saved>,
    /// Failures drained from the loader's failure stream
    pub load_failures: Vec<Failure>,
    /// Jobs dropped by the resize, grayscale or rotate stages
    pub transform_failures: Vec<Failure>,
    /// Failures drained from the saver's failure stream
    pub save_failures: Vec<Failure>,
    /// Wall-clock time for the whole batch
    pub elapsed: Duration,
}

impl BatchSummary {
    /// Total failures across every stream.
    pub fn failed(&self) -> usize {
        self.load_failures.len() + self.transform_failures.len() + self.save_failures.len()
    }

    /// True when no item failed.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    /// Serializable view for JSON output.
    pub fn report(&self) -> BatchReport {
        BatchReport {
            inputs: self.inputs,
            saved: self.saved.clone(),
            failures: self
                .load_failures
                .iter()
                .chain(&self.transform_failures)
                .chain(&self.save_failures)
                .map(FailureReport::from)
                .collect(),
            elapsed_ms: self.elapsed.as_millis() as u64,
        }
    }
}

/// JSON-friendly rendering of a [`BatchSummary`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub inputs: usize,
    pub saved: Vec<Saved>,
    pub failures: Vec<FailureReport>,
    pub elapsed_ms: u64,
}

/// JSON-friendly rendering of a [`Failure`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureReport {
    pub kind: FailureKind,
    pub path: PathBuf,
    pub message: String,
}

impl From<&Failure> for FailureReport {
    fn from(failure: &Failure) -> Self {
        Self {
            kind: failure.kind,
            path: failure.path.clone(),
            message: failure.cause.to_string(),
        }
    }
}
