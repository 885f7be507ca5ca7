//! The transform stages: resize, grayscale and the rotate fan-out.
//!
//! Each `spawn_*` function starts one worker task bound to `input`, registers
//! it in `workers`, and returns the receiving end of its output stream. Pixel
//! work runs on the blocking pool so stages execute in parallel. A job whose
//! transform panics is reported on the shared transform failure stream.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::types::{Failure, Job};

use super::channel::{bounded_channel, PipelineStage};
use super::paths::rotated_path;
use super::sync::JoinGroup;
use super::transform::Transformer;

/// Run blocking work off the async workers.
pub(crate) async fn blocking<T, F>(stage: &'static str, f: F) -> PipelineResult<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| PipelineError::StagePanicked {
            stage: stage.to_string(),
            message: e.to_string(),
        })
}

/// Apply `f` to a job on the blocking pool.
///
/// If `f` panics the job is gone; the failure names its input path.
pub(crate) async fn transform_job<T, F>(stage: &'static str, job: Job, f: F) -> Result<T, Failure>
where
    F: FnOnce(Job) -> T + Send + 'static,
    T: Send + 'static,
{
    let input = job.input_path().to_path_buf();
    blocking(stage, move || f(job))
        .await
        .map_err(|cause| Failure::transform(input, cause))
}

/// Spawn the resize stage (1-to-1).
pub fn spawn_resize(
    input: mpsc::Receiver<Job>,
    transformer: Arc<Transformer>,
    failures: mpsc::UnboundedSender<Failure>,
    config: &PipelineConfig,
    workers: &mut JoinGroup<usize>,
) -> mpsc::Receiver<Job> {
    let (tx, rx) = bounded_channel(config);
    let stage = PipelineStage::new("resize", input, tx);
    workers.spawn(
        "resize",
        stage.run_fallible(
            move |job: Job| {
                let transformer = transformer.clone();
                transform_job("resize", job, move |job| {
                    job.map_image(|image| transformer.resize(image))
                })
            },
            failures,
        ),
    );
    rx
}

/// Spawn the grayscale stage (1-to-1).
pub fn spawn_grayscale(
    input: mpsc::Receiver<Job>,
    transformer: Arc<Transformer>,
    failures: mpsc::UnboundedSender<Failure>,
    config: &PipelineConfig,
    workers: &mut JoinGroup<usize>,
) -> mpsc::Receiver<Job> {
    let (tx, rx) = bounded_channel(config);
    let stage = PipelineStage::new("grayscale", input, tx);
    workers.spawn(
        "grayscale",
        stage.run_fallible(
            move |job: Job| {
                let transformer = transformer.clone();
                transform_job("grayscale", job, move |job| {
                    job.map_image(|image| transformer.grayscale(image))
                })
            },
            failures,
        ),
    );
    rx
}

/// Expand one job into one sibling per angle, in angle order.
///
/// Siblings keep the source's input path; each output path carries its
/// angle tag. A 360 degree entry still produces its own (identical) variant.
pub fn rotate_variants(transformer: &Transformer, job: &Job, angles: &[u32]) -> Vec<Job> {
    angles
        .iter()
        .map(|&angle| {
            job.variant(
                transformer.rotate(&job.image, angle),
                rotated_path(&job.out_path, angle),
            )
        })
        .collect()
}

/// Spawn the rotate stage (1-to-N fan-out).
pub fn spawn_rotate(
    input: mpsc::Receiver<Job>,
    transformer: Arc<Transformer>,
    angles: Arc<[u32]>,
    failures: mpsc::UnboundedSender<Failure>,
    config: &PipelineConfig,
    workers: &mut JoinGroup<usize>,
) -> mpsc::Receiver<Job> {
    let (tx, rx) = bounded_channel(config);
    let stage = PipelineStage::new("rotate", input, tx);
    workers.spawn(
        "rotate",
        stage.run_fan_out_fallible(
            move |job: Job| {
                let transformer = transformer.clone();
                let angles = angles.clone();
                transform_job("rotate", job, move |job| {
                    rotate_variants(&transformer, &job, &angles)
                })
            },
            failures,
        ),
    );
    rx
}
