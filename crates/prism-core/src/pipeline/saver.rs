//! The saver: terminal stage persisting each job.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::error::PipelineResult;
use crate::types::{Failure, Job, Saved};

use super::channel::{bounded_channel, failure_channel, PipelineStage};
use super::stages::blocking;
use super::store::ImageStore;
use super::sync::JoinGroup;

/// Persist one job, consuming it.
pub async fn save_job(store: Arc<dyn ImageStore>, job: Job) -> Result<Saved, Failure> {
    let out_path = job.out_path.clone();
    blocking("save", move || -> PipelineResult<Saved> {
        store.encode(&job.image, &job.out_path)?;
        Ok(Saved {
            input_path: job.input_path().to_path_buf(),
            width: job.image.width(),
            height: job.image.height(),
            out_path: job.out_path,
        })
    })
    .await
    .and_then(|result| result)
    .map_err(|cause| Failure::save(out_path, cause))
}

/// Spawn the saver.
///
/// Returns the success-marker stream and the save-failure stream. A failed
/// save never stops the jobs behind it.
pub fn spawn_saver(
    input: mpsc::Receiver<Job>,
    store: Arc<dyn ImageStore>,
    config: &PipelineConfig,
    workers: &mut JoinGroup<usize>,
) -> (mpsc::Receiver<Saved>, mpsc::UnboundedReceiver<Failure>) {
    let (tx, rx) = bounded_channel(config);
    let (failures, failures_rx) = failure_channel();
    let stage = PipelineStage::new("save", input, tx);

    workers.spawn(
        "save",
        stage.run_fallible(
            move |job: Job| {
                let store = store.clone();
                async move { save_job(store, job).await }
            },
            failures,
        ),
    );

    (rx, failures_rx)
}
