//! The loader: input identifiers in, jobs and load failures out.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::config::PipelineConfig;
use crate::types::{Failure, Job};

use super::channel::{bounded_channel, failure_channel};
use super::paths::OutputLayout;
use super::stages::blocking;
use super::store::ImageStore;
use super::sync::JoinGroup;

/// Spawn the loader.
///
/// Every identifier is decoded exactly once, in order. A decoded input
/// becomes a [`Job`] on the returned job stream; anything else becomes a load
/// [`Failure`] on the failure stream. Both streams close after the last
/// identifier has been handled.
pub fn spawn_loader(
    inputs: Vec<PathBuf>,
    store: Arc<dyn ImageStore>,
    layout: OutputLayout,
    config: &PipelineConfig,
    workers: &mut JoinGroup<usize>,
) -> (mpsc::Receiver<Job>, mpsc::UnboundedReceiver<Failure>) {
    let (tx, rx) = bounded_channel(config);
    let (failures, failures_rx) = failure_channel();

    workers.spawn("load", async move {
        let mut emitted = 0;
        for path in inputs {
            let decode_store = store.clone();
            let decode_path = path.clone();
            let decoded = blocking("load", move || decode_store.decode(&decode_path))
                .await
                .and_then(|result| result);

            match decoded {
                Ok(image) => {
                    let out_path = layout.output_path(&path);
                    tracing::debug!("Loaded {:?} -> {:?}", path, out_path);
                    if tx.send(Job::new(path, image, out_path)).await.is_err() {
                        tracing::warn!("load stage: downstream closed, stopping");
                        break;
                    }
                    emitted += 1;
                }
                Err(cause) => {
                    tracing::debug!("load stage: {:?} failed: {}", path, cause);
                    if failures.send(Failure::load(path, cause)).is_err() {
                        tracing::warn!("load stage: failure stream closed");
                    }
                }
            }
        }
        tracing::debug!("load stage finished ({} forwarded)", emitted);
        emitted
    });

    (rx, failures_rx)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::testing::MemoryStore;
    use crate::types::FailureKind;
    use image::GenericImageView;
    use std::path::Path;

    fn layout() -> OutputLayout {
        OutputLayout::new("images/", "images/output/")
    }

    #[tokio::test]
    async fn test_every_input_lands_on_exactly_one_stream() {
        let store = MemoryStore::new()
            .with_image("images/1.jpg", 4, 4)
            .with_image("images/3.jpg", 4, 4)
            .with_image("images/5.jpg", 4, 4);
        let inputs: Vec<PathBuf> = (1..=6)
            .map(|i| PathBuf::from(format!("images/{i}.jpg")))
            .collect();

        let mut workers = JoinGroup::new();
        let (mut jobs, mut failures) = spawn_loader(
            inputs,
            Arc::new(store),
            layout(),
            &PipelineConfig::default(),
            &mut workers,
        );

        let mut loaded = Vec::new();
        while let Some(job) = jobs.recv().await {
            loaded.push(job.input_path().to_path_buf());
        }
        let mut failed = Vec::new();
        while let Some(failure) = failures.recv().await {
            assert_eq!(failure.kind, FailureKind::Load);
            failed.push(failure.path);
        }

        assert_eq!(loaded.len(), 3);
        assert_eq!(failed.len(), 3);
        assert_eq!(loaded[0], Path::new("images/1.jpg"));
        assert_eq!(failed[0], Path::new("images/2.jpg"));
        assert_eq!(workers.wait().await.unwrap(), vec![3]);
    }

    #[tokio::test]
    async fn test_duplicates_are_processed_each_time() {
        let store = MemoryStore::new().with_image("images/a.png", 8, 6);
        let inputs = vec![PathBuf::from("images/a.png"), PathBuf::from("images/a.png")];

        let mut workers = JoinGroup::new();
        let (mut jobs, _failures) = spawn_loader(
            inputs,
            Arc::new(store),
            layout(),
            &PipelineConfig::default(),
            &mut workers,
        );

        let mut count = 0;
        while let Some(job) = jobs.recv().await {
            assert_eq!(job.out_path, PathBuf::from("images/output/a.png"));
            assert_eq!(job.image.dimensions(), (8, 6));
            count += 1;
        }
        assert_eq!(count, 2);
    }

    #[tokio::test]
    async fn test_empty_input_closes_both_streams() {
        let mut workers = JoinGroup::new();
        let (mut jobs, mut failures) = spawn_loader(
            Vec::new(),
            Arc::new(MemoryStore::new()),
            layout(),
            &PipelineConfig::default(),
            &mut workers,
        );

        assert!(jobs.recv().await.is_none());
        assert!(failures.recv().await.is_none());
        assert_eq!(workers.wait().await.unwrap(), vec![0]);
    }
}
