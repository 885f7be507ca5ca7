//! Pipeline orchestration - wires together all processing stages.
//!
//! ```text
//! load ─► resize ─► grayscale ─► rotate (×angles) ─► save ─► success drain
//!   │        │          │           │                  │
//!   │        └──────────┴───────────┴─► transform failures ─► drain
//!   └─► load failures ─► drain                save failures ─► drain
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use crate::config::{Config, PipelineConfig};
use crate::error::PipelineResult;
use crate::types::{BatchSummary, Failure, Saved};

use super::aggregate::spawn_drain;
use super::channel::failure_channel;
use super::loader::spawn_loader;
use super::paths::OutputLayout;
use super::saver::spawn_saver;
use super::stages::{spawn_grayscale, spawn_resize, spawn_rotate};
use super::store::{FsImageStore, ImageStore};
use super::sync::JoinGroup;
use super::transform::Transformer;

/// Runs batches through the staged pipeline.
pub struct BatchPipeline {
    store: Arc<dyn ImageStore>,
    transformer: Arc<Transformer>,
    layout: OutputLayout,
    angles: Arc<[u32]>,
    pipeline: PipelineConfig,
}

impl BatchPipeline {
    /// Create a pipeline that reads and writes the local file system.
    pub fn new(config: &Config) -> Self {
        let store = FsImageStore::new(config.limits.clone(), config.save.clone());
        Self::with_store(config, Arc::new(store))
    }

    /// Create a pipeline over a custom image store.
    pub fn with_store(config: &Config, store: Arc<dyn ImageStore>) -> Self {
        Self {
            store,
            transformer: Arc::new(Transformer::new(&config.transform)),
            layout: OutputLayout::new(config.input_root(), config.output_root()),
            angles: Arc::from(config.transform.angles.as_slice()),
            pipeline: config.pipeline.clone(),
        }
    }

    /// Rotation angles applied to every input, in output order.
    pub fn angles(&self) -> &[u32] {
        &self.angles
    }

    /// Run a batch to completion.
    pub async fn run(&self, inputs: Vec<PathBuf>) -> PipelineResult<BatchSummary> {
        self.run_with(inputs, |_| {}).await
    }

    /// Run a batch, calling `on_saved` for every success marker as it arrives.
    ///
    /// Returns once the success stream is exhausted and every failure drain
    /// has finished. Item failures are collected into the summary; only a
    /// crashed stage worker makes this return an error.
    pub async fn run_with<F>(
        &self,
        inputs: Vec<PathBuf>,
        mut on_saved: F,
    ) -> PipelineResult<BatchSummary>
    where
        F: FnMut(&Saved),
    {
        let start = Instant::now();
        let input_count = inputs.len();
        tracing::info!(
            "Processing {} input(s), {} variant(s) each",
            input_count,
            self.angles.len()
        );

        let mut workers = JoinGroup::new();
        let (jobs, load_failures) = spawn_loader(
            inputs,
            self.store.clone(),
            self.layout.clone(),
            &self.pipeline,
            &mut workers,
        );
        let (transform_failures, transform_failures_rx) = failure_channel();
        let resized = spawn_resize(
            jobs,
            self.transformer.clone(),
            transform_failures.clone(),
            &self.pipeline,
            &mut workers,
        );
        let gray = spawn_grayscale(
            resized,
            self.transformer.clone(),
            transform_failures.clone(),
            &self.pipeline,
            &mut workers,
        );
        let rotated = spawn_rotate(
            gray,
            self.transformer.clone(),
            self.angles.clone(),
            transform_failures,
            &self.pipeline,
            &mut workers,
        );
        let (mut saved_rx, save_failures) =
            spawn_saver(rotated, self.store.clone(), &self.pipeline, &mut workers);

        let mut drains = JoinGroup::new();
        spawn_drain(&mut drains, "load-failures", load_failures);
        spawn_drain(&mut drains, "transform-failures", transform_failures_rx);
        spawn_drain(&mut drains, "save-failures", save_failures);

        let mut saved = Vec::new();
        while let Some(marker) = saved_rx.recv().await {
            tracing::debug!("Saved {}", marker.out_path.display());
            on_saved(&marker);
            saved.push(marker);
        }

        let mut drained = join_all(drains, workers).await?.into_iter();
        let load_failures = drained.next().unwrap_or_default();
        let transform_failures = drained.next().unwrap_or_default();
        let save_failures = drained.next().unwrap_or_default();

        let summary = BatchSummary {
            inputs: input_count,
            saved,
            load_failures,
            transform_failures,
            save_failures,
            elapsed: start.elapsed(),
        };
        tracing::info!(
            "Batch complete: {} saved, {} load, {} transform, {} save failure(s) in {:?}",
            summary.saved.len(),
            summary.load_failures.len(),
            summary.transform_failures.len(),
            summary.save_failures.len(),
            summary.elapsed
        );
        Ok(summary)
    }
}

/// Wait for the drains and the stage workers.
///
/// Both groups are awaited before any error is returned, so no task outlives
/// the batch.
async fn join_all(
    drains: JoinGroup<Vec<Failure>>,
    workers: JoinGroup<usize>,
) -> PipelineResult<Vec<Vec<Failure>>> {
    let drained = drains.wait().await;
    let finished = workers.wait().await;
    let drained = drained?;
    finished?;
    Ok(drained)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PipelineError;
    use crate::pipeline::discovery::FileDiscovery;
    use crate::pipeline::testing::{Event, MemoryStore};
    use crate::types::FailureKind;
    use image::{ColorType, DynamicImage, GenericImageView, Rgb, RgbImage};
    use std::collections::HashSet;
    use std::path::Path;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    fn config_for(root: &Path) -> Config {
        let mut config = Config::default();
        config.batch.input_root = format!("{}/images/", root.display());
        config.batch.output_root = format!("{}/images/output/", root.display());
        config
    }

    #[tokio::test]
    async fn test_decodable_and_corrupt_inputs() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let images = dir.path().join("images");
        std::fs::create_dir_all(&images).unwrap();

        let source = RgbImage::from_fn(800, 600, |x, y| Rgb([(x % 256) as u8, (y % 256) as u8, 90]));
        let store = FsImageStore::new(config.limits.clone(), config.save.clone());
        store
            .encode(&DynamicImage::ImageRgb8(source), &images.join("a.jpg"))
            .unwrap();
        std::fs::write(images.join("b.jpg"), b"\xFF\xD8\xFF garbage").unwrap();

        let pipeline = BatchPipeline::new(&config);
        let summary = pipeline
            .run(vec![images.join("a.jpg"), images.join("b.jpg")])
            .await
            .unwrap();

        assert_eq!(summary.inputs, 2);
        assert_eq!(summary.load_failures.len(), 1);
        assert_eq!(summary.load_failures[0].kind, FailureKind::Load);
        assert_eq!(summary.load_failures[0].path, images.join("b.jpg"));
        assert!(summary.save_failures.is_empty());

        let outputs = dir.path().join("images/output");
        let expected: Vec<PathBuf> = ["a_90.jpg", "a_180.jpg", "a_270.jpg", "a_360.jpg"]
            .iter()
            .map(|name| outputs.join(name))
            .collect();
        let saved: Vec<PathBuf> = summary.saved.iter().map(|s| s.out_path.clone()).collect();
        assert_eq!(saved, expected);

        for marker in &summary.saved {
            assert_eq!(marker.input_path, images.join("a.jpg"));
            assert_eq!((marker.width, marker.height), (500, 500));
            let written = store.decode(&marker.out_path).unwrap();
            assert_eq!(written.dimensions(), (500, 500));
            assert_eq!(written.color(), ColorType::L8);
        }
    }

    #[tokio::test]
    async fn test_empty_batch_terminates() {
        let pipeline = BatchPipeline::with_store(&Config::default(), Arc::new(MemoryStore::new()));
        let summary = tokio::time::timeout(Duration::from_secs(5), pipeline.run(Vec::new()))
            .await
            .expect("empty batch must not hang")
            .unwrap();

        assert_eq!(summary.inputs, 0);
        assert!(summary.saved.is_empty());
        assert!(summary.is_clean());
    }

    #[tokio::test]
    async fn test_counts_match_inputs() {
        // 5 inputs, 2 undecodable: 3 x 4 variants saved, 2 load failures.
        let store = MemoryStore::new()
            .with_image("images/1.png", 30, 10)
            .with_image("images/2.png", 10, 30)
            .with_image("images/4.png", 64, 64);
        let store = Arc::new(store);
        let pipeline = BatchPipeline::with_store(&Config::default(), store.clone());

        let inputs = (1..=5)
            .map(|i| PathBuf::from(format!("images/{i}.png")))
            .collect();
        let mut progress = 0;
        let summary = pipeline.run_with(inputs, |_| progress += 1).await.unwrap();

        assert_eq!(summary.saved.len(), 12);
        assert_eq!(progress, 12);
        assert_eq!(summary.load_failures.len(), 2);
        assert_eq!(summary.failed(), 2);
        for written in store.written() {
            assert_eq!((written.width, written.height), (500, 500));
            assert_eq!(written.color, ColorType::L8);
            assert!(written.path.starts_with("images/output"));
        }
    }

    #[tokio::test]
    async fn test_save_failures_are_collected_not_fatal() {
        let store = Arc::new(
            MemoryStore::new()
                .with_image("images/a.jpg", 8, 8)
                .with_image("images/b.jpg", 8, 8)
                .failing_writes_to("_270"),
        );
        let pipeline = BatchPipeline::with_store(&Config::default(), store);

        let summary = pipeline
            .run(vec![PathBuf::from("images/a.jpg"), PathBuf::from("images/b.jpg")])
            .await
            .unwrap();

        assert_eq!(summary.saved.len(), 6);
        assert_eq!(summary.save_failures.len(), 2);
        assert!(summary
            .save_failures
            .iter()
            .all(|f| f.kind == FailureKind::Save && f.path.to_string_lossy().ends_with("_270.jpg")));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_slow_saver_throttles_loader() {
        let mut store = MemoryStore::new().slow_writes(Duration::from_millis(3));
        let inputs: Vec<PathBuf> = (0..24)
            .map(|i| PathBuf::from(format!("images/{i}.png")))
            .collect();
        for input in &inputs {
            store = store.with_image(&input.to_string_lossy(), 16, 16);
        }
        let store = Arc::new(store);
        let mut config = Config::default();
        config.transform.width = 16;
        config.transform.height = 16;
        let pipeline = BatchPipeline::with_store(&config, store.clone());

        let summary = pipeline.run(inputs).await.unwrap();
        assert_eq!(summary.saved.len(), 96);

        // With one-slot hand-offs the loader can only run a few inputs ahead
        // of the saver; without backpressure it would decode all 24 at once.
        let mut decoded = 0i64;
        let mut encoded = 0i64;
        let mut max_lead = 0i64;
        for event in store.events() {
            match event {
                Event::Decode => decoded += 1,
                Event::Encode => encoded += 1,
            }
            max_lead = max_lead.max(decoded - encoded / 4);
        }
        assert!(max_lead <= 12, "loader ran {max_lead} inputs ahead");
    }

    #[tokio::test]
    async fn test_same_named_files_in_sibling_directories_do_not_collide() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_for(dir.path());
        let store = FsImageStore::new(config.limits.clone(), config.save.clone());
        let photos = dir.path().join("photos");
        for sub in ["x", "y"] {
            let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(40, 30, Rgb([10, 200, 30])));
            store.encode(&img, &photos.join(sub).join("a.jpg")).unwrap();
        }

        let inputs = FileDiscovery::new(&config.batch).expand(&[photos]);
        assert_eq!(inputs.len(), 2);
        let summary = BatchPipeline::new(&config).run(inputs).await.unwrap();

        assert!(summary.is_clean());
        assert_eq!(summary.saved.len(), 8);
        let outputs: HashSet<_> = summary.saved.iter().map(|s| s.out_path.clone()).collect();
        assert_eq!(outputs.len(), 8);
        for out in &outputs {
            assert!(out.starts_with(dir.path().join("images/output")));
            assert!(out.exists(), "{} was not written", out.display());
        }
    }

    #[tokio::test]
    async fn test_failed_drain_still_waits_for_workers() {
        let finished = Arc::new(AtomicBool::new(false));
        let mut drains: JoinGroup<Vec<Failure>> = JoinGroup::new();
        drains.spawn("load-failures", async { panic!("drain exploded") });
        let mut workers = JoinGroup::new();
        let done = finished.clone();
        workers.spawn("save", async move {
            tokio::time::sleep(Duration::from_millis(30)).await;
            done.store(true, Ordering::SeqCst);
            0
        });

        let err = join_all(drains, workers).await.unwrap_err();
        assert!(matches!(err, PipelineError::StagePanicked { ref stage, .. } if stage == "load-failures"));
        assert!(finished.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_clean_batch_has_no_transform_failures() {
        let store = Arc::new(MemoryStore::new().with_image("images/a.png", 12, 9));
        let pipeline = BatchPipeline::with_store(&Config::default(), store);

        let summary = pipeline.run(vec![PathBuf::from("images/a.png")]).await.unwrap();

        assert!(summary.transform_failures.is_empty());
        assert_eq!(summary.failed(), 0);
        assert_eq!(summary.saved.len(), 4);
    }
}
