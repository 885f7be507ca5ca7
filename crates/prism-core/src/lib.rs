//! Prism Core - a staged, concurrent image pipeline.
//!
//! A batch of images moves through independent stages connected by bounded
//! channels. Every stage runs as its own task, so different images can be at
//! different stages at the same time:
//!
//! ```text
//! Load → Resize → Grayscale → Rotate (one job per angle) → Save
//! ```
//!
//! Failures are item-scoped. A file that cannot be decoded or written is
//! reported on a failure stream and the rest of the batch carries on.
//!
//! # Usage
//!
//! ```rust,ignore
//! use prism_core::{BatchPipeline, Config};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::load()?;
//!     let pipeline = BatchPipeline::new(&config);
//!
//!     let summary = pipeline.run(config.batch.inputs.clone()).await?;
//!     println!("{} saved, {} failed", summary.saved.len(), summary.failed());
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod types;

// Re-exports for convenient access
pub use config::Config;
pub use error::{ConfigError, PipelineError, PipelineResult};
pub use pipeline::{BatchPipeline, FileDiscovery, FsImageStore, ImageStore, Transformer};
pub use types::{BatchReport, BatchSummary, Failure, FailureKind, FailureReport, Job, Saved};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
