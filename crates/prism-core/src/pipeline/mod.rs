//! Image processing pipeline components.
//!
//! - **loader**: decode inputs into jobs, report load failures
//! - **stages**: resize, grayscale and the rotate fan-out
//! - **saver**: persist jobs, report save failures
//! - **aggregate**: failure-stream drains
//! - **sync**: counting join over stage and drain tasks
//! - **channel**: bounded channels and the generic stage worker
//! - **store**: image decoding and encoding
//! - **transform**: pixel operations
//! - **paths**: output path derivation
//! - **discovery**: expand directories into inputs
//! - **processor**: orchestrates the full pipeline

pub mod aggregate;
pub mod channel;
pub mod discovery;
pub mod loader;
pub mod paths;
pub mod processor;
pub mod saver;
pub mod stages;
pub mod store;
pub mod sync;
pub mod transform;

#[cfg(test)]
pub(crate) mod testing;

// Re-exports for convenient access
pub use discovery::FileDiscovery;
pub use paths::{rotated_path, OutputLayout};
pub use processor::BatchPipeline;
pub use store::{FsImageStore, ImageStore};
pub use sync::JoinGroup;
pub use transform::Transformer;
