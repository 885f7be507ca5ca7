//! Expanding command-line inputs into input identifiers.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::BatchConfig;

/// Expands directories into the image files they contain.
pub struct FileDiscovery {
    supported_formats: Vec<String>,
}

impl FileDiscovery {
    /// Create a new file discovery instance.
    pub fn new(config: &BatchConfig) -> Self {
        Self {
            supported_formats: config
                .supported_formats
                .iter()
                .map(|f| f.to_lowercase())
                .collect(),
        }
    }

    /// Expand a list of inputs, preserving their order.
    ///
    /// Directories are walked recursively for supported files, sorted by
    /// path. Anything else is passed through untouched, so a missing or
    /// unreadable file still reaches the loader and is reported there.
    pub fn expand(&self, inputs: &[PathBuf]) -> Vec<PathBuf> {
        let mut expanded = Vec::with_capacity(inputs.len());
        for input in inputs {
            if input.is_dir() {
                let found = self.discover(input);
                if found.is_empty() {
                    tracing::warn!("No supported image files found in {:?}", input);
                }
                expanded.extend(found);
            } else {
                expanded.push(input.clone());
            }
        }
        expanded
    }

    /// Find every supported file under `dir`.
    pub fn discover(&self, dir: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = WalkDir::new(dir)
            .follow_links(true)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file() && self.is_supported(e.path()))
            .map(|e| e.into_path())
            .collect();

        // Sort by path for deterministic ordering
        files.sort();
        files
    }

    /// Check if a file has a supported extension.
    fn is_supported(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| {
                let ext_lower = ext.to_lowercase();
                self.supported_formats.iter().any(|fmt| *fmt == ext_lower)
            })
            .unwrap_or(false)
    }
}
