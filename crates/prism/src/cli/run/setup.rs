//! Run setup: config overrides and input resolution.

use std::path::PathBuf;

use prism_core::{Config, FileDiscovery};

use super::RunArgs;

/// Layer command-line flags over the loaded configuration.
pub fn apply_overrides(config: &mut Config, args: &RunArgs) {
    if let Some(root) = &args.input_root {
        config.batch.input_root = root.clone();
    }
    if let Some(root) = &args.output_root {
        config.batch.output_root = root.clone();
    }
    if let Some(width) = args.width {
        config.transform.width = width;
    }
    if let Some(height) = args.height {
        config.transform.height = height;
    }
    if let Some(angles) = &args.angles {
        config.transform.angles = angles.clone();
    }
    if let Some(size) = args.buffer_size {
        config.pipeline.buffer_size = size;
    }
    if let Some(format) = args.format {
        config.save.format = format.to_string();
    }
}

/// Inputs named on the command line, else those from config, with
/// directories expanded into the images they contain.
pub fn resolve_inputs(args: &RunArgs, config: &Config) -> Vec<PathBuf> {
    let requested = if args.inputs.is_empty() {
        &config.batch.inputs
    } else {
        &args.inputs
    };

    let inputs = FileDiscovery::new(&config.batch).expand(requested);
    tracing::debug!("Resolved {} input(s)", inputs.len());
    inputs
}
