//! Output path derivation.
//!
//! Output locations are computed purely from strings, never by touching the
//! file system, so the same input always maps to the same output.

use std::path::{Component, Path, PathBuf};

/// Maps input identifiers to output locations.
#[derive(Debug, Clone)]
pub struct OutputLayout {
    input_root: String,
    output_root: String,
}

impl OutputLayout {
    pub fn new(input_root: impl Into<String>, output_root: impl Into<String>) -> Self {
        Self {
            input_root: input_root.into(),
            output_root: output_root.into(),
        }
    }

    /// Derive the output path for an input.
    ///
    /// The first occurrence of the input root is replaced by the output root.
    /// Inputs outside the input root are mirrored under the output root with
    /// their directories kept, so `photos/x/a.jpg` and `photos/y/a.jpg` stay
    /// apart and a source is never written over.
    pub fn output_path(&self, input: &Path) -> PathBuf {
        let text = input.to_string_lossy();
        if !self.input_root.is_empty() && text.contains(&self.input_root) {
            return PathBuf::from(text.replacen(&self.input_root, &self.output_root, 1));
        }
        let mut out = PathBuf::from(&self.output_root);
        for component in input.components() {
            match component {
                Component::Normal(part) => out.push(part),
                // Stay inside the output root.
                Component::ParentDir => out.push("_parent"),
                Component::RootDir | Component::CurDir | Component::Prefix(_) => {}
            }
        }
        out
    }
}

/// Insert a `_<angle>` tag before the extension of `out_path`.
///
/// `out/a.jpg` becomes `out/a_90.jpg`; a path without an extension gets the
/// tag appended.
pub fn rotated_path(out_path: &Path, angle: u32) -> PathBuf {
    let stem = out_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = match out_path.extension() {
        Some(ext) => format!("{stem}_{angle}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{angle}"),
    };
    out_path.with_file_name(name)
}
