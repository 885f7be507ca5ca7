//! Image persistence: decoding inputs and encoding outputs.
//!
//! The pipeline only talks to [`ImageStore`]. [`FsImageStore`] is the
//! file-system implementation; every call opens and closes its own file
//! handle, so nothing stays open between items.

use image::codecs::jpeg::JpegEncoder;
use image::{DynamicImage, ImageFormat, ImageReader};
use std::borrow::Cow;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::config::{LimitsConfig, SaveConfig};
use crate::error::{PipelineError, PipelineResult};

/// Source and sink of decoded images.
///
/// Both calls are blocking; stages run them on the blocking thread pool.
pub trait ImageStore: Send + Sync {
    /// Decode the image identified by `path`.
    fn decode(&self, path: &Path) -> PipelineResult<DynamicImage>;

    /// Encode `image` and persist it at `path`.
    fn encode(&self, image: &DynamicImage, path: &Path) -> PipelineResult<()>;
}

/// Reads and writes images on the local file system.
pub struct FsImageStore {
    limits: LimitsConfig,
    save: SaveConfig,
}

impl FsImageStore {
    /// Create a store with the given limits and encoder settings.
    pub fn new(limits: LimitsConfig, save: SaveConfig) -> Self {
        Self { limits, save }
    }

    /// The encoder used for `path`.
    fn format_for(&self, path: &Path) -> ImageFormat {
        match self.save.format.as_str() {
            "png" => ImageFormat::Png,
            "auto" => ImageFormat::from_path(path)
                .ok()
                .filter(|f| f.writing_enabled())
                .unwrap_or(ImageFormat::Jpeg),
            _ => ImageFormat::Jpeg,
        }
    }
}

impl ImageStore for FsImageStore {
    fn decode(&self, path: &Path) -> PipelineResult<DynamicImage> {
        let metadata = std::fs::metadata(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => PipelineError::FileNotFound(path.to_path_buf()),
            _ => PipelineError::Open {
                path: path.to_path_buf(),
                message: e.to_string(),
            },
        })?;

        let max_bytes = self.limits.max_file_size_mb * 1024 * 1024;
        if metadata.len() > max_bytes {
            return Err(PipelineError::FileTooLarge {
                path: path.to_path_buf(),
                size_mb: metadata.len() / (1024 * 1024),
                max_mb: self.limits.max_file_size_mb,
            });
        }

        let file = File::open(path).map_err(|e| PipelineError::Open {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let mut reader = ImageReader::new(BufReader::new(file))
            .with_guessed_format()
            .map_err(|e| PipelineError::Decode {
                path: path.to_path_buf(),
                message: format!("Cannot detect image format: {}", e),
            })?;
        if reader.format().is_none() {
            let format =
                ImageFormat::from_path(path).map_err(|_| PipelineError::UnsupportedFormat {
                    path: path.to_path_buf(),
                    format: path
                        .extension()
                        .and_then(|e| e.to_str())
                        .unwrap_or("unknown")
                        .to_string(),
                })?;
            reader.set_format(format);
        }

        let image = reader.decode().map_err(|e| PipelineError::Decode {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

        let (width, height) = (image.width(), image.height());
        if width > self.limits.max_image_dimension || height > self.limits.max_image_dimension {
            return Err(PipelineError::ImageTooLarge {
                path: path.to_path_buf(),
                width,
                height,
                max_dim: self.limits.max_image_dimension,
            });
        }
        Ok(image)
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> PipelineResult<()> {
        let create_err = |e: std::io::Error| PipelineError::Create {
            path: path.to_path_buf(),
            message: e.to_string(),
        };
        let encode_err = |message: String| PipelineError::Encode {
            path: path.to_path_buf(),
            message,
        };

        if self.save.create_dirs {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(create_err)?;
            }
        }

        let file = File::create(path).map_err(create_err)?;
        let mut writer = BufWriter::new(file);

        match self.format_for(path) {
            ImageFormat::Jpeg => {
                let encoder = JpegEncoder::new_with_quality(&mut writer, self.save.jpeg_quality);
                jpeg_compatible(image)
                    .write_with_encoder(encoder)
                    .map_err(|e| encode_err(e.to_string()))?;
            }
            format => image
                .write_to(&mut writer, format)
                .map_err(|e| encode_err(e.to_string()))?,
        }

        writer.flush().map_err(|e| encode_err(e.to_string()))
    }
}

/// JPEG carries neither alpha nor 16-bit samples.
fn jpeg_compatible(image: &DynamicImage) -> Cow<'_, DynamicImage> {
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageRgb8(_) => Cow::Borrowed(image),
        DynamicImage::ImageLumaA8(_)
        | DynamicImage::ImageLuma16(_)
        | DynamicImage::ImageLumaA16(_) => Cow::Owned(DynamicImage::ImageLuma8(image.to_luma8())),
        _ => Cow::Owned(DynamicImage::ImageRgb8(image.to_rgb8())),
    }
}
