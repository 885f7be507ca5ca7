//! In-memory [`ImageStore`] for exercising stages without touching disk.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use image::{ColorType, DynamicImage, Rgb, RgbImage};

use crate::error::{PipelineError, PipelineResult};

use super::store::ImageStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Event {
    Decode,
    Encode,
}

#[derive(Debug, Clone)]
pub(crate) struct Written {
    pub path: PathBuf,
    pub width: u32,
    pub height: u32,
    pub color: ColorType,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    sources: HashMap<PathBuf, DynamicImage>,
    failing_pattern: Option<String>,
    write_delay: Option<Duration>,
    written: Mutex<Vec<Written>>,
    events: Mutex<Vec<Event>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a decodable source; anything unregistered fails to decode.
    pub fn with_image(mut self, path: &str, width: u32, height: u32) -> Self {
        let image = RgbImage::from_fn(width, height, |x, y| {
            Rgb([(x % 256) as u8, (y % 256) as u8, ((x + y) % 256) as u8])
        });
        self.sources
            .insert(PathBuf::from(path), DynamicImage::ImageRgb8(image));
        self
    }

    /// Fail every write whose path contains `pattern`.
    pub fn failing_writes_to(mut self, pattern: &str) -> Self {
        self.failing_pattern = Some(pattern.to_string());
        self
    }

    pub fn slow_writes(mut self, delay: Duration) -> Self {
        self.write_delay = Some(delay);
        self
    }

    pub fn written(&self) -> Vec<Written> {
        self.written.lock().unwrap().clone()
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }
}

impl ImageStore for MemoryStore {
    fn decode(&self, path: &Path) -> PipelineResult<DynamicImage> {
        self.events.lock().unwrap().push(Event::Decode);
        self.sources
            .get(path)
            .cloned()
            .ok_or_else(|| PipelineError::Decode {
                path: path.to_path_buf(),
                message: "corrupt image".to_string(),
            })
    }

    fn encode(&self, image: &DynamicImage, path: &Path) -> PipelineResult<()> {
        if let Some(delay) = self.write_delay {
            std::thread::sleep(delay);
        }
        let text = path.to_string_lossy();
        if let Some(pattern) = &self.failing_pattern {
            if text.contains(pattern.as_str()) {
                return Err(PipelineError::Encode {
                    path: path.to_path_buf(),
                    message: "disk full".to_string(),
                });
            }
        }
        self.events.lock().unwrap().push(Event::Encode);
        self.written.lock().unwrap().push(Written {
            path: path.to_path_buf(),
            width: image.width(),
            height: image.height(),
            color: image.color(),
        });
        Ok(())
    }
}
