//! Pixel transforms applied by the resize, grayscale and rotate stages.

use image::imageops::{self, FilterType};
use image::{DynamicImage, GrayImage, ImageBuffer, Luma, LumaA, Pixel, Rgba};
use imageproc::geometric_transformations::{rotate_about_center, Interpolation};

use crate::config::TransformConfig;

/// ITU-R BT.601 luma weights.
const LUMA_R: f32 = 0.299;
const LUMA_G: f32 = 0.587;
const LUMA_B: f32 = 0.114;

/// Stateless image transforms with a fixed resize target.
#[derive(Debug, Clone)]
pub struct Transformer {
    width: u32,
    height: u32,
    filter: FilterType,
}

impl Transformer {
    /// Create a transformer from validated configuration.
    ///
    /// An unknown filter name falls back to Lanczos3.
    pub fn new(config: &TransformConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            filter: config.filter_type().unwrap_or(FilterType::Lanczos3),
        }
    }

    /// Resize to exactly the target dimensions.
    ///
    /// The aspect ratio is not preserved: an 800x600 input becomes 500x500.
    pub fn resize(&self, image: DynamicImage) -> DynamicImage {
        if image.width() == self.width && image.height() == self.height {
            return image;
        }
        image.resize_exact(self.width, self.height, self.filter)
    }

    /// Convert to single-channel 8-bit luma, dropping any alpha.
    ///
    /// Each pixel becomes `round(0.299 R + 0.587 G + 0.114 B)`.
    pub fn grayscale(&self, image: DynamicImage) -> DynamicImage {
        let rgb = image.to_rgb8();
        let gray = GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
            let [r, g, b] = rgb.get_pixel(x, y).0;
            Luma([luma(r, g, b)])
        });
        DynamicImage::ImageLuma8(gray)
    }

    /// Rotate counter-clockwise by `angle` degrees about the image center.
    ///
    /// Multiples of 90 are exact and keep the color type; 360 (and 0) return
    /// an unchanged copy. Other angles rotate onto a canvas large enough for
    /// the whole result, with exposed corners left fully transparent.
    pub fn rotate(&self, image: &DynamicImage, angle: u32) -> DynamicImage {
        match angle % 360 {
            0 => image.clone(),
            // imageops rotates clockwise
            90 => image.rotate270(),
            180 => image.rotate180(),
            270 => image.rotate90(),
            degrees => rotate_free(image, degrees as f32),
        }
    }
}

fn luma(r: u8, g: u8, b: u8) -> u8 {
    (LUMA_R * r as f32 + LUMA_G * g as f32 + LUMA_B * b as f32)
        .round()
        .clamp(0.0, 255.0) as u8
}

fn rotate_free(image: &DynamicImage, degrees: f32) -> DynamicImage {
    // imageproc rotates clockwise for positive theta
    let theta = -degrees.to_radians();
    match image {
        DynamicImage::ImageLuma8(_) | DynamicImage::ImageLumaA8(_) => {
            let fill = LumaA([0, 0]);
            let canvas = expand_canvas(&image.to_luma_alpha8(), degrees, fill);
            DynamicImage::ImageLumaA8(rotate_about_center(
                &canvas,
                theta,
                Interpolation::Bilinear,
                fill,
            ))
        }
        _ => {
            let fill = Rgba([0, 0, 0, 0]);
            let canvas = expand_canvas(&image.to_rgba8(), degrees, fill);
            DynamicImage::ImageRgba8(rotate_about_center(
                &canvas,
                theta,
                Interpolation::Bilinear,
                fill,
            ))
        }
    }
}

/// Center `image` on a `fill` canvas large enough to hold it rotated by `degrees`.
fn expand_canvas<P: Pixel>(
    image: &ImageBuffer<P, Vec<P::Subpixel>>,
    degrees: f32,
    fill: P,
) -> ImageBuffer<P, Vec<P::Subpixel>> {
    let (width, height) = image.dimensions();
    let theta = degrees.to_radians();
    let (sin, cos) = (theta.sin().abs(), theta.cos().abs());
    let canvas_w = (width as f32 * cos + height as f32 * sin).ceil() as u32;
    let canvas_h = (width as f32 * sin + height as f32 * cos).ceil() as u32;

    let mut canvas = ImageBuffer::from_pixel(canvas_w.max(width), canvas_h.max(height), fill);
    let x = (i64::from(canvas.width()) - i64::from(width)) / 2;
    let y = (i64::from(canvas.height()) - i64::from(height)) / 2;
    imageops::replace(&mut canvas, image, x, y);
    canvas
}
