// SPDX-License-Identifier: GPL-3.0-only

//! Photo encoding
//!
//! Processed images are stored as JPEG with quality control; alpha is
//! dropped before encoding.
//!
//! Saving runs on the blocking pool to keep the runtime responsive.

use image::{RgbImage, RgbaImage};
use std::path::PathBuf;
use tracing::{debug, info};

/// Photo encoder
#[derive(Debug, Clone)]
pub struct PhotoEncoder {
    /// JPEG quality (1-100)
    quality: u8,
}

impl PhotoEncoder {
    /// Create a JPEG encoder with the given quality (clamped to 1-100)
    pub fn jpeg(quality: u8) -> Self {
        Self {
            quality: quality.clamp(1, 100),
        }
    }

    pub fn quality(&self) -> u8 {
        self.quality
    }

    /// Encode an RGBA buffer
    pub fn encode_rgba(&self, image: &RgbaImage) -> Result<Vec<u8>, String> {
        let rgb = convert_rgba_to_rgb(image);
        self.encode_rgb(&rgb)
    }

    /// Encode an RGB buffer
    pub fn encode_rgb(&self, image: &RgbImage) -> Result<Vec<u8>, String> {
        let data = encode_jpeg(image, self.quality)?;
        debug!(
            size = data.len(),
            width = image.width(),
            height = image.height(),
            quality = self.quality,
            "Encoding complete"
        );
        Ok(data)
    }
}

impl Default for PhotoEncoder {
    fn default() -> Self {
        Self::jpeg(crate::constants::quality::PHOTO_JPEG_QUALITY)
    }
}

/// Drop the alpha channel
pub fn convert_rgba_to_rgb(image: &RgbaImage) -> RgbImage {
    let (width, height) = image.dimensions();
    RgbImage::from_fn(width, height, |x, y| {
        let [r, g, b, _] = image.get_pixel(x, y).0;
        image::Rgb([r, g, b])
    })
}

/// Encode image as JPEG
fn encode_jpeg(image: &RgbImage, quality: u8) -> Result<Vec<u8>, String> {
    let mut buffer = Vec::new();
    let mut cursor = std::io::Cursor::new(&mut buffer);

    let mut encoder = image::codecs::jpeg::JpegEncoder::new_with_quality(&mut cursor, quality);

    encoder
        .encode(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ExtendedColorType::Rgb8,
        )
        .map_err(|e| format!("JPEG encoding failed: {}", e))?;

    Ok(buffer)
}

/// Timestamped photo file name (`IMG_20250101_120000_123.jpg`)
pub fn photo_filename() -> String {
    let timestamp = chrono::Local::now().format("%Y%m%d_%H%M%S_%3f");
    format!("IMG_{}.jpg", timestamp)
}

/// Write encoded bytes to disk on the blocking pool
pub async fn save_bytes(data: Vec<u8>, path: PathBuf) -> Result<PathBuf, String> {
    info!(path = %path.display(), size = data.len(), "Saving image");

    let target = path.clone();
    tokio::task::spawn_blocking(move || {
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {}", parent.display(), e))?;
        }
        std::fs::write(&target, &data).map_err(|e| format!("Failed to save image: {}", e))
    })
    .await
    .map_err(|e| format!("Save task error: {}", e))??;

    Ok(path)
}
