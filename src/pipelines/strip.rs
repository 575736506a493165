// SPDX-License-Identifier: MPL-2.0

//! Photo strip composition and export
//!
//! ```text
//! [ProcessedPhoto; 1..=3] → StripRenderer → RgbImage → JPEG (q100) → Disk I/O
//! ```
//!
//! Exporting only reads the photos. A failed export leaves the session as it
//! was so it can be retried.

use super::photo::{PhotoEncoder, ProcessedPhoto};
use crate::constants::{quality, strip};
use crate::errors::ExportError;
use image::{Rgb, RgbImage, imageops};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// Render-to-image collaborator
///
/// Turns the photos of a finished session into a single raster.
pub trait StripRenderer: Send + Sync {
    fn render(&self, photos: &[ProcessedPhoto]) -> Result<RgbImage, ExportError>;
}

/// Vertical film strip on a cream frame
///
/// The caption band below the photos carries a single rule and no text:
/// there is no "FilmAura Vintage" title or date line, since nothing in the
/// stack renders fonts. Implement [`StripRenderer`] for a captioned layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StripLayout {
    /// Raster scale factor
    pub scale: u32,
    /// Photo cell width before scaling
    pub photo_width: u32,
    /// Padding around and between photos before scaling
    pub padding: u32,
    /// Caption band height before scaling
    pub caption_height: u32,
}

impl StripLayout {
    pub fn with_scale(scale: u32) -> Self {
        Self {
            scale: scale.max(1),
            ..Self::default()
        }
    }

    fn cell_width(&self) -> u32 {
        self.photo_width * self.scale
    }

    fn cell_height(&self, photo: &RgbImage) -> u32 {
        let (w, h) = photo.dimensions();
        ((h as u64 * self.cell_width() as u64) / w.max(1) as u64).max(1) as u32
    }
}

impl Default for StripLayout {
    fn default() -> Self {
        Self {
            scale: strip::DEFAULT_SCALE,
            photo_width: strip::PHOTO_WIDTH,
            padding: strip::PADDING,
            caption_height: strip::CAPTION_HEIGHT,
        }
    }
}

impl StripRenderer for StripLayout {
    fn render(&self, photos: &[ProcessedPhoto]) -> Result<RgbImage, ExportError> {
        if photos.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let padding = self.padding * self.scale;
        let cell_width = self.cell_width();

        let cells = photos
            .iter()
            .map(|photo| {
                let decoded = photo.decode().map_err(ExportError::RenderFailed)?;
                let rgb = image::DynamicImage::ImageRgba8(decoded).to_rgb8();
                let height = self.cell_height(&rgb);
                Ok(imageops::resize(
                    &rgb,
                    cell_width,
                    height,
                    imageops::FilterType::Triangle,
                ))
            })
            .collect::<Result<Vec<_>, ExportError>>()?;

        let width = cell_width + 2 * padding;
        let photos_height: u32 = cells.iter().map(|cell| cell.height() + padding).sum();
        let caption_height = self.caption_height * self.scale;
        let height = padding + photos_height + caption_height;

        let mut canvas = RgbImage::from_pixel(width, height, Rgb(strip::BACKGROUND));

        let mut y = padding;
        for cell in &cells {
            imageops::replace(&mut canvas, cell, padding as i64, y as i64);
            y += cell.height() + padding;
        }

        // Caption rule centred in the band
        let rule_y = y + caption_height / 2;
        let rule_height = self.scale.max(1);
        for ry in rule_y..(rule_y + rule_height).min(height) {
            for x in padding..(width - padding) {
                canvas.put_pixel(x, ry, Rgb(strip::CAPTION_RULE));
            }
        }

        debug!(width, height, photos = cells.len(), "Strip rendered");
        Ok(canvas)
    }
}

/// Encodes and saves photo strips
#[derive(Clone)]
pub struct StripExporter {
    renderer: Arc<dyn StripRenderer>,
    encoder: PhotoEncoder,
}

impl StripExporter {
    pub fn new(renderer: Arc<dyn StripRenderer>, jpeg_quality: u8) -> Self {
        Self {
            renderer,
            encoder: PhotoEncoder::jpeg(jpeg_quality),
        }
    }

    /// Render and encode the strip
    pub fn encode(&self, photos: &[ProcessedPhoto]) -> Result<Vec<u8>, ExportError> {
        let strip = self.renderer.render(photos)?;
        self.encoder
            .encode_rgb(&strip)
            .map_err(ExportError::EncodingFailed)
    }

    /// Render, encode and write the strip into `output_dir`
    ///
    /// # Returns
    /// * `Ok(PathBuf)` - Path of the written strip
    /// * `Err(ExportError)` - Retryable failure, nothing was changed
    pub async fn export(
        &self,
        photos: &[ProcessedPhoto],
        output_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        if photos.is_empty() {
            return Err(ExportError::NothingToExport);
        }

        let exporter = self.clone();
        let photos = photos.to_vec();
        let data = tokio::task::spawn_blocking(move || exporter.encode(&photos))
            .await
            .map_err(|e| ExportError::RenderFailed(format!("Export task error: {}", e)))??;

        let path = output_dir.join(strip_filename());
        info!(path = %path.display(), size = data.len(), "Exporting photo strip");

        tokio::fs::create_dir_all(output_dir).await?;
        tokio::fs::write(&path, &data).await?;

        Ok(path)
    }
}

impl Default for StripExporter {
    fn default() -> Self {
        Self::new(Arc::new(StripLayout::default()), quality::STRIP_JPEG_QUALITY)
    }
}

impl std::fmt::Debug for StripExporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StripExporter")
            .field("encoder", &self.encoder)
            .finish_non_exhaustive()
    }
}

/// `filmaura-vintage-strip-<unix millis>.jpg`
pub fn strip_filename() -> String {
    format!(
        "{}-{}.jpg",
        strip::FILE_PREFIX,
        chrono::Utc::now().timestamp_millis()
    )
}
