// SPDX-License-Identifier: MPL-2.0

//! Frame processing for captured photos
//!
//! This module turns one frame snapshot into a finished photo:
//! - Decode to RGBA at the native resolution of the source
//! - Mirror horizontally (selfie view)
//! - Per-pixel transform, then the compositing expression of the filter
//! - JPEG encoding (alpha dropped)
//!
//! Everything after decode is CPU-bound and runs on the blocking pool.

use super::ProcessedPhoto;
use super::encoding::PhotoEncoder;
use crate::backends::camera::format_converters::frame_to_rgba;
use crate::backends::camera::types::FrameSnapshot;
use crate::errors::CaptureError;
use crate::filters::{FilterDescriptor, apply_filter};
use image::RgbaImage;
use std::sync::Arc;
use tracing::{debug, info};

/// Frame processing configuration
#[derive(Debug, Clone)]
pub struct ProcessingConfig {
    /// Flip the frame horizontally before filtering
    pub mirror: bool,
    /// JPEG quality of the encoded photo (1-100)
    pub jpeg_quality: u8,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            mirror: true,
            jpeg_quality: crate::constants::quality::PHOTO_JPEG_QUALITY,
        }
    }
}

/// Processor for captured frame snapshots
#[derive(Debug, Clone)]
pub struct FrameProcessor {
    config: ProcessingConfig,
    encoder: PhotoEncoder,
}

impl FrameProcessor {
    /// Create a new processor with the given configuration
    pub fn new(config: ProcessingConfig) -> Self {
        let encoder = PhotoEncoder::jpeg(config.jpeg_quality);
        Self { config, encoder }
    }

    /// Decode a snapshot into an RGBA buffer at its native resolution
    pub fn decode(snapshot: &FrameSnapshot) -> Result<RgbaImage, CaptureError> {
        if snapshot.is_empty() {
            return Err(CaptureError::CaptureUnavailable);
        }

        match snapshot {
            FrameSnapshot::Encoded(bytes) => image::load_from_memory(bytes)
                .map(|decoded| decoded.to_rgba8())
                .map_err(|e| CaptureError::DecodeFailed(e.to_string())),
            FrameSnapshot::Raw(frame) => {
                let rgba = frame_to_rgba(frame).ok_or_else(|| {
                    CaptureError::DecodeFailed(format!(
                        "{:?} frame {}x{} with {} bytes",
                        frame.format,
                        frame.width,
                        frame.height,
                        frame.data.len()
                    ))
                })?;
                RgbaImage::from_raw(frame.width, frame.height, rgba).ok_or_else(|| {
                    CaptureError::DecodeFailed("Failed to create RGBA image".to_string())
                })
            }
        }
    }

    /// Mirror (if enabled) and run both filter stages
    pub fn render(&self, mut image: RgbaImage, filter: &FilterDescriptor) -> RgbaImage {
        if self.config.mirror {
            image::imageops::flip_horizontal_in_place(&mut image);
        }
        apply_filter(image, filter)
    }

    /// Synchronous processing, for callers already off the runtime
    pub fn process_blocking(
        &self,
        snapshot: &FrameSnapshot,
        filter: &FilterDescriptor,
    ) -> Result<ProcessedPhoto, CaptureError> {
        let decoded = Self::decode(snapshot)?;
        let (width, height) = decoded.dimensions();

        let rendered = self.render(decoded, filter);
        let encoded = self
            .encoder
            .encode_rgba(&rendered)
            .map_err(CaptureError::EncodingFailed)?;

        debug!(
            filter = %filter.id,
            width,
            height,
            size = encoded.len(),
            "Frame processed"
        );

        Ok(ProcessedPhoto::new(
            Arc::from(encoded),
            filter.id.clone(),
            width,
            height,
        ))
    }

    /// Process a snapshot asynchronously
    ///
    /// # Returns
    /// * `Ok(ProcessedPhoto)` - JPEG photo tagged with the filter id
    /// * `Err(CaptureError::CaptureUnavailable)` - No frame was provided
    /// * `Err(CaptureError::DecodeFailed)` - The frame could not be read
    pub async fn process(
        &self,
        snapshot: Option<FrameSnapshot>,
        filter: &FilterDescriptor,
    ) -> Result<ProcessedPhoto, CaptureError> {
        let snapshot = snapshot.ok_or(CaptureError::CaptureUnavailable)?;
        info!(filter = %filter.id, size = snapshot.len(), "Starting frame processing");

        let processor = self.clone();
        let filter = filter.clone();
        tokio::task::spawn_blocking(move || processor.process_blocking(&snapshot, &filter))
            .await
            .map_err(|e| CaptureError::EncodingFailed(format!("Processing task error: {}", e)))?
    }
}

impl Default for FrameProcessor {
    fn default() -> Self {
        Self::new(ProcessingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::camera::types::CameraFrame;
    use crate::filters::FilterCatalog;
    use image::Rgba;

    fn plain() -> FilterDescriptor {
        FilterDescriptor::new("Plain", "Plain", "none", None, "").unwrap()
    }

    fn png_bytes(image: &RgbaImage) -> Vec<u8> {
        let mut buffer = Vec::new();
        image
            .write_to(
                &mut std::io::Cursor::new(&mut buffer),
                image::ImageFormat::Png,
            )
            .unwrap();
        buffer
    }

    #[test]
    fn test_decode_keeps_native_resolution() {
        let source = RgbaImage::from_pixel(64, 48, Rgba([10, 20, 30, 255]));
        let snapshot = FrameSnapshot::encoded(png_bytes(&source));
        let decoded = FrameProcessor::decode(&snapshot).unwrap();
        assert_eq!(decoded.dimensions(), (64, 48));
        assert_eq!(decoded.get_pixel(5, 5), &Rgba([10, 20, 30, 255]));
    }

    #[test]
    fn test_decode_rejects_garbage_and_empty() {
        assert!(matches!(
            FrameProcessor::decode(&FrameSnapshot::encoded(vec![1u8, 2, 3])),
            Err(CaptureError::DecodeFailed(_))
        ));
        assert_eq!(
            FrameProcessor::decode(&FrameSnapshot::encoded(Vec::new())),
            Err(CaptureError::CaptureUnavailable)
        );
    }

    #[test]
    fn test_render_mirrors() {
        let mut image = RgbaImage::from_pixel(2, 1, Rgba([0, 0, 0, 255]));
        image.put_pixel(0, 0, Rgba([255, 255, 255, 255]));

        let mirrored = FrameProcessor::default().render(image.clone(), &plain());
        assert_eq!(mirrored.get_pixel(1, 0), &Rgba([255, 255, 255, 255]));

        let straight = FrameProcessor::new(ProcessingConfig {
            mirror: false,
            ..Default::default()
        })
        .render(image, &plain());
        assert_eq!(straight.get_pixel(0, 0), &Rgba([255, 255, 255, 255]));
    }

    #[test]
    fn test_process_raw_frame_tags_filter() {
        let frame = CameraFrame::rgba(8, 6, vec![120u8; 8 * 6 * 4]);
        let catalog = FilterCatalog::builtin();
        let noir = catalog.get("Noir").unwrap();

        let photo = FrameProcessor::default()
            .process_blocking(&FrameSnapshot::Raw(frame), noir)
            .unwrap();
        assert_eq!(photo.filter_id, "Noir");
        assert_eq!((photo.width, photo.height), (8, 6));
        assert_eq!(&photo.encoded[..2], &[0xFF, 0xD8]);
    }

    #[tokio::test]
    async fn test_missing_snapshot_is_unavailable() {
        let result = FrameProcessor::default().process(None, &plain()).await;
        assert_eq!(result.unwrap_err(), CaptureError::CaptureUnavailable);
    }
}
