// SPDX-License-Identifier: MPL-2.0

//! Async photo capture pipeline
//!
//! One shot runs through:
//!
//! ```text
//! FrameSource → Capture → Decode → Mirror → Filter → JPEG → (Disk I/O)
//!      ↓
//! Stream continues uninterrupted
//! ```
//!
//! # Pipeline Stages
//!
//! 1. **Capture**: Grab the current snapshot from the source
//! 2. **Processing**: Decode, mirror and run both filter stages (blocking pool)
//! 3. **Encoding**: JPEG at the configured quality
//! 4. **Disk I/O**: Optional, photos normally live in memory until the strip
//!    is exported

pub mod capture;
pub mod encoding;
pub mod processing;

pub use capture::PhotoCapture;
pub use encoding::PhotoEncoder;
pub use processing::{FrameProcessor, ProcessingConfig};

use crate::backends::camera::FrameSource;
use crate::errors::CaptureError;
use crate::filters::FilterDescriptor;
use chrono::{DateTime, Local};
use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use uuid::Uuid;

/// One finished shot
///
/// Immutable once created. Clones share the encoded bytes.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessedPhoto {
    pub id: Uuid,
    /// JPEG bytes
    pub encoded: Arc<[u8]>,
    /// Id of the filter the photo was rendered with
    pub filter_id: String,
    pub width: u32,
    pub height: u32,
    pub captured_at: DateTime<Local>,
}

impl ProcessedPhoto {
    pub fn new(encoded: Arc<[u8]>, filter_id: String, width: u32, height: u32) -> Self {
        Self {
            id: Uuid::new_v4(),
            encoded,
            filter_id,
            width,
            height,
            captured_at: Local::now(),
        }
    }

    /// Decode the JPEG back to pixels
    pub fn decode(&self) -> Result<RgbaImage, String> {
        image::load_from_memory(&self.encoded)
            .map(|image| image.to_rgba8())
            .map_err(|e| format!("Failed to decode photo {}: {}", self.id, e))
    }
}

/// Complete photo capture pipeline
///
/// Orchestrates the capture → process → encode (→ save) workflow.
#[derive(Debug, Clone, Default)]
pub struct PhotoPipeline {
    processor: FrameProcessor,
}

impl PhotoPipeline {
    pub fn new(config: ProcessingConfig) -> Self {
        Self {
            processor: FrameProcessor::new(config),
        }
    }

    /// Capture one shot from a source
    ///
    /// Sampling the source may block (file reads, device I/O), so the grab
    /// runs on the blocking pool like the processing stage.
    ///
    /// # Returns
    /// * `Ok(ProcessedPhoto)` - Filtered JPEG photo
    /// * `Err(CaptureError)` - No frame or undecodable frame
    pub async fn capture(
        &self,
        source: Arc<dyn FrameSource>,
        filter: &FilterDescriptor,
    ) -> Result<ProcessedPhoto, CaptureError> {
        let snapshot = tokio::task::spawn_blocking(move || PhotoCapture::grab(source.as_ref()))
            .await
            .map_err(|e| CaptureError::DecodeFailed(format!("Capture task error: {}", e)))??;
        self.processor.process(Some(snapshot), filter).await
    }

    /// Save a photo under a timestamped name in `output_dir`
    pub async fn save(
        &self,
        photo: &ProcessedPhoto,
        output_dir: &Path,
    ) -> Result<PathBuf, CaptureError> {
        let path = output_dir.join(encoding::photo_filename());
        encoding::save_bytes(photo.encoded.to_vec(), path)
            .await
            .map_err(CaptureError::SaveFailed)
    }
}
