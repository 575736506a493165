// SPDX-License-Identifier: MPL-2.0

//! Photo capture from a frame source
//!
//! This module grabs a single snapshot from the live source at shutter
//! time without interrupting the stream.

use crate::backends::camera::FrameSource;
use crate::backends::camera::types::FrameSnapshot;
use crate::errors::CaptureError;
use tracing::{debug, warn};

/// Photo capture handler
pub struct PhotoCapture;

impl PhotoCapture {
    /// Grab the current frame of a source
    ///
    /// # Returns
    /// * `Ok(FrameSnapshot)` - Snapshot of the latest frame
    /// * `Err(CaptureError::CaptureUnavailable)` - The source has no frame yet
    pub fn grab(source: &dyn FrameSource) -> Result<FrameSnapshot, CaptureError> {
        match source.snapshot() {
            Some(snapshot) if !snapshot.is_empty() => {
                debug!(source = source.name(), size = snapshot.len(), "Snapshot grabbed");
                Ok(snapshot)
            }
            _ => {
                warn!(source = source.name(), "No frame available at shutter time");
                Err(CaptureError::CaptureUnavailable)
            }
        }
    }
}
