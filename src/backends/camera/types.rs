// SPDX-License-Identifier: GPL-3.0-only

//! Shared types for camera frame sources

use std::sync::Arc;
use std::time::Instant;

/// Pixel layout of a raw camera frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    /// 8-bit RGBA, 4 bytes per pixel
    RGBA,
    /// Packed YUV 4:2:2 (Y0 U Y1 V), 2 bytes per pixel
    YUYV,
}

impl PixelFormat {
    /// Bytes occupied by one pixel
    pub fn bytes_per_pixel(&self) -> u32 {
        match self {
            PixelFormat::RGBA => 4,
            PixelFormat::YUYV => 2,
        }
    }
}

/// One raw frame sampled from a live camera stream
#[derive(Debug, Clone)]
pub struct CameraFrame {
    pub width: u32,
    pub height: u32,
    /// Pixel bytes, `stride` bytes per row
    pub data: Arc<[u8]>,
    /// Pixel format of the data
    pub format: PixelFormat,
    /// Row stride in bytes (may include padding)
    pub stride: u32,
    /// Timestamp when frame was captured
    pub captured_at: Instant,
}

impl CameraFrame {
    /// Build a tightly packed RGBA frame
    pub fn rgba(width: u32, height: u32, data: impl Into<Arc<[u8]>>) -> Self {
        Self {
            width,
            height,
            data: data.into(),
            format: PixelFormat::RGBA,
            stride: width * 4,
            captured_at: Instant::now(),
        }
    }

    /// Smallest buffer length that can hold this frame
    pub fn required_len(&self) -> usize {
        if self.height == 0 {
            return 0;
        }
        let row = (self.width * self.format.bytes_per_pixel()) as usize;
        self.stride as usize * (self.height as usize - 1) + row
    }
}

/// A frame as handed over by a source at shutter time
///
/// Preview grabs usually come out as an already encoded still (the
/// equivalent of a webcam "screenshot"); direct device capture yields raw
/// pixels. Both decode to the native resolution of the source.
#[derive(Debug, Clone)]
pub enum FrameSnapshot {
    /// Encoded still image (JPEG, PNG, ...)
    Encoded(Arc<[u8]>),
    /// Raw pixel frame
    Raw(CameraFrame),
}

impl FrameSnapshot {
    /// Wrap encoded image bytes
    pub fn encoded(bytes: impl Into<Arc<[u8]>>) -> Self {
        FrameSnapshot::Encoded(bytes.into())
    }

    /// Size of the snapshot payload in bytes
    pub fn len(&self) -> usize {
        match self {
            FrameSnapshot::Encoded(bytes) => bytes.len(),
            FrameSnapshot::Raw(frame) => frame.data.len(),
        }
    }

    /// A zero-length snapshot carries no frame
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_required_len_accounts_for_stride() {
        let mut frame = CameraFrame::rgba(2, 3, vec![0u8; 24]);
        assert_eq!(frame.required_len(), 24);

        frame.stride = 16;
        assert_eq!(frame.required_len(), 16 * 2 + 8);
    }

    #[test]
    fn test_empty_snapshot() {
        assert!(FrameSnapshot::encoded(Vec::new()).is_empty());
        assert!(!FrameSnapshot::Raw(CameraFrame::rgba(1, 1, vec![0u8; 4])).is_empty());
    }
}
