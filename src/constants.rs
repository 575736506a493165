// SPDX-License-Identifier: GPL-3.0-only

//! Application-wide constants

use std::time::Duration;

/// Number of photos taken per capture sequence
pub const SHOTS_PER_SESSION: usize = 3;

/// Default folder name under the pictures directory
pub const DEFAULT_SAVE_FOLDER: &str = "photobooth";

/// Id of the filter selected when the booth opens
pub const DEFAULT_FILTER_ID: &str = "90s";

/// Capture sequence timing
pub mod timing {
    use super::Duration;

    /// How long each countdown tick stays on screen
    pub const COUNTDOWN_TICK_MS: u64 = 1000;

    /// Pause after each shot before the next countdown starts
    pub const SHOT_PAUSE_MS: u64 = 500;

    /// Wait between attempts when a shot is retried for a missing frame
    pub const FRAME_RETRY_INTERVAL_MS: u64 = 100;

    /// Frame counter modulo for periodic logging
    pub const FRAME_LOG_INTERVAL: u64 = 30;

    /// Backoff after a failed device read
    pub const CAPTURE_RETRY_BACKOFF: Duration = Duration::from_millis(10);
}

/// Encoding quality settings (JPEG, 1-100)
pub mod quality {
    /// Individual photos (0.9 on a 0-1 scale)
    pub const PHOTO_JPEG_QUALITY: u8 = 90;

    /// Exported photo strip (1.0 on a 0-1 scale)
    pub const STRIP_JPEG_QUALITY: u8 = 100;
}

/// Photo strip layout
pub mod strip {
    /// Raster scale applied when exporting the strip
    pub const DEFAULT_SCALE: u32 = 2;

    /// Width of each photo cell before scaling
    pub const PHOTO_WIDTH: u32 = 280;

    /// Frame padding around and between photos before scaling
    pub const PADDING: u32 = 15;

    /// Height of the caption band under the photos before scaling
    pub const CAPTION_HEIGHT: u32 = 40;

    /// Cream frame background
    pub const BACKGROUND: [u8; 3] = [0xf5, 0xf0, 0xe1];

    /// Dark rule drawn across the caption band
    pub const CAPTION_RULE: [u8; 3] = [0x3b, 0x2f, 0x2f];

    /// Prefix of exported strip file names
    pub const FILE_PREFIX: &str = "filmaura-vintage-strip";
}

/// Supported file formats for the image file source
pub mod file_formats {
    /// Supported image file extensions
    pub const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp"];

    /// Check if a file extension is a supported image format
    pub fn is_image_extension(ext: &str) -> bool {
        IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str())
    }
}
