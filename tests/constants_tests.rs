// SPDX-License-Identifier: MPL-2.0

//! Integration tests for constants module

use photobooth::constants::{self, file_formats, quality, strip, timing};

#[test]
fn test_session_shape() {
    // Three shots, each with a one second tick and a half second pause
    assert_eq!(constants::SHOTS_PER_SESSION, 3);
    assert_eq!(timing::COUNTDOWN_TICK_MS, 1000);
    assert_eq!(timing::SHOT_PAUSE_MS, 500);
}

#[test]
fn test_quality_levels() {
    assert_eq!(quality::PHOTO_JPEG_QUALITY, 90);
    assert_eq!(quality::STRIP_JPEG_QUALITY, 100);
}

#[test]
fn test_strip_prefix() {
    assert_eq!(strip::FILE_PREFIX, "filmaura-vintage-strip");
    assert!(strip::DEFAULT_SCALE >= 1);
}

#[test]
fn test_image_extensions_case_insensitive() {
    assert!(file_formats::is_image_extension("JPG"));
    assert!(file_formats::is_image_extension("png"));
    assert!(!file_formats::is_image_extension("mp4"));
}
