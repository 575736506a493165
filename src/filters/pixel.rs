// SPDX-License-Identifier: GPL-3.0-only

//! Per-pixel numeric transforms
//!
//! Each transform rewrites the color channels of one RGBA pixel at a time.
//! Values are stored the way an 8-bit canvas stores them: rounded to the
//! nearest integer (ties to even) and clamped to 0..=255 after every write.
//! Alpha is never touched.

use image::RgbaImage;
use serde::{Deserialize, Serialize};

/// Luminance midpoint used by the mono-contrast push
const MIDPOINT: u8 = 128;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PixelTransform {
    /// Warm vintage tint: red ×1.1, green ×0.9, blue ×0.8
    WarmTone,
    /// Luminance average, then pushed away from mid-gray (×0.8 below, ×1.2 above)
    MonoContrast,
    /// Cyclic channel rotation: (r, g, b) → (b, r, g)
    ChannelRotate,
    /// Channel rotation with the in-place overwrite hazard kept:
    /// blue is written from the already overwritten green, giving
    /// (r, g, b) → (b, r, r). Only for catalogs that need that exact look.
    ChannelRotateLegacy,
}

impl PixelTransform {
    /// All transforms, for listing
    pub const ALL: [PixelTransform; 4] = [
        PixelTransform::WarmTone,
        PixelTransform::MonoContrast,
        PixelTransform::ChannelRotate,
        PixelTransform::ChannelRotateLegacy,
    ];

    /// Short name used in configuration and listings
    pub fn name(&self) -> &'static str {
        match self {
            PixelTransform::WarmTone => "warm-tone",
            PixelTransform::MonoContrast => "mono-contrast",
            PixelTransform::ChannelRotate => "channel-rotate",
            PixelTransform::ChannelRotateLegacy => "channel-rotate-legacy",
        }
    }

    /// Transform a single RGBA pixel
    #[inline]
    pub fn apply(&self, [r, g, b, a]: [u8; 4]) -> [u8; 4] {
        match self {
            PixelTransform::WarmTone => [
                store(r as f64 * 1.1),
                store(g as f64 * 0.9),
                store(b as f64 * 0.8),
                a,
            ],
            PixelTransform::MonoContrast => {
                let avg = store((r as f64 + g as f64 + b as f64) / 3.0);
                let pushed = if avg < MIDPOINT {
                    store(avg as f64 * 0.8)
                } else {
                    store(avg as f64 * 1.2)
                };
                [pushed, pushed, pushed, a]
            }
            PixelTransform::ChannelRotate => [b, r, g, a],
            PixelTransform::ChannelRotateLegacy => [b, r, r, a],
        }
    }

    /// Transform every pixel of the buffer in place
    pub fn apply_in_place(&self, image: &mut RgbaImage) {
        for pixel in image.pixels_mut() {
            pixel.0 = self.apply(pixel.0);
        }
    }
}

impl std::fmt::Display for PixelTransform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Per-pixel stage of the filter pipeline
///
/// `None` passes the buffer through unchanged.
pub fn pixel_transform(mut image: RgbaImage, transform: Option<PixelTransform>) -> RgbaImage {
    if let Some(transform) = transform {
        transform.apply_in_place(&mut image);
    }
    image
}

/// Store a computed channel value as an 8-bit canvas would
///
/// Products are computed in double precision: 55 × 1.1 lands just above
/// 60.5 and must store as 61.
#[inline]
fn store(value: f64) -> u8 {
    value.clamp(0.0, 255.0).round_ties_even() as u8
}
