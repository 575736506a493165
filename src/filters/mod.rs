// SPDX-License-Identifier: GPL-3.0-only

//! Film filters
//!
//! A filter is two composable stages run back to back on an RGBA buffer:
//!
//! ```text
//! RGBA buffer → per-pixel transform (optional) → compositing expression → RGBA buffer
//! ```
//!
//! Both stages are pure and keep the buffer dimensions.

pub mod catalog;
pub mod expression;
pub mod pixel;

pub use catalog::{FilterCatalog, FilterDescriptor};
pub use expression::{CompositeExpression, FilterOp, composite_expression};
pub use pixel::{PixelTransform, pixel_transform};

use image::RgbaImage;

/// Run both filter stages over a buffer
pub fn apply_filter(image: RgbaImage, filter: &FilterDescriptor) -> RgbaImage {
    let image = pixel_transform(image, filter.pixel_transform);
    composite_expression(image, &filter.expression)
}
