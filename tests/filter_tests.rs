// SPDX-License-Identifier: MPL-2.0

//! Integration tests for filters and frame processing

use image::{Rgba, RgbaImage};
use photobooth::backends::camera::FrameSnapshot;
use photobooth::filters::{
    CompositeExpression, FilterCatalog, FilterDescriptor, PixelTransform, apply_filter,
    pixel_transform,
};
use photobooth::pipelines::photo::FrameProcessor;

/// Gradient covering the channel range, including the extremes
fn gradient(width: u32, height: u32) -> RgbaImage {
    RgbaImage::from_fn(width, height, |x, y| {
        let r = (x * 255 / width.max(2).saturating_sub(1).max(1)).min(255) as u8;
        let g = (y * 255 / height.max(2).saturating_sub(1).max(1)).min(255) as u8;
        Rgba([r, g, 255 - r, 200])
    })
}

#[test]
fn test_every_filter_keeps_dimensions() {
    let catalog = FilterCatalog::builtin();
    for (w, h) in [(1, 1), (3, 7), (33, 17)] {
        for filter in catalog.iter() {
            let out = apply_filter(gradient(w, h), filter);
            assert_eq!(out.dimensions(), (w, h), "{} at {}x{}", filter.id, w, h);
        }
    }
}

#[test]
fn test_pixel_transforms_keep_alpha_and_never_wrap() {
    let bright = RgbaImage::from_pixel(2, 2, Rgba([250, 250, 250, 77]));
    for transform in PixelTransform::ALL {
        let out = pixel_transform(bright.clone(), Some(transform));
        for px in out.pixels() {
            assert_eq!(px[3], 77, "{} touched alpha", transform);
            // Wraparound would show up as a dark value
            assert!(px[0] >= 200 || px[1] >= 200 || px[2] >= 200, "{} wrapped", transform);
        }
    }
}

#[test]
fn test_warm_tone_saturates_red() {
    let out = pixel_transform(
        RgbaImage::from_pixel(1, 1, Rgba([240, 100, 100, 255])),
        Some(PixelTransform::WarmTone),
    );
    assert_eq!(out.get_pixel(0, 0), &Rgba([255, 90, 80, 255]));
}

#[test]
fn test_channel_rotate_is_a_true_permutation() {
    let px = Rgba([10, 20, 30, 255]);
    let once = PixelTransform::ChannelRotate.apply(px.0);
    assert_eq!(once, [30, 10, 20, 255]);

    let thrice = (0..3).fold(px.0, |acc, _| PixelTransform::ChannelRotate.apply(acc));
    assert_eq!(thrice, px.0);
}

#[test]
fn test_lookup_is_idempotent() {
    let catalog = FilterCatalog::builtin();
    let a = catalog.get("Crosshatch").unwrap().clone();
    let b = catalog.get("Crosshatch").unwrap().clone();
    assert_eq!(a, b);
}

#[test]
fn test_custom_catalog_substitutes_builtin() {
    let catalog = FilterCatalog::new(vec![
        FilterDescriptor::new("Flat", "Flat", "none", None, "").unwrap(),
        FilterDescriptor::new(
            "Parity",
            "Parity",
            "hue-rotate(0.25turn)",
            Some(PixelTransform::ChannelRotateLegacy),
            "rainbow",
        )
        .unwrap(),
    ])
    .unwrap();

    let flat = catalog.get("Flat").unwrap();
    let image = gradient(5, 5);
    assert_eq!(apply_filter(image.clone(), flat), image);
    assert!(catalog.get("Noir").is_err());
}

#[test]
fn test_expression_text_round_trips() {
    let expr: CompositeExpression = "sepia(40%) contrast(1.2) hue-rotate(-10deg)".parse().unwrap();
    assert_eq!(expr.ops().len(), 3);
    assert!("saturate(-1)".parse::<CompositeExpression>().is_err());
    assert!("wobble(2)".parse::<CompositeExpression>().is_err());
}

#[test]
fn test_processor_output_matches_source_resolution() {
    let source = gradient(40, 30);
    let mut png = Vec::new();
    image::DynamicImage::ImageRgba8(source)
        .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
        .unwrap();

    let catalog = FilterCatalog::builtin();
    for filter in catalog.iter() {
        let photo = FrameProcessor::default()
            .process_blocking(&FrameSnapshot::encoded(png.clone()), filter)
            .unwrap();
        assert_eq!((photo.width, photo.height), (40, 30));
        assert_eq!(photo.filter_id, filter.id);
        assert_eq!(photo.decode().unwrap().dimensions(), (40, 30));
    }
}
