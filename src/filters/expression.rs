// SPDX-License-Identifier: GPL-3.0-only

//! Declarative compositing expressions
//!
//! A compositing expression is a whitespace separated list of color
//! operations, written the way CSS writes its `filter` property:
//!
//! ```text
//! sepia(0.4) contrast(1.2) saturate(0.8) hue-rotate(-10deg)
//! ```
//!
//! Operations run left to right on normalized RGB using the CSS Filter
//! Effects color matrices, so a photo rendered here matches a live preview
//! styled with the same expression.

use crate::errors::FilterError;
use image::RgbaImage;
use std::fmt;
use std::str::FromStr;
use tracing::debug;

/// One color operation of an expression
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    /// Desaturate towards luminance, amount 0..=1
    Grayscale(f32),
    /// Sepia tone, amount 0..=1
    Sepia(f32),
    /// Saturation factor, 1 = unchanged
    Saturate(f32),
    /// Hue rotation in degrees
    HueRotate(f32),
    /// Contrast factor around mid-gray, 1 = unchanged
    Contrast(f32),
    /// Linear brightness factor, 1 = unchanged
    Brightness(f32),
    /// Gaussian blur, standard deviation in pixels
    Blur(f32),
}

impl FilterOp {
    fn is_identity(&self) -> bool {
        match *self {
            FilterOp::Grayscale(a) | FilterOp::Sepia(a) => a == 0.0,
            FilterOp::Saturate(f) | FilterOp::Contrast(f) | FilterOp::Brightness(f) => f == 1.0,
            FilterOp::HueRotate(deg) => deg % 360.0 == 0.0,
            FilterOp::Blur(sigma) => sigma == 0.0,
        }
    }

    /// Apply to normalized RGB, clamping the result to 0..=1
    #[inline]
    fn apply_rgb(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = match *self {
            FilterOp::Grayscale(a) => {
                let k = 1.0 - a;
                matrix(
                    rgb,
                    [
                        [0.2126 + 0.7874 * k, 0.7152 - 0.7152 * k, 0.0722 - 0.0722 * k],
                        [0.2126 - 0.2126 * k, 0.7152 + 0.2848 * k, 0.0722 - 0.0722 * k],
                        [0.2126 - 0.2126 * k, 0.7152 - 0.7152 * k, 0.0722 + 0.9278 * k],
                    ],
                )
            }
            FilterOp::Sepia(a) => {
                let k = 1.0 - a;
                matrix(
                    rgb,
                    [
                        [0.393 + 0.607 * k, 0.769 - 0.769 * k, 0.189 - 0.189 * k],
                        [0.349 - 0.349 * k, 0.686 + 0.314 * k, 0.168 - 0.168 * k],
                        [0.272 - 0.272 * k, 0.534 - 0.534 * k, 0.131 + 0.869 * k],
                    ],
                )
            }
            FilterOp::Saturate(s) => matrix(
                rgb,
                [
                    [0.213 + 0.787 * s, 0.715 - 0.715 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 + 0.285 * s, 0.072 - 0.072 * s],
                    [0.213 - 0.213 * s, 0.715 - 0.715 * s, 0.072 + 0.928 * s],
                ],
            ),
            FilterOp::HueRotate(deg) => {
                let (sin, cos) = deg.to_radians().sin_cos();
                matrix(
                    rgb,
                    [
                        [
                            0.213 + cos * 0.787 - sin * 0.213,
                            0.715 - cos * 0.715 - sin * 0.715,
                            0.072 - cos * 0.072 + sin * 0.928,
                        ],
                        [
                            0.213 - cos * 0.213 + sin * 0.143,
                            0.715 + cos * 0.285 + sin * 0.140,
                            0.072 - cos * 0.072 - sin * 0.283,
                        ],
                        [
                            0.213 - cos * 0.213 - sin * 0.787,
                            0.715 - cos * 0.715 + sin * 0.715,
                            0.072 + cos * 0.928 + sin * 0.072,
                        ],
                    ],
                )
            }
            FilterOp::Contrast(c) => rgb.map(|v| (v - 0.5) * c + 0.5),
            FilterOp::Brightness(b) => rgb.map(|v| v * b),
            FilterOp::Blur(_) => rgb,
        };
        out.map(|v| v.clamp(0.0, 1.0))
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterOp::Grayscale(a) => write!(f, "grayscale({})", a),
            FilterOp::Sepia(a) => write!(f, "sepia({})", a),
            FilterOp::Saturate(s) => write!(f, "saturate({})", s),
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", deg),
            FilterOp::Contrast(c) => write!(f, "contrast({})", c),
            FilterOp::Brightness(b) => write!(f, "brightness({})", b),
            FilterOp::Blur(px) => write!(f, "blur({}px)", px),
        }
    }
}

#[inline]
fn matrix(rgb: [f32; 3], m: [[f32; 3]; 3]) -> [f32; 3] {
    [
        m[0][0] * rgb[0] + m[0][1] * rgb[1] + m[0][2] * rgb[2],
        m[1][0] * rgb[0] + m[1][1] * rgb[1] + m[1][2] * rgb[2],
        m[2][0] * rgb[0] + m[2][1] * rgb[1] + m[2][2] * rgb[2],
    ]
}

/// Parsed compositing expression
///
/// Keeps the source text so it can be handed back to a presentation layer
/// verbatim (the live preview is styled with the same string).
#[derive(Debug, Clone, PartialEq, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CompositeExpression {
    source: String,
    ops: Vec<FilterOp>,
}

impl CompositeExpression {
    /// Parse an expression; empty text and `none` are the identity
    pub fn parse(text: &str) -> Result<Self, FilterError> {
        let source = text.trim().to_string();
        if source.is_empty() || source == "none" {
            return Ok(Self {
                source,
                ops: Vec::new(),
            });
        }

        let invalid = |reason: String| FilterError::InvalidExpression {
            expression: source.clone(),
            reason,
        };

        let mut ops = Vec::new();
        let mut rest = source.as_str();
        loop {
            rest = rest.trim_start();
            if rest.is_empty() {
                break;
            }

            let open = rest
                .find('(')
                .ok_or_else(|| invalid(format!("expected '(' after '{}'", rest)))?;
            let name = rest[..open].trim();
            let close = rest[open..]
                .find(')')
                .map(|i| open + i)
                .ok_or_else(|| invalid(format!("unterminated '{}('", name)))?;
            let arg = rest[open + 1..close].trim();

            ops.push(parse_op(name, arg).map_err(invalid)?);
            rest = &rest[close + 1..];
        }

        Ok(Self { source, ops })
    }

    /// Expression text as written
    pub fn as_str(&self) -> &str {
        &self.source
    }

    /// Parsed operations in application order
    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    /// True when applying the expression cannot change any pixel
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(FilterOp::is_identity)
    }

    /// Compositing stage: render the buffer through the expression
    ///
    /// Output has the dimensions of the input.
    pub fn apply(&self, mut image: RgbaImage) -> RgbaImage {
        if self.is_identity() {
            return image;
        }

        debug!(
            expression = %self.source,
            width = image.width(),
            height = image.height(),
            "Compositing expression"
        );

        // Consecutive color operations run in one pass over the pixels;
        // a blur needs the whole neighbourhood and splits the passes.
        let mut pending: Vec<FilterOp> = Vec::new();
        for op in &self.ops {
            if op.is_identity() {
                continue;
            }
            match op {
                FilterOp::Blur(sigma) => {
                    apply_color_ops(&mut image, &pending);
                    pending.clear();
                    image = blur_rgb(&image, *sigma);
                }
                color => pending.push(*color),
            }
        }
        apply_color_ops(&mut image, &pending);
        image
    }
}

/// Gaussian blur of the color channels, alpha kept as is
fn blur_rgb(image: &RgbaImage, sigma: f32) -> RgbaImage {
    let mut blurred = image::imageops::blur(image, sigma);
    for (out, src) in blurred.pixels_mut().zip(image.pixels()) {
        out[3] = src[3];
    }
    blurred
}

fn apply_color_ops(image: &mut RgbaImage, ops: &[FilterOp]) {
    if ops.is_empty() {
        return;
    }
    for pixel in image.pixels_mut() {
        let mut rgb = [
            pixel[0] as f32 / 255.0,
            pixel[1] as f32 / 255.0,
            pixel[2] as f32 / 255.0,
        ];
        for op in ops {
            rgb = op.apply_rgb(rgb);
        }
        pixel[0] = to_channel(rgb[0]);
        pixel[1] = to_channel(rgb[1]);
        pixel[2] = to_channel(rgb[2]);
    }
}

#[inline]
fn to_channel(v: f32) -> u8 {
    (v.clamp(0.0, 1.0) * 255.0).round() as u8
}

fn parse_op(name: &str, arg: &str) -> Result<FilterOp, String> {
    match name {
        "grayscale" => Ok(FilterOp::Grayscale(parse_amount(arg)?.min(1.0))),
        "sepia" => Ok(FilterOp::Sepia(parse_amount(arg)?.min(1.0))),
        "saturate" => Ok(FilterOp::Saturate(parse_amount(arg)?)),
        "contrast" => Ok(FilterOp::Contrast(parse_amount(arg)?)),
        "brightness" => Ok(FilterOp::Brightness(parse_amount(arg)?)),
        "hue-rotate" => Ok(FilterOp::HueRotate(parse_angle(arg)?)),
        "blur" => Ok(FilterOp::Blur(parse_length(arg)?)),
        "" => Err("missing operation name".to_string()),
        other => Err(format!("unknown operation '{}'", other)),
    }
}

/// Number or percentage, non-negative; missing means 1
fn parse_amount(arg: &str) -> Result<f32, String> {
    if arg.is_empty() {
        return Ok(1.0);
    }
    let value = match arg.strip_suffix('%') {
        Some(pct) => parse_number(pct)? / 100.0,
        None => parse_number(arg)?,
    };
    if value < 0.0 {
        return Err(format!("negative amount '{}'", arg));
    }
    Ok(value)
}

/// Angle in degrees; missing means 0
fn parse_angle(arg: &str) -> Result<f32, String> {
    if arg.is_empty() {
        return Ok(0.0);
    }
    let units: [(&str, f32); 4] = [
        ("deg", 1.0),
        ("grad", 0.9),
        ("rad", 180.0 / std::f32::consts::PI),
        ("turn", 360.0),
    ];
    for (unit, to_degrees) in units {
        if let Some(number) = arg.strip_suffix(unit) {
            return Ok(parse_number(number)? * to_degrees);
        }
    }
    let value = parse_number(arg)?;
    if value != 0.0 {
        return Err(format!("angle '{}' needs a unit", arg));
    }
    Ok(0.0)
}

/// Blur radius in pixels; missing means 0
fn parse_length(arg: &str) -> Result<f32, String> {
    if arg.is_empty() {
        return Ok(0.0);
    }
    let value = match arg.strip_suffix("px") {
        Some(number) => parse_number(number)?,
        None => {
            let value = parse_number(arg)?;
            if value != 0.0 {
                return Err(format!("length '{}' needs a unit", arg));
            }
            value
        }
    };
    if value < 0.0 {
        return Err(format!("negative blur radius '{}'", arg));
    }
    Ok(value)
}

fn parse_number(text: &str) -> Result<f32, String> {
    let text = text.trim();
    text.parse::<f32>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| format!("invalid number '{}'", text))
}

impl FromStr for CompositeExpression {
    type Err = FilterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for CompositeExpression {
    type Error = FilterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<CompositeExpression> for String {
    fn from(expression: CompositeExpression) -> Self {
        expression.source
    }
}

impl fmt::Display for CompositeExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

/// Compositing stage of the filter pipeline
pub fn composite_expression(image: RgbaImage, expression: &CompositeExpression) -> RgbaImage {
    expression.apply(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    fn solid(rgba: [u8; 4]) -> RgbaImage {
        RgbaImage::from_pixel(4, 3, Rgba(rgba))
    }

    #[test]
    fn test_parse_vintage_expression() {
        let expr =
            CompositeExpression::parse("sepia(0.4) contrast(1.2) saturate(0.8) hue-rotate(-10deg)")
                .unwrap();
        assert_eq!(
            expr.ops(),
            &[
                FilterOp::Sepia(0.4),
                FilterOp::Contrast(1.2),
                FilterOp::Saturate(0.8),
                FilterOp::HueRotate(-10.0),
            ]
        );
    }

    #[test]
    fn test_parse_units_and_defaults() {
        let expr =
            CompositeExpression::parse("grayscale(50%) blur(0.5px) hue-rotate(0.25turn) sepia()")
                .unwrap();
        assert_eq!(
            expr.ops(),
            &[
                FilterOp::Grayscale(0.5),
                FilterOp::Blur(0.5),
                FilterOp::HueRotate(90.0),
                FilterOp::Sepia(1.0),
            ]
        );
    }

    #[test]
    fn test_parse_clamps_grayscale_amount() {
        let expr = CompositeExpression::parse("grayscale(3)").unwrap();
        assert_eq!(expr.ops(), &[FilterOp::Grayscale(1.0)]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        for bad in [
            "sparkle(1)",
            "contrast(abc)",
            "contrast(1.2",
            "contrast",
            "brightness(-1)",
            "hue-rotate(90)",
            "blur(2)",
            "(1)",
        ] {
            let err = CompositeExpression::parse(bad).unwrap_err();
            assert!(
                matches!(err, FilterError::InvalidExpression { .. }),
                "{} should fail",
                bad
            );
        }
    }

    #[test]
    fn test_empty_and_none_are_identity() {
        let image = solid([12, 34, 56, 255]);
        for text in ["", "  ", "none"] {
            let expr = CompositeExpression::parse(text).unwrap();
            assert!(expr.is_identity());
            assert_eq!(expr.apply(image.clone()), image);
        }
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let expr = CompositeExpression::parse("grayscale(1)").unwrap();
        let out = expr.apply(solid([200, 40, 90, 255]));
        let px = out.get_pixel(0, 0);
        assert_eq!(px[0], px[1]);
        assert_eq!(px[1], px[2]);
        assert_eq!(px[3], 255);
    }

    #[test]
    fn test_contrast_pushes_away_from_mid_gray() {
        let expr = CompositeExpression::parse("contrast(2)").unwrap();
        let out = expr.apply(solid([64, 128, 255, 255]));
        let px = out.get_pixel(0, 0);
        assert!(px[0] < 64);
        assert_eq!(px[2], 255);
    }

    #[test]
    fn test_brightness_clamps() {
        let expr = CompositeExpression::parse("brightness(3)").unwrap();
        let out = expr.apply(solid([100, 200, 0, 255]));
        assert_eq!(out.get_pixel(0, 0).0, [255, 255, 0, 255]);
    }

    #[test]
    fn test_full_hue_turn_is_identity() {
        let expr = CompositeExpression::parse("hue-rotate(360deg)").unwrap();
        assert!(expr.is_identity());
    }

    #[test]
    fn test_blur_keeps_dimensions() {
        let expr = CompositeExpression::parse("grayscale(0.5) blur(0.5px)").unwrap();
        let out = expr.apply(RgbaImage::from_pixel(7, 5, Rgba([10, 200, 30, 255])));
        assert_eq!(out.dimensions(), (7, 5));
    }

    #[test]
    fn test_serde_round_trips_source_text() {
        let expr = CompositeExpression::parse("saturate(1.6) contrast(1.1)").unwrap();
        let json = serde_json::to_string(&expr).unwrap();
        assert_eq!(json, "\"saturate(1.6) contrast(1.1)\"");
        let back: CompositeExpression = serde_json::from_str(&json).unwrap();
        assert_eq!(back, expr);

        assert!(serde_json::from_str::<CompositeExpression>("\"wobble(2)\"").is_err());
    }
}
