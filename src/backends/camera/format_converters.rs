// SPDX-License-Identifier: GPL-3.0-only
//! Pixel format conversion for raw camera frames
//!
//! Every raw frame ends up as tightly packed RGBA before it reaches the
//! filter stages.

use super::types::{CameraFrame, PixelFormat};

/// Convert YUYV (YUV 4:2:2) to RGBA
///
/// YUYV format: Y0 U0 Y1 V0 - each 4-byte group encodes 2 pixels.
/// Uses BT.601 coefficients for YUV to RGB conversion. Rows are read
/// `stride` bytes apart.
pub fn yuyv_to_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let pixel_count = (width * height) as usize;
    let row_bytes = (width * 2) as usize;
    let mut rgba = Vec::with_capacity(pixel_count * 4);

    for row in 0..height as usize {
        let start = row * stride as usize;
        let Some(line) = data.get(start..start + row_bytes) else {
            break;
        };

        // YUYV: Y0 U0 Y1 V0 - processes 2 pixels at a time
        for chunk in line.chunks_exact(4) {
            let y0 = chunk[0] as f32;
            let u = chunk[1] as f32 - 128.0;
            let y1 = chunk[2] as f32;
            let v = chunk[3] as f32 - 128.0;

            for y in [y0, y1] {
                let r = (y + 1.402 * v).clamp(0.0, 255.0) as u8;
                let g = (y - 0.344 * u - 0.714 * v).clamp(0.0, 255.0) as u8;
                let b = (y + 1.772 * u).clamp(0.0, 255.0) as u8;

                rgba.extend_from_slice(&[r, g, b, 255]);
            }
        }
    }

    rgba
}

/// Copy an RGBA frame with row padding into a tightly packed buffer
pub fn pack_rgba(data: &[u8], width: u32, height: u32, stride: u32) -> Vec<u8> {
    let row_bytes = (width * 4) as usize;
    if stride as usize == row_bytes {
        return data[..(row_bytes * height as usize).min(data.len())].to_vec();
    }

    let mut packed = Vec::with_capacity(row_bytes * height as usize);
    for row in 0..height as usize {
        let start = row * stride as usize;
        match data.get(start..start + row_bytes) {
            Some(line) => packed.extend_from_slice(line),
            None => break,
        }
    }
    packed
}

/// Convert any raw frame to packed RGBA
///
/// Returns `None` when the buffer is too short for the declared geometry.
pub fn frame_to_rgba(frame: &CameraFrame) -> Option<Vec<u8>> {
    if frame.width == 0 || frame.height == 0 || frame.data.len() < frame.required_len() {
        return None;
    }

    let rgba = match frame.format {
        PixelFormat::RGBA => pack_rgba(&frame.data, frame.width, frame.height, frame.stride),
        PixelFormat::YUYV => yuyv_to_rgba(&frame.data, frame.width, frame.height, frame.stride),
    };

    (rgba.len() == (frame.width * frame.height * 4) as usize).then_some(rgba)
}
