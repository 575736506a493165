// SPDX-License-Identifier: GPL-3.0-only

//! Direct V4L2 webcam capture
//!
//! Opens the device with the v4l crate, prefers MJPEG (frames pass through
//! as encoded stills) and falls back to YUYV raw frames. A capture thread
//! keeps publishing into a [`FrameSlot`]; snapshots sample whatever frame is
//! current.

use super::types::*;
use super::{FrameSlot, FrameSource};
use crate::constants::timing;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::Instant;
use tracing::{debug, error, info, warn};
use v4l::buffer::Type;
use v4l::io::traits::CaptureStream;
use v4l::prelude::*;
use v4l::video::Capture;

/// Live webcam source backed by a V4L2 capture thread
pub struct V4l2Source {
    device_path: String,
    slot: Arc<FrameSlot>,
    running: Arc<AtomicBool>,
    thread_handle: Option<std::thread::JoinHandle<()>>,
}

impl V4l2Source {
    /// Start capturing from a V4L2 device
    ///
    /// # Arguments
    /// * `device_path` - Device node (e.g. `/dev/video0`)
    /// * `width` - Requested frame width
    /// * `height` - Requested frame height
    pub fn start(device_path: &str, width: u32, height: u32) -> Self {
        let slot = Arc::new(FrameSlot::new(device_path));
        let running = Arc::new(AtomicBool::new(true));

        let thread_slot = Arc::clone(&slot);
        let thread_running = Arc::clone(&running);
        let path = device_path.to_string();

        let thread_handle = std::thread::Builder::new()
            .name("v4l2-capture".to_string())
            .spawn(move || {
                if let Err(e) = capture_loop(&path, width, height, &thread_slot, &thread_running) {
                    error!(device = %path, error = %e, "V4L2 capture loop failed");
                }
                thread_slot.clear();
            })
            .map_err(|e| error!(error = %e, "Failed to spawn V4L2 capture thread"))
            .ok();

        Self {
            device_path: device_path.to_string(),
            slot,
            running,
            thread_handle,
        }
    }

    /// Stop the capture thread and wait for it
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
            info!(device = %self.device_path, "V4L2 capture stopped");
        }
    }
}

impl Drop for V4l2Source {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl FrameSource for V4l2Source {
    fn name(&self) -> &str {
        &self.device_path
    }

    fn snapshot(&self) -> Option<FrameSnapshot> {
        self.slot.snapshot()
    }
}

/// Main capture loop running in a separate thread
fn capture_loop(
    device_path: &str,
    width: u32,
    height: u32,
    slot: &FrameSlot,
    running: &AtomicBool,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    static FRAME_COUNTER: AtomicU64 = AtomicU64::new(0);

    info!(device_path, width, height, "Opening V4L2 device");

    let mut dev = Device::with_path(device_path)
        .map_err(|e| format!("Failed to open V4L2 device {}: {}", device_path, e))?;

    let mjpg = v4l::FourCC::new(b"MJPG");
    let yuyv = v4l::FourCC::new(b"YUYV");

    let mut format = dev
        .format()
        .map_err(|e| format!("Failed to query format: {}", e))?;
    format.width = width;
    format.height = height;
    format.fourcc = mjpg;

    let format = match dev.set_format(&format) {
        Ok(f) => f,
        Err(e) => {
            warn!(error = %e, "Could not set MJPEG format, using current device format");
            dev.format()
                .map_err(|e| format!("Failed to query format: {}", e))?
        }
    };

    info!(
        width = format.width,
        height = format.height,
        fourcc = ?format.fourcc,
        "V4L2 format negotiated"
    );

    if format.fourcc != mjpg && format.fourcc != yuyv {
        return Err(format!("Unsupported pixel format {:?}", format.fourcc).into());
    }

    let mut stream = MmapStream::with_buffers(&mut dev, Type::VideoCapture, 4)
        .map_err(|e| format!("Failed to create buffer stream: {}", e))?;

    while running.load(Ordering::SeqCst) {
        let frame_start = Instant::now();

        match stream.next() {
            Ok((buf, meta)) => {
                let frame_num = FRAME_COUNTER.fetch_add(1, Ordering::Relaxed);
                let used = match meta.bytesused as usize {
                    0 => buf.len(),
                    n => n.min(buf.len()),
                };
                let bytes = &buf[..used];

                let snapshot = if format.fourcc == mjpg {
                    FrameSnapshot::encoded(bytes.to_vec())
                } else {
                    FrameSnapshot::Raw(CameraFrame {
                        width: format.width,
                        height: format.height,
                        data: Arc::from(bytes),
                        format: PixelFormat::YUYV,
                        stride: format.stride,
                        captured_at: frame_start,
                    })
                };
                slot.publish(snapshot);

                if frame_num % timing::FRAME_LOG_INTERVAL == 0 {
                    debug!(
                        frame = frame_num,
                        sequence = meta.sequence,
                        size = used,
                        "V4L2 frame captured"
                    );
                }
            }
            Err(e) => {
                warn!(error = %e, "Failed to capture V4L2 frame");
                std::thread::sleep(timing::CAPTURE_RETRY_BACKOFF);
            }
        }
    }

    info!("V4L2 capture loop ended");
    Ok(())
}
