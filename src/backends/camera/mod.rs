// SPDX-License-Identifier: MPL-2.0

//! Camera frame sources
//!
//! The capture core never talks to a device directly. It asks a
//! [`FrameSource`] for the current frame at the instant the shutter fires:
//!
//! ```text
//! ┌─────────────────────┐
//! │  Capture Sequencer  │
//! └──────────┬──────────┘
//!            │ snapshot()
//!            ▼
//! ┌─────────────────────┐
//! │  FrameSource Trait  │  ← Option<FrameSnapshot>, None = not streaming
//! └──────────┬──────────┘
//!            │
//!      ┌─────┴──────┬──────────┐
//!      ▼            ▼          ▼
//! ┌─────────┐ ┌──────────┐ ┌──────┐
//! │  Files  │ │FrameSlot │ │ V4L2 │
//! └─────────┘ └──────────┘ └──────┘
//! ```

pub mod file_source;
pub mod format_converters;
pub mod types;
#[cfg(feature = "v4l2")]
pub mod v4l2;

pub use file_source::ImageFileSource;
pub use types::*;

use std::sync::Mutex;
use tracing::debug;

/// Capability that yields the current camera frame on demand
pub trait FrameSource: Send + Sync {
    /// Human readable source name for logs
    fn name(&self) -> &str;

    /// Sample the current frame
    ///
    /// Returns `None` when no frame is flowing yet (device still starting,
    /// stream stalled, source exhausted).
    fn snapshot(&self) -> Option<FrameSnapshot>;
}

/// Latest-frame slot fed by a live stream
///
/// A producer (capture thread, preview pipeline) publishes every new frame;
/// the sequencer samples whatever frame is current at shutter time. Until the
/// first frame arrives the slot reports no frame.
#[derive(Debug, Default)]
pub struct FrameSlot {
    name: String,
    latest: Mutex<Option<FrameSnapshot>>,
}

impl FrameSlot {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            latest: Mutex::new(None),
        }
    }

    /// Replace the current frame
    pub fn publish(&self, snapshot: FrameSnapshot) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = Some(snapshot);
        }
    }

    /// Drop the current frame (stream stopped)
    pub fn clear(&self) {
        if let Ok(mut latest) = self.latest.lock() {
            *latest = None;
        }
        debug!(source = %self.name, "Frame slot cleared");
    }
}

impl FrameSource for FrameSlot {
    fn name(&self) -> &str {
        &self.name
    }

    fn snapshot(&self) -> Option<FrameSnapshot> {
        self.latest
            .lock()
            .ok()
            .and_then(|latest| latest.clone())
            .filter(|snapshot| !snapshot.is_empty())
    }
}
