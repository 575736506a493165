// SPDX-License-Identifier: MPL-2.0

//! Photobooth - capture core of a vintage photo booth
//!
//! This library runs timed three-shot capture sequences against a camera
//! frame source, styles every shot with a film filter and exports the
//! finished photos as a photo strip.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - [`app`]: Capture sequencer and session state
//! - [`backends`]: Camera frame sources
//! - [`filters`]: Filter catalog, per-pixel transforms and compositing expressions
//! - [`pipelines`]: Photo processing and strip export
//! - [`config`]: User configuration handling
//!
//! # Example
//!
//! ```no_run
//! use photobooth::{Config, FilterCatalog, ImageFileSource, PhotoBooth};
//! use std::sync::Arc;
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(ImageFileSource::new(vec!["selfie.jpg".into()]));
//! let booth = PhotoBooth::new(Arc::new(FilterCatalog::builtin()), source, &Config::default());
//! booth.select_filter("Noir")?;
//! let session = booth.start_sequence().await?;
//! assert!(session.photos.len() <= 3);
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod backends;
pub mod config;
pub mod constants;
pub mod errors;
pub mod filters;
pub mod pipelines;

// Re-export commonly used types
pub use app::{CaptureSession, CountdownTick, PhotoBooth, SessionState};
pub use backends::camera::{FrameSlot, FrameSource, ImageFileSource};
pub use config::{Config, MissingFramePolicy};
pub use errors::{CaptureError, ConfigError, ExportError, FilterError};
pub use filters::{FilterCatalog, FilterDescriptor};
pub use pipelines::photo::ProcessedPhoto;
pub use pipelines::strip::{StripExporter, StripLayout, StripRenderer};
