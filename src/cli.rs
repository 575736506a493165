// SPDX-License-Identifier: GPL-3.0-only

//! CLI commands for photo booth operations
//!
//! This module provides command-line functionality for:
//! - Listing the filter catalog
//! - Filtering a single image
//! - Running a full capture session

use photobooth::app::{InstantScheduler, Scheduler, TokioScheduler};
use photobooth::backends::camera::FrameSnapshot;
use photobooth::pipelines::photo::encoding::photo_filename;
use photobooth::pipelines::photo::{FrameProcessor, PhotoPipeline, ProcessingConfig};
use photobooth::pipelines::strip::{StripExporter, StripLayout};
use photobooth::{Config, FilterCatalog, FrameSource, ImageFileSource, PhotoBooth};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, warn};

/// Options of the `shoot` command
pub struct ShootOptions {
    pub sources: Vec<PathBuf>,
    pub device: Option<String>,
    pub filter: Option<String>,
    pub filters: Vec<String>,
    pub output: Option<PathBuf>,
    pub strip: bool,
    pub fast: bool,
}

/// Built-in catalog, or the one in `path`
pub fn load_catalog(path: Option<&Path>) -> Result<Arc<FilterCatalog>, Box<dyn std::error::Error>> {
    let catalog = match path {
        Some(path) => FilterCatalog::load(path)?,
        None => FilterCatalog::builtin(),
    };
    Ok(Arc::new(catalog))
}

/// List all filters of the catalog
pub fn list_filters(catalog: &FilterCatalog) -> Result<(), Box<dyn std::error::Error>> {
    println!("Available filters:");
    println!();
    for filter in catalog.iter() {
        let transform = filter
            .pixel_transform
            .map(|t| format!(" + {}", t))
            .unwrap_or_default();
        println!("  {:<12} {}{}", filter.id, filter.expression, transform);
    }
    Ok(())
}

/// Filter a single image file
pub fn apply_filter(
    catalog: &FilterCatalog,
    input: &Path,
    filter: Option<String>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let filter_id = filter.unwrap_or(config.default_filter.clone());
    let filter = catalog.get(&filter_id)?;

    let bytes = std::fs::read(input)?;
    let processor = FrameProcessor::new(ProcessingConfig {
        mirror: false,
        jpeg_quality: config.photo_quality,
    });
    let photo = processor.process_blocking(&FrameSnapshot::encoded(bytes), filter)?;

    let output_path = match output {
        Some(path) if path.is_dir() => path.join(photo_name()),
        Some(path) => path,
        None => config.save_dir().join(photo_name()),
    };
    if let Some(parent) = output_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&output_path, &photo.encoded)?;

    println!(
        "{} ({}x{}, {}) saved: {}",
        input.display(),
        photo.width,
        photo.height,
        photo.filter_id,
        output_path.display()
    );
    Ok(())
}

/// Run a three-shot session
pub fn shoot(
    catalog: Arc<FilterCatalog>,
    options: ShootOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let output_dir = options.output.clone().unwrap_or_else(|| config.save_dir());

    // Create async runtime for the sequencer
    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(async move {
        let source = open_source(&options)?;
        println!("Using source: {}", source.name());

        let scheduler: Arc<dyn Scheduler> = if options.fast {
            Arc::new(InstantScheduler::new())
        } else {
            Arc::new(TokioScheduler)
        };
        let booth = Arc::new(PhotoBooth::new(catalog, source, &config).with_scheduler(scheduler));

        let first = options.filters.first().or(options.filter.as_ref());
        if let Some(id) = first {
            booth.select_filter(id)?;
        }
        println!("Filter: {}", booth.selected_filter());

        let countdown = spawn_countdown_printer(&booth);
        let switcher = spawn_filter_switcher(&booth, options.filters.clone());

        let session = booth.start_sequence().await?;
        countdown.abort();
        switcher.abort();

        println!(
            "Session complete: {} photo(s), {} skipped",
            session.photos.len(),
            session.skipped_shots
        );
        for (index, photo) in session.photos.iter().enumerate() {
            println!(
                "  [{}] {} {}x{} ({} bytes)",
                index + 1,
                photo.filter_id,
                photo.width,
                photo.height,
                photo.encoded.len()
            );
        }

        if session.photos.is_empty() {
            return Err("No photos captured".into());
        }

        if options.strip {
            let exporter = StripExporter::new(
                Arc::new(StripLayout::with_scale(config.strip_scale)),
                config.strip_quality,
            );
            let path = booth.export_strip(&exporter, &output_dir).await?;
            println!("Strip saved: {}", path.display());
        } else {
            let pipeline = PhotoPipeline::default();
            for photo in &session.photos {
                let path = pipeline.save(photo, &output_dir).await?;
                println!("Photo saved: {}", path.display());
            }
        }

        Ok::<(), Box<dyn std::error::Error>>(())
    })
}

fn open_source(options: &ShootOptions) -> Result<Arc<dyn FrameSource>, Box<dyn std::error::Error>> {
    if let Some(device) = options.device.as_deref() {
        return open_device(device);
    }

    if options.sources.is_empty() {
        return Err("No frame source: pass --source <FILE|DIR> or --device <PATH>".into());
    }
    let source = ImageFileSource::new(options.sources.iter().cloned());
    if source.is_empty() {
        return Err("No images found in the given sources".into());
    }
    Ok(Arc::new(source))
}

#[cfg(feature = "v4l2")]
fn open_device(device: &str) -> Result<Arc<dyn FrameSource>, Box<dyn std::error::Error>> {
    use photobooth::backends::camera::v4l2::V4l2Source;
    Ok(Arc::new(V4l2Source::start(device, 1280, 720)))
}

#[cfg(not(feature = "v4l2"))]
fn open_device(device: &str) -> Result<Arc<dyn FrameSource>, Box<dyn std::error::Error>> {
    Err(format!(
        "Cannot open {}: built without V4L2 support (enable the `v4l2` feature)",
        device
    )
    .into())
}

/// Print countdown ticks as they change
fn spawn_countdown_printer(booth: &PhotoBooth) -> tokio::task::JoinHandle<()> {
    let mut countdown = booth.countdown();
    tokio::spawn(async move {
        while countdown.changed().await.is_ok() {
            let tick = *countdown.borrow_and_update();
            if let Some(tick) = tick {
                println!("{}", tick);
            }
        }
    })
}

/// Switch to the next listed filter after every shot
fn spawn_filter_switcher(
    booth: &Arc<PhotoBooth>,
    filters: Vec<String>,
) -> tokio::task::JoinHandle<()> {
    let booth = Arc::clone(booth);
    let mut session = booth.subscribe_session();
    tokio::spawn(async move {
        let mut done = 0;
        while done + 1 < filters.len() && session.changed().await.is_ok() {
            let shots = {
                let session = session.borrow_and_update();
                session.photos.len() + session.skipped_shots
            };
            if shots > done {
                done = shots;
                if let Some(id) = filters.get(done) {
                    match booth.select_filter(id) {
                        Ok(()) => debug!(filter = %id, shot = done, "Switched filter"),
                        Err(e) => warn!(error = %e, "Cannot switch filter"),
                    }
                }
            }
        }
    })
}

fn photo_name() -> String {
    photo_filename()
}
