// SPDX-License-Identifier: MPL-2.0

//! Capture sequencer
//!
//! [`PhotoBooth`] drives a [`ShotSequence`] against a frame source and owns
//! the session. Everything a presentation layer needs is observable:
//! countdown, session and selected filter are `tokio::sync::watch` channels.

use super::scheduler::{Scheduler, TokioScheduler};
use super::sequence::{SequenceAction, SequenceTiming, ShotSequence};
use super::state::{CaptureSession, CountdownTick, SessionState};
use crate::backends::camera::FrameSource;
use crate::config::{Config, MissingFramePolicy};
use crate::errors::{CaptureError, ExportError, FilterError};
use crate::filters::{FilterCatalog, FilterDescriptor};
use crate::pipelines::photo::{PhotoPipeline, ProcessedPhoto, ProcessingConfig};
use crate::pipelines::strip::StripExporter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};
use tokio::sync::watch;
use tracing::{debug, info, warn};

/// Run lifecycle states of `PhotoBooth::run`
const RUN_IDLE: u8 = 0;
const RUN_ACTIVE: u8 = 1;
const RUN_ABORTING: u8 = 2;

/// Ends a run that did not complete
///
/// Covers aborts, errors and a dropped `start_sequence` future (timeout,
/// `select!`, task abort): partial photos are discarded, the countdown is
/// cleared and the booth goes back to idle.
struct RunGuard<'a> {
    booth: &'a PhotoBooth,
    completed: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        debug!("Discarding unfinished capture run");
        self.booth.discard_run();
        self.booth.run.store(RUN_IDLE, Ordering::SeqCst);
    }
}

/// The photo booth capture core
pub struct PhotoBooth {
    catalog: Arc<FilterCatalog>,
    source: Arc<dyn FrameSource>,
    pipeline: PhotoPipeline,
    scheduler: Arc<dyn Scheduler>,
    timing: SequenceTiming,
    missing_frame: MissingFramePolicy,
    selected_filter: watch::Sender<String>,
    session: watch::Sender<CaptureSession>,
    countdown: watch::Sender<Option<CountdownTick>>,
    run: AtomicU8,
}

impl PhotoBooth {
    /// Create a booth with real-time scheduling
    ///
    /// The configured default filter is used when the catalog has it,
    /// otherwise the first filter of the catalog.
    pub fn new(catalog: Arc<FilterCatalog>, source: Arc<dyn FrameSource>, config: &Config) -> Self {
        let initial = match catalog.find(&config.default_filter) {
            Some(filter) => filter.id.clone(),
            None => {
                let fallback = catalog.first().id.clone();
                warn!(
                    configured = %config.default_filter,
                    fallback = %fallback,
                    "Default filter not in catalog"
                );
                fallback
            }
        };

        let pipeline = PhotoPipeline::new(ProcessingConfig {
            mirror: config.mirror,
            jpeg_quality: config.photo_quality,
        });

        Self {
            catalog,
            source,
            pipeline,
            scheduler: Arc::new(TokioScheduler),
            timing: SequenceTiming {
                tick_interval: config.countdown_interval(),
                shot_pause: config.shot_pause(),
                ..Default::default()
            },
            missing_frame: config.missing_frame,
            selected_filter: watch::Sender::new(initial),
            session: watch::Sender::new(CaptureSession::default()),
            countdown: watch::Sender::new(None),
            run: AtomicU8::new(RUN_IDLE),
        }
    }

    /// Replace the timer (tests use an instant scheduler)
    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_missing_frame_policy(mut self, policy: MissingFramePolicy) -> Self {
        self.missing_frame = policy;
        self
    }

    pub fn catalog(&self) -> &FilterCatalog {
        &self.catalog
    }

    /// Select the filter used for the next shot
    ///
    /// Allowed at any time, including mid-run.
    pub fn select_filter(&self, id: &str) -> Result<(), FilterError> {
        let filter = self.catalog.get(id)?;
        self.selected_filter.send_replace(filter.id.clone());
        info!(filter = %filter.id, "Filter selected");
        Ok(())
    }

    /// Id of the selected filter
    pub fn selected_filter(&self) -> String {
        self.selected_filter.borrow().clone()
    }

    /// Countdown display value (`None` = cleared)
    pub fn countdown(&self) -> watch::Receiver<Option<CountdownTick>> {
        self.countdown.subscribe()
    }

    /// Snapshot of the current session
    pub fn session(&self) -> CaptureSession {
        self.session.borrow().clone()
    }

    pub fn subscribe_session(&self) -> watch::Receiver<CaptureSession> {
        self.session.subscribe()
    }

    /// Whether a run is in flight
    pub fn is_capturing(&self) -> bool {
        self.run.load(Ordering::SeqCst) != RUN_IDLE
    }

    fn abort_requested(&self) -> bool {
        self.run.load(Ordering::SeqCst) == RUN_ABORTING
    }

    /// Run a full capture sequence
    ///
    /// # Returns
    /// * `Ok(CaptureSession)` - The completed session
    /// * `Err(CaptureError::SequenceInProgress)` - Another run is in flight
    /// * `Err(CaptureError::Aborted)` - [`Self::abort`] was called
    pub async fn start_sequence(&self) -> Result<CaptureSession, CaptureError> {
        if self
            .run
            .compare_exchange(RUN_IDLE, RUN_ACTIVE, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            warn!("Capture sequence already running");
            return Err(CaptureError::SequenceInProgress);
        }
        let mut guard = RunGuard {
            booth: self,
            completed: false,
        };

        self.session.send_modify(|session| session.reset());
        info!(shots = self.timing.shots, "Starting capture sequence");

        for action in ShotSequence::new(self.timing) {
            if self.abort_requested() {
                info!("Capture sequence aborted");
                return Err(CaptureError::Aborted);
            }

            self.set_state(action.session_state());

            match action {
                SequenceAction::Show { shot, tick, hold } => {
                    debug!(shot, tick = %tick, "Countdown");
                    self.countdown.send_replace(Some(tick));
                    self.scheduler.sleep(hold).await;
                }
                SequenceAction::Shutter { shot } => match self.take_shot(shot).await {
                    Some(photo) => self.session.send_modify(|session| {
                        session.push_photo(photo);
                    }),
                    None => {
                        warn!(shot, "Shot skipped, no frame");
                        self.session
                            .send_modify(|session| session.skipped_shots += 1);
                    }
                },
                SequenceAction::Clear { pause, .. } => {
                    self.countdown.send_replace(None);
                    self.scheduler.sleep(pause).await;
                }
                SequenceAction::Finish => {
                    self.session.send_modify(|session| session.show_result = true);
                }
            }
        }

        let session = self.session();
        // An abort accepted after the last step still wins
        if self
            .run
            .compare_exchange(RUN_ACTIVE, RUN_IDLE, Ordering::SeqCst, Ordering::SeqCst)
            .is_err()
        {
            info!("Capture sequence aborted");
            return Err(CaptureError::Aborted);
        }
        guard.completed = true;

        info!(
            photos = session.photos.len(),
            skipped = session.skipped_shots,
            "Capture sequence complete"
        );
        Ok(session)
    }

    /// Ask the running sequence to stop at its next step
    ///
    /// Returns false when nothing is running.
    pub fn abort(&self) -> bool {
        match self.run.compare_exchange(
            RUN_ACTIVE,
            RUN_ABORTING,
            Ordering::SeqCst,
            Ordering::SeqCst,
        ) {
            Ok(_) => {
                info!("Abort requested");
                true
            }
            Err(state) => state == RUN_ABORTING,
        }
    }

    /// Discard all photos and go back to Idle
    ///
    /// Rejected while a run is in flight.
    pub fn reshoot(&self) -> bool {
        if self.is_capturing() {
            warn!("Cannot reshoot while capturing");
            return false;
        }
        self.session.send_modify(|session| session.reset());
        self.countdown.send_replace(None);
        info!("Session reset for reshoot");
        true
    }

    /// Export the session photos as a strip
    ///
    /// Reads the session only; on failure it is left as it was.
    pub async fn export_strip(
        &self,
        exporter: &StripExporter,
        output_dir: &Path,
    ) -> Result<PathBuf, ExportError> {
        let photos = self.session.borrow().photos.clone();
        exporter.export(&photos, output_dir).await
    }

    fn set_state(&self, state: SessionState) {
        self.session.send_if_modified(|session| {
            if session.state == state {
                return false;
            }
            session.state = state;
            true
        });
    }

    fn discard_run(&self) {
        self.countdown.send_replace(None);
        self.session.send_modify(|session| session.reset());
    }

    fn current_filter(&self) -> FilterDescriptor {
        let id = self.selected_filter();
        self.catalog
            .find(&id)
            .unwrap_or_else(|| self.catalog.first())
            .clone()
    }

    /// Capture one shot, applying the missing-frame policy
    async fn take_shot(&self, shot: usize) -> Option<ProcessedPhoto> {
        let retries = self.missing_frame.retries();

        for attempt in 0..=retries {
            // Filter active at the instant of capture
            let filter = self.current_filter();

            match self.pipeline.capture(Arc::clone(&self.source), &filter).await {
                Ok(photo) => {
                    info!(shot, filter = %photo.filter_id, attempt, "Shot captured");
                    return Some(photo);
                }
                Err(e) => {
                    warn!(shot, attempt, error = %e, "Shot capture failed");
                }
            }

            if attempt < retries {
                if self.abort_requested() {
                    return None;
                }
                self.scheduler.sleep(self.missing_frame.interval()).await;
            }
        }

        None
    }
}

impl std::fmt::Debug for PhotoBooth {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PhotoBooth")
            .field("source", &self.source.name())
            .field("selected_filter", &*self.selected_filter.borrow())
            .field("timing", &self.timing)
            .field("missing_frame", &self.missing_frame)
            .field("running", &self.is_capturing())
            .finish_non_exhaustive()
    }
}
