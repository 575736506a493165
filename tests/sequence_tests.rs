// SPDX-License-Identifier: MPL-2.0

//! Integration tests for the capture sequencer

use futures::future::BoxFuture;
use photobooth::app::{InstantScheduler, Scheduler};
use photobooth::backends::camera::{CameraFrame, FrameSnapshot};
use photobooth::errors::{CaptureError, ExportError};
use photobooth::{
    Config, FilterCatalog, FrameSlot, FrameSource, ImageFileSource, MissingFramePolicy,
    PhotoBooth, SessionState, StripExporter,
};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

/// Each sleep waits for a permit handed out by the test
struct GatedScheduler {
    permits: Arc<Semaphore>,
}

impl Scheduler for GatedScheduler {
    fn sleep(&self, _duration: Duration) -> BoxFuture<'static, ()> {
        let permits = Arc::clone(&self.permits);
        Box::pin(async move {
            if let Ok(permit) = permits.acquire_owned().await {
                permit.forget();
            }
        })
    }
}

/// Yields no frame on the listed snapshot calls
struct FlakySource {
    calls: AtomicUsize,
    missing: Vec<usize>,
}

impl FrameSource for FlakySource {
    fn name(&self) -> &str {
        "flaky"
    }

    fn snapshot(&self) -> Option<FrameSnapshot> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if self.missing.contains(&call) {
            return None;
        }
        Some(test_frame())
    }
}

fn test_frame() -> FrameSnapshot {
    FrameSnapshot::Raw(CameraFrame::rgba(8, 6, vec![140u8; 8 * 6 * 4]))
}

fn streaming_slot() -> Arc<FrameSlot> {
    let slot = Arc::new(FrameSlot::new("preview"));
    slot.publish(test_frame());
    slot
}

fn instant_booth(source: Arc<dyn FrameSource>) -> PhotoBooth {
    PhotoBooth::new(
        Arc::new(FilterCatalog::builtin()),
        source,
        &Config::default(),
    )
    .with_scheduler(Arc::new(InstantScheduler::new()))
}

fn gated_booth() -> (Arc<PhotoBooth>, Arc<Semaphore>) {
    let permits = Arc::new(Semaphore::new(0));
    let booth = PhotoBooth::new(
        Arc::new(FilterCatalog::builtin()),
        streaming_slot(),
        &Config::default(),
    )
    .with_scheduler(Arc::new(GatedScheduler {
        permits: Arc::clone(&permits),
    }));
    (Arc::new(booth), permits)
}

#[tokio::test]
async fn test_noir_reshoot_then_rainbow() {
    let booth = instant_booth(streaming_slot());

    booth.select_filter("Noir").unwrap();
    let first = booth.start_sequence().await.unwrap();
    assert_eq!(first.state, SessionState::Complete);
    assert_eq!(first.filter_ids(), vec!["Noir"; 3]);

    assert!(booth.reshoot());
    let reset = booth.session();
    assert_eq!(reset.state, SessionState::Idle);
    assert!(reset.photos.is_empty());
    assert!(!reset.show_result);

    booth.select_filter("Rainbow").unwrap();
    let second = booth.start_sequence().await.unwrap();
    assert_eq!(second.filter_ids(), vec!["Rainbow"; 3]);
}

#[tokio::test]
async fn test_restart_without_reshoot_clears_previous_photos() {
    let booth = instant_booth(streaming_slot());
    booth.start_sequence().await.unwrap();

    let again = booth.start_sequence().await.unwrap();
    assert_eq!(again.photos.len(), 3);
}

#[tokio::test]
async fn test_filter_change_mid_run_tags_each_shot() {
    let (booth, permits) = gated_booth();
    booth.select_filter("Noir").unwrap();
    let mut session = booth.subscribe_session();

    let run = tokio::spawn({
        let booth = Arc::clone(&booth);
        async move { booth.start_sequence().await }
    });

    // Four countdown ticks, then the first shutter
    permits.add_permits(4);
    session.wait_for(|s| s.photos.len() == 1).await.unwrap();
    booth.select_filter("Rainbow").unwrap();
    permits.add_permits(64);

    let done = run.await.unwrap().unwrap();
    assert_eq!(done.photos.len(), 3);
    assert_eq!(done.filter_ids(), vec!["Noir", "Rainbow", "Rainbow"]);
}

#[tokio::test]
async fn test_second_start_is_rejected_while_running() {
    let (booth, permits) = gated_booth();
    let mut session = booth.subscribe_session();

    let run = tokio::spawn({
        let booth = Arc::clone(&booth);
        async move { booth.start_sequence().await }
    });
    session
        .wait_for(|s| s.state == SessionState::Counting)
        .await
        .unwrap();

    assert!(booth.is_capturing());
    assert_eq!(
        booth.start_sequence().await.unwrap_err(),
        CaptureError::SequenceInProgress
    );
    assert!(!booth.reshoot());

    permits.add_permits(64);
    let done = run.await.unwrap().unwrap();
    assert_eq!(done.photos.len(), 3);
    assert!(!booth.is_capturing());
}

#[tokio::test]
async fn test_abort_discards_partial_photos() {
    let (booth, permits) = gated_booth();
    let mut session = booth.subscribe_session();

    let run = tokio::spawn({
        let booth = Arc::clone(&booth);
        async move { booth.start_sequence().await }
    });

    permits.add_permits(4);
    session.wait_for(|s| s.photos.len() == 1).await.unwrap();
    assert!(booth.abort());
    permits.add_permits(64);

    assert_eq!(run.await.unwrap().unwrap_err(), CaptureError::Aborted);
    let after = booth.session();
    assert_eq!(after.state, SessionState::Idle);
    assert!(after.photos.is_empty());
    assert_eq!(*booth.countdown().borrow(), None);

    // Restartable after an abort
    let booth = Arc::try_unwrap(booth).unwrap();
    let booth = booth.with_scheduler(Arc::new(InstantScheduler::new()));
    assert_eq!(booth.start_sequence().await.unwrap().photos.len(), 3);
}

#[tokio::test]
async fn test_countdown_shows_ticks_then_clears_each_shot() {
    let (booth, permits) = gated_booth();
    let mut countdown = booth.countdown();

    let run = tokio::spawn({
        let booth = Arc::clone(&booth);
        async move { booth.start_sequence().await }
    });

    // Every countdown change is followed by exactly one sleep
    let mut shown = Vec::new();
    for _ in 0..15 {
        countdown.changed().await.unwrap();
        let tick = *countdown.borrow_and_update();
        shown.push(tick.map(|t| t.label()).unwrap_or(""));
        permits.add_permits(1);
    }

    let done = run.await.unwrap().unwrap();
    assert_eq!(done.photos.len(), 3);
    assert_eq!(shown, ["3", "2", "1", "📸", ""].repeat(3));
    assert_eq!(*countdown.borrow(), None);
}

#[tokio::test]
async fn test_timed_out_run_returns_to_idle() {
    let (booth, permits) = gated_booth();
    let countdown = booth.countdown();

    let timed_out = tokio::time::timeout(Duration::from_millis(50), booth.start_sequence()).await;
    assert!(timed_out.is_err());

    assert!(!booth.is_capturing());
    assert_eq!(booth.session().state, SessionState::Idle);
    assert_eq!(*countdown.borrow(), None);

    permits.add_permits(64);
    assert_eq!(booth.start_sequence().await.unwrap().photos.len(), 3);
}

#[tokio::test]
async fn test_cancelled_run_discards_partial_photos() {
    let (booth, permits) = gated_booth();
    let mut session = booth.subscribe_session();

    let run = tokio::spawn({
        let booth = Arc::clone(&booth);
        async move { booth.start_sequence().await }
    });

    permits.add_permits(4);
    session.wait_for(|s| s.photos.len() == 1).await.unwrap();
    run.abort();
    assert!(run.await.unwrap_err().is_cancelled());

    let after = booth.session();
    assert_eq!(after.state, SessionState::Idle);
    assert!(after.photos.is_empty());
    assert_eq!(*booth.countdown().borrow(), None);
    assert!(!booth.is_capturing());
    assert!(!booth.abort());
}

#[tokio::test]
async fn test_missing_frame_is_skipped() {
    let source = Arc::new(FlakySource {
        calls: AtomicUsize::new(0),
        missing: vec![1],
    });
    let booth = instant_booth(source);

    let session = booth.start_sequence().await.unwrap();
    assert_eq!(session.state, SessionState::Complete);
    assert_eq!(session.photos.len(), 2);
    assert_eq!(session.skipped_shots, 1);
}

#[tokio::test]
async fn test_missing_frame_is_retried() {
    let source = Arc::new(FlakySource {
        calls: AtomicUsize::new(0),
        missing: vec![1, 2],
    });
    let booth = instant_booth(source).with_missing_frame_policy(MissingFramePolicy::retry(2));

    let session = booth.start_sequence().await.unwrap();
    assert_eq!(session.photos.len(), 3);
    assert_eq!(session.skipped_shots, 0);
}

#[tokio::test]
async fn test_undecodable_frame_counts_as_missing() {
    let slot = Arc::new(FrameSlot::new("garbage"));
    slot.publish(FrameSnapshot::encoded(vec![0u8, 1, 2, 3]));
    let booth = instant_booth(slot);

    let session = booth.start_sequence().await.unwrap();
    assert!(session.photos.is_empty());
    assert_eq!(session.skipped_shots, 3);
}

#[tokio::test]
async fn test_file_source_session_and_export() {
    let dir = std::env::temp_dir().join(format!("photobooth-session-{}", uuid::Uuid::new_v4()));
    std::fs::create_dir_all(&dir).unwrap();
    let still = image::RgbImage::from_pixel(32, 24, image::Rgb([180, 120, 60]));
    still.save(dir.join("still.png")).unwrap();

    let booth = instant_booth(Arc::new(ImageFileSource::new(vec![dir.join("still.png")])));
    let session = booth.start_sequence().await.unwrap();
    assert_eq!(session.photos.len(), 3);
    assert!(session.photos.iter().all(|p| (p.width, p.height) == (32, 24)));

    let out = dir.join("out");
    let path = booth
        .export_strip(&StripExporter::default(), &out)
        .await
        .unwrap();
    assert!(path.exists());
    assert_eq!(booth.session(), session);

    let _ = std::fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn test_export_of_empty_session_fails_without_change() {
    let booth = instant_booth(streaming_slot());
    let before = booth.session();

    let result = booth
        .export_strip(&StripExporter::default(), &std::env::temp_dir())
        .await;
    assert_eq!(result.unwrap_err(), ExportError::NothingToExport);
    assert_eq!(booth.session(), before);
}
