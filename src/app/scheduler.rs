// SPDX-License-Identifier: GPL-3.0-only

//! Timer abstraction for the capture run
//!
//! The booth never calls `tokio::time::sleep` directly so tests can run a
//! full sequence without waiting on the wall clock.

use futures::future::BoxFuture;
use std::sync::Mutex;
use std::time::Duration;
use tracing::trace;

/// Sleep primitive used between countdown ticks and shots
pub trait Scheduler: Send + Sync {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()>;
}

/// Real time, backed by the tokio timer
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioScheduler;

impl Scheduler for TokioScheduler {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        Box::pin(tokio::time::sleep(duration))
    }
}

/// Records requested sleeps and returns immediately
///
/// Each sleep still yields once to the runtime so other tasks can observe
/// intermediate states.
#[derive(Debug, Default)]
pub struct InstantScheduler {
    sleeps: Mutex<Vec<Duration>>,
}

impl InstantScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Requested sleeps in call order
    pub fn sleeps(&self) -> Vec<Duration> {
        self.sleeps
            .lock()
            .map(|sleeps| sleeps.clone())
            .unwrap_or_default()
    }

    /// Sum of all requested sleeps
    pub fn total(&self) -> Duration {
        self.sleeps().into_iter().sum()
    }
}

impl Scheduler for InstantScheduler {
    fn sleep(&self, duration: Duration) -> BoxFuture<'static, ()> {
        if let Ok(mut sleeps) = self.sleeps.lock() {
            sleeps.push(duration);
        }
        trace!(?duration, "Skipping sleep");
        Box::pin(tokio::task::yield_now())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_instant_scheduler_records() {
        let scheduler = InstantScheduler::new();
        scheduler.sleep(Duration::from_millis(1000)).await;
        scheduler.sleep(Duration::from_millis(500)).await;

        assert_eq!(
            scheduler.sleeps(),
            vec![Duration::from_millis(1000), Duration::from_millis(500)]
        );
        assert_eq!(scheduler.total(), Duration::from_millis(1500));
    }

    #[tokio::test]
    async fn test_tokio_scheduler_sleeps() {
        let start = std::time::Instant::now();
        TokioScheduler.sleep(Duration::from_millis(5)).await;
        assert!(start.elapsed() >= Duration::from_millis(5));
    }
}
