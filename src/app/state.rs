// SPDX-License-Identifier: GPL-3.0-only

//! Capture session state

use crate::constants::SHOTS_PER_SESSION;
use crate::pipelines::photo::ProcessedPhoto;
use std::fmt;

/// Session state machine
///
/// ```text
/// Idle → Counting → Capturing → Idle (next shot) → … → Complete
///   ▲                                                     │
///   └──────────────────────── reshoot ────────────────────┘
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting, or between two shots
    #[default]
    Idle,
    /// Countdown running
    Counting,
    /// Shutter fired, frame being processed
    Capturing,
    /// All shots taken
    Complete,
}

impl SessionState {
    /// Whether a run is in flight
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Counting | SessionState::Capturing)
    }
}

/// Value shown by the countdown display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownTick {
    Three,
    Two,
    One,
    /// Shutter marker (the camera emoji)
    Shutter,
}

impl CountdownTick {
    /// Ticks of one shot in display order
    pub const SEQUENCE: [CountdownTick; 4] = [
        CountdownTick::Three,
        CountdownTick::Two,
        CountdownTick::One,
        CountdownTick::Shutter,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            CountdownTick::Three => "3",
            CountdownTick::Two => "2",
            CountdownTick::One => "1",
            CountdownTick::Shutter => "📸",
        }
    }

    pub fn is_shutter(&self) -> bool {
        matches!(self, CountdownTick::Shutter)
    }
}

impl fmt::Display for CountdownTick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Photos and state of the current run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CaptureSession {
    /// Photos in capture order (0..=3)
    pub photos: Vec<ProcessedPhoto>,
    pub state: SessionState,
    /// Result view requested (set when the run completes)
    pub show_result: bool,
    /// Shots dropped because no frame was available
    pub skipped_shots: usize,
}

impl CaptureSession {
    /// Clear photos and flags, back to Idle
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Append a photo, ignoring anything past the shot count
    pub fn push_photo(&mut self, photo: ProcessedPhoto) -> bool {
        if self.photos.len() >= SHOTS_PER_SESSION {
            return false;
        }
        self.photos.push(photo);
        true
    }

    pub fn is_complete(&self) -> bool {
        self.state == SessionState::Complete
    }

    /// Ids of the filters the photos were taken with
    pub fn filter_ids(&self) -> Vec<&str> {
        self.photos.iter().map(|p| p.filter_id.as_str()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_tick_labels() {
        let labels: Vec<_> = CountdownTick::SEQUENCE.iter().map(|t| t.label()).collect();
        assert_eq!(labels, vec!["3", "2", "1", "📸"]);
        assert!(CountdownTick::Shutter.is_shutter());
    }

    #[test]
    fn test_session_caps_photo_count() {
        let mut session = CaptureSession::default();
        let photo = ProcessedPhoto::new(Arc::from(vec![0u8]), "Noir".to_string(), 1, 1);
        for _ in 0..SHOTS_PER_SESSION {
            assert!(session.push_photo(photo.clone()));
        }
        assert!(!session.push_photo(photo));
        assert_eq!(session.filter_ids(), vec!["Noir"; 3]);

        session.reset();
        assert_eq!(session, CaptureSession::default());
    }

    #[test]
    fn test_running_states() {
        assert!(SessionState::Counting.is_running());
        assert!(SessionState::Capturing.is_running());
        assert!(!SessionState::Idle.is_running());
        assert!(!SessionState::Complete.is_running());
    }
}
