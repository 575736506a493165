// SPDX-License-Identifier: GPL-3.0-only

//! Shot sequence state machine
//!
//! The timed capture run as a plain iterator of steps. It knows nothing about
//! clocks or cameras; the booth driver performs each step (show a tick and
//! wait, fire the shutter, clear and pause) and moves on.
//!
//! One shot:
//!
//! ```text
//! Show(3) ─1s─▶ Show(2) ─1s─▶ Show(1) ─1s─▶ Show(📸) ─1s─▶ Shutter ─▶ Clear ─0.5s─▶
//! ```
//!
//! After the last shot the sequence yields `Finish` once and ends.

use super::state::{CountdownTick, SessionState};
use crate::constants::{SHOTS_PER_SESSION, timing};
use std::time::Duration;

/// One step of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceAction {
    /// Display a countdown tick and hold it
    Show {
        shot: usize,
        tick: CountdownTick,
        hold: Duration,
    },
    /// Sample the current frame and process it
    Shutter { shot: usize },
    /// Clear the countdown display and pause
    Clear { shot: usize, pause: Duration },
    /// All shots done
    Finish,
}

impl SequenceAction {
    /// Session state while this step runs
    pub fn session_state(&self) -> SessionState {
        match self {
            SequenceAction::Show { .. } => SessionState::Counting,
            SequenceAction::Shutter { .. } => SessionState::Capturing,
            SequenceAction::Clear { .. } => SessionState::Idle,
            SequenceAction::Finish => SessionState::Complete,
        }
    }

    /// Time the driver waits after performing the step
    pub fn wait(&self) -> Option<Duration> {
        match self {
            SequenceAction::Show { hold, .. } => Some(*hold),
            SequenceAction::Clear { pause, .. } => Some(*pause),
            _ => None,
        }
    }
}

/// Sequence timing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SequenceTiming {
    pub shots: usize,
    pub tick_interval: Duration,
    pub shot_pause: Duration,
}

impl Default for SequenceTiming {
    fn default() -> Self {
        Self {
            shots: SHOTS_PER_SESSION,
            tick_interval: Duration::from_millis(timing::COUNTDOWN_TICK_MS),
            shot_pause: Duration::from_millis(timing::SHOT_PAUSE_MS),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Tick(usize),
    Shutter,
    Clear,
    Finish,
    Done,
}

/// Iterator over the steps of one capture run
#[derive(Debug, Clone)]
pub struct ShotSequence {
    timing: SequenceTiming,
    shot: usize,
    phase: Phase,
}

impl ShotSequence {
    pub fn new(timing: SequenceTiming) -> Self {
        let phase = if timing.shots == 0 {
            Phase::Finish
        } else {
            Phase::Tick(0)
        };
        Self {
            timing,
            shot: 0,
            phase,
        }
    }

    /// Zero-based index of the shot in progress
    pub fn shot(&self) -> usize {
        self.shot
    }

    pub fn is_done(&self) -> bool {
        self.phase == Phase::Done
    }
}

impl Default for ShotSequence {
    fn default() -> Self {
        Self::new(SequenceTiming::default())
    }
}

impl Iterator for ShotSequence {
    type Item = SequenceAction;

    fn next(&mut self) -> Option<SequenceAction> {
        let shot = self.shot;
        let (action, next) = match self.phase {
            Phase::Tick(index) => {
                let next = if index + 1 < CountdownTick::SEQUENCE.len() {
                    Phase::Tick(index + 1)
                } else {
                    Phase::Shutter
                };
                let action = SequenceAction::Show {
                    shot,
                    tick: CountdownTick::SEQUENCE[index],
                    hold: self.timing.tick_interval,
                };
                (action, next)
            }
            Phase::Shutter => (SequenceAction::Shutter { shot }, Phase::Clear),
            Phase::Clear => {
                self.shot += 1;
                let next = if self.shot < self.timing.shots {
                    Phase::Tick(0)
                } else {
                    Phase::Finish
                };
                let action = SequenceAction::Clear {
                    shot,
                    pause: self.timing.shot_pause,
                };
                (action, next)
            }
            Phase::Finish => (SequenceAction::Finish, Phase::Done),
            Phase::Done => return None,
        };

        self.phase = next;
        Some(action)
    }
}
