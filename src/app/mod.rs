// SPDX-License-Identifier: MPL-2.0

//! Capture sequencer for the photo booth
//!
//! # Architecture
//!
//! - `state`: Session types (CaptureSession, SessionState, CountdownTick)
//! - `sequence`: Pure shot state machine (no clocks, no camera)
//! - `scheduler`: Injectable sleep primitive (tokio or instant)
//! - `booth`: Async driver tying sequence, frame source and pipeline together
//!
//! # Main Types
//!
//! - `PhotoBooth`: Runs capture sequences and owns the session
//! - `ShotSequence`: Steps of one run
//! - `Scheduler`: Timer used between steps

mod booth;
pub mod scheduler;
pub mod sequence;
pub mod state;

pub use booth::PhotoBooth;
pub use scheduler::{InstantScheduler, Scheduler, TokioScheduler};
pub use sequence::{SequenceAction, SequenceTiming, ShotSequence};
pub use state::{CaptureSession, CountdownTick, SessionState};
