// SPDX-License-Identifier: MPL-2.0

//! Processing pipelines for photos and photo strips
//!
//! Heavy operations run on the blocking pool so that the countdown and the
//! live stream keep going while a shot is processed.
//!
//! # Pipeline Architecture
//!
//! ```text
//! ┌──────────────┐     ┌───────────────────┐     ┌────────────────┐
//! │ Frame        │ ──▶ │  Photo Pipeline   │ ──▶ │ ProcessedPhoto │
//! │ Snapshot     │     │  - Decode/Mirror  │     │  (JPEG q90)    │
//! │              │     │  - Pixel + Expr   │     │                │
//! └──────────────┘     └───────────────────┘     └────────────────┘
//!
//! ┌──────────────┐     ┌───────────────────┐     ┌────────────────┐
//! │ 3 × Photo    │ ──▶ │  Strip Export     │ ──▶ │  Strip JPEG    │
//! │              │     │  - Layout         │     │  (q100)        │
//! └──────────────┘     └───────────────────┘     └────────────────┘
//! ```
//!
//! # Modules
//!
//! - [`photo`]: Single-shot capture, filtering and JPEG encoding
//! - [`strip`]: Photo strip rendering and export

pub mod photo;
pub mod strip;
