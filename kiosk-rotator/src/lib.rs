//! # Kiosk Rotator Library (kiosk-rotator)
//!
//! Media rotation engine for an unattended kiosk display.
//!
//! **Purpose:** Cycle through content groups fetched from a catalog, play
//! each group's queue to completion, show a fixed-length interstitial
//! between cycles, and refresh content without interrupting playback.
//!
//! **Architecture:** A synchronous [`rotation::RotationManager`] state
//! machine driven by a single-task tokio event loop ([`runtime`]), with the
//! catalog and the media surface behind traits.

pub mod api;
pub mod catalog;
pub mod config;
pub mod error;
pub mod playback;
pub mod queue;
pub mod refresh;
pub mod rotation;
pub mod runtime;
pub mod snapshot;
pub mod surface;

pub use error::{Error, Result};
