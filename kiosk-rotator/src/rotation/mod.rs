//! Rotation between content groups
//!
//! [`RotationManager`] is a synchronous state machine. It never sleeps or
//! performs I/O: callers feed it inputs stamped with the current time and
//! carry out the [`Command`]s it returns. The runtime loop in
//! [`crate::runtime`] is the only production caller.

mod manager;
mod staging;

pub use manager::RotationManager;
pub use staging::StagedQueue;

use crate::playback::{PlaybackVariant, SurfaceCommand};
use kiosk_common::events::FetchKind;
use std::time::Duration;
use tokio::time::Instant;

/// Default interstitial length
pub const DEFAULT_INTERSTITIAL: Duration = Duration::from_secs(50);

/// Default delay before retrying a failed activation fetch
pub const DEFAULT_FETCH_RETRY: Duration = Duration::from_secs(5);

/// Timing and presentation settings for a rotation
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationConfig {
    pub interstitial: Duration,
    pub fetch_retry: Duration,
    pub variant: PlaybackVariant,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interstitial: DEFAULT_INTERSTITIAL,
            fetch_retry: DEFAULT_FETCH_RETRY,
            variant: PlaybackVariant::Linear,
        }
    }
}

/// Effect requested by the manager
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Forward to the media surface
    Surface(SurfaceCommand),

    /// Fetch `source` for group `group` after `delay`; report back through
    /// [`RotationManager::on_fetch_result`]
    Fetch {
        group: usize,
        source: String,
        kind: FetchKind,
        delay: Duration,
    },

    /// Replace the interstitial timer with a one-shot firing at `deadline`
    ArmInterstitial { deadline: Instant },
}
