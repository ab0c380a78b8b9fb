//! Read-only display state for the rendering layer

use crate::playback::PlaybackVariant;
use crate::queue::Item;
use serde::Serialize;

/// Everything a renderer needs to paint one frame
///
/// Published after every input the engine handles. Renderers only read it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DisplaySnapshot {
    /// Active group, or the group the interstitial leads into
    pub group: Option<String>,
    pub current_item: Option<Item>,
    /// Progress of `current_item` in `[0, 1]`
    pub progress_fraction: f64,
    pub is_interstitial: bool,
    /// Seconds until the interstitial deadline; zero once it has passed
    pub interstitial_remaining_secs: Option<f64>,
    pub playlist: Vec<Item>,
    pub current_index: Option<usize>,
    /// Per-item play counts (0 = not yet played this cycle)
    pub play_counts: Vec<u32>,
    /// Grid row to keep scrolled into view
    pub focus_row: Option<usize>,
    pub variant: Option<PlaybackVariant>,
}

impl DisplaySnapshot {
    /// Snapshot shown before the engine has produced anything
    pub fn interstitial() -> Self {
        Self {
            is_interstitial: true,
            ..Self::default()
        }
    }
}
