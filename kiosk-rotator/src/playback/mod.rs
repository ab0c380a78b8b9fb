//! Playback: one controller per active queue, two variants
//!
//! - `session`: progress fraction, play-count heuristic, signal handling
//! - `grid`: active-cell pointer for the leaderboard grid
//! - `controller`: the controller that drives a queue through the surface

mod controller;
mod grid;
mod session;

pub use controller::PlaybackController;
pub use grid::GridCursor;
pub use session::{progress_fraction, PlayCounter, PlaybackSession, SignalEffect};

use crate::queue::Item;
use crate::surface::BindingId;
use kiosk_common::config::VariantKind;
use kiosk_common::events::EventBus;
use serde::Serialize;

/// How a queue is presented and walked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PlaybackVariant {
    /// One item on screen; the queue cursor advances
    Linear,
    /// All items in a grid; a separate active-cell pointer advances
    Grid { columns: usize },
}

impl PlaybackVariant {
    pub fn from_config(kind: VariantKind, columns: usize) -> Self {
        match kind {
            VariantKind::Linear => PlaybackVariant::Linear,
            VariantKind::Grid => PlaybackVariant::Grid { columns },
        }
    }
}

/// Instruction for the media surface
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceCommand {
    /// Load an item under a fresh binding
    Attach { binding: BindingId, item: Item },
    Play(BindingId),
    Pause(BindingId),
    /// Stop and drop the binding's listeners
    Detach(BindingId),
}

/// Sinks a controller writes to while handling an input
pub struct PlaybackContext<'a> {
    pub events: &'a EventBus,
    pub commands: &'a mut Vec<SurfaceCommand>,
}

/// Result of feeding an input to a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerStatus {
    /// Nothing changed (stale binding, already finished)
    Ignored,
    /// Current item still playing
    Playing,
    /// An item completed and the next one started
    Advanced,
    /// The last item completed; reported exactly once
    QueueComplete,
}

/// Controller state exposed to snapshots
#[derive(Debug, Clone, PartialEq)]
pub struct PlaybackView {
    pub current_index: Option<usize>,
    pub progress_fraction: f64,
    pub play_counts: Vec<u32>,
    /// Grid row to keep in view; `None` for the linear variant
    pub focus_row: Option<usize>,
}
