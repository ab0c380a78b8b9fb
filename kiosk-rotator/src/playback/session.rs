//! "Now playing" state shared by both playback variants

use crate::queue::ItemId;
use crate::surface::{BindingId, SurfaceEvent};
use kiosk_common::events::CompletionOutcome;

/// Fractional progress for an `(elapsed, duration)` sample
///
/// Unknown, zero, or non-finite durations yield 0.0 so that completion is
/// never inferred from them. The result is not clamped: values at or above
/// 1.0 mean the media has run to its end.
pub fn progress_fraction(elapsed: f64, duration: Option<f64>) -> f64 {
    match duration {
        Some(duration) if duration.is_finite() && duration > 0.0 && elapsed.is_finite() => {
            (elapsed / duration).max(0.0)
        }
        _ => 0.0,
    }
}

/// Play-count heuristic for surfaces without a reliable "ended" event
///
/// Each strictly decreasing progress sample is read as a loop or seek-back
/// and bumps the counter. Starts at 1 for the play that is under way.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayCounter {
    count: u32,
    last_fraction: f64,
}

impl PlayCounter {
    pub fn new() -> Self {
        Self {
            count: 1,
            last_fraction: 0.0,
        }
    }

    /// Record a sample; returns true if it wrapped around
    pub fn observe(&mut self, fraction: f64) -> bool {
        let wrapped = fraction < self.last_fraction;
        if wrapped {
            self.count += 1;
        }
        self.last_fraction = fraction;
        wrapped
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn last_fraction(&self) -> f64 {
        self.last_fraction
    }
}

impl Default for PlayCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// What a surface signal means for the session it targets
#[derive(Debug, Clone, PartialEq)]
pub enum SignalEffect {
    /// Signal belongs to a binding that is no longer live
    Stale,
    /// Progress recorded; `wrapped` is true when the play counter moved
    Progressed { wrapped: bool },
    /// The item is done, one way or another
    Complete {
        outcome: CompletionOutcome,
        /// Surface-provided reason for a load failure
        reason: Option<String>,
    },
}

/// Transient state for the item currently bound to the surface
#[derive(Debug, Clone)]
pub struct PlaybackSession {
    binding: BindingId,
    index: usize,
    item_id: ItemId,
    counter: PlayCounter,
    fraction: f64,
}

impl PlaybackSession {
    pub fn new(binding: BindingId, index: usize, item_id: ItemId) -> Self {
        Self {
            binding,
            index,
            item_id,
            counter: PlayCounter::new(),
            fraction: 0.0,
        }
    }

    pub fn binding(&self) -> BindingId {
        self.binding
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn item_id(&self) -> &ItemId {
        &self.item_id
    }

    pub fn play_count(&self) -> u32 {
        self.counter.count()
    }

    /// Latest progress, clamped to `[0, 1]` for display
    pub fn fraction(&self) -> f64 {
        self.fraction.clamp(0.0, 1.0)
    }

    /// Interpret one surface signal
    pub fn apply(&mut self, binding: BindingId, event: &SurfaceEvent) -> SignalEffect {
        if binding != self.binding {
            return SignalEffect::Stale;
        }

        match event {
            SurfaceEvent::Progress { elapsed, duration } => {
                let fraction = progress_fraction(*elapsed, *duration);
                let wrapped = self.counter.observe(fraction);
                self.fraction = fraction;
                if fraction >= 1.0 {
                    SignalEffect::Complete {
                        outcome: CompletionOutcome::Finished,
                        reason: None,
                    }
                } else {
                    SignalEffect::Progressed { wrapped }
                }
            }
            SurfaceEvent::Ended => {
                self.fraction = 1.0;
                SignalEffect::Complete {
                    outcome: CompletionOutcome::Ended,
                    reason: None,
                }
            }
            SurfaceEvent::LoadFailed { reason } => SignalEffect::Complete {
                outcome: CompletionOutcome::LoadFailed,
                reason: Some(reason.clone()),
            },
        }
    }
}
