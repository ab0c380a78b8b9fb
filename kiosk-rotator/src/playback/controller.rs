//! Playback controller
//!
//! Binds one queue to the media surface and turns surface signals into item
//! and queue completion. The same controller drives both variants:
//!
//! - **Linear**: advances the queue cursor after each item.
//! - **Grid**: advances a separate active-cell pointer, pausing the finished
//!   cell before the next one starts.
//!
//! The controller owns its queue for as long as it is active; the rotation
//! manager takes the queue back through [`PlaybackController::into_queue`].

use super::grid::GridCursor;
use super::session::{PlaybackSession, SignalEffect};
use super::{ControllerStatus, PlaybackContext, PlaybackVariant, PlaybackView, SurfaceCommand};
use crate::queue::{Item, Queue};
use crate::surface::{MediaLoadError, SurfaceSignal};
use kiosk_common::events::{CompletionOutcome, KioskEvent};
use kiosk_common::time;
use tracing::{debug, info, trace, warn};
use uuid::Uuid;

enum Cursor {
    Linear,
    Grid(GridCursor),
}

/// Drives one traversal of a queue
pub struct PlaybackController {
    group: String,
    cycle_id: Uuid,
    queue: Queue,
    cursor: Cursor,
    session: Option<PlaybackSession>,
    play_counts: Vec<u32>,
    completed: usize,
    finished: bool,
}

impl PlaybackController {
    /// Take ownership of `queue`, rewound to its first item
    pub fn new(group: impl Into<String>, mut queue: Queue, variant: PlaybackVariant) -> Self {
        queue.reset();
        let cursor = match variant {
            PlaybackVariant::Linear => Cursor::Linear,
            PlaybackVariant::Grid { columns } => Cursor::Grid(GridCursor::new(queue.len(), columns)),
        };

        Self {
            group: group.into(),
            cycle_id: Uuid::new_v4(),
            play_counts: vec![0; queue.len()],
            queue,
            cursor,
            session: None,
            completed: 0,
            finished: false,
        }
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn cycle_id(&self) -> Uuid {
        self.cycle_id
    }

    pub fn queue(&self) -> &Queue {
        &self.queue
    }

    /// Items completed so far in this traversal
    pub fn completed(&self) -> usize {
        self.completed
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Position of the playing item (queue index or grid cell)
    pub fn position(&self) -> Option<usize> {
        if self.finished {
            return None;
        }
        match &self.cursor {
            Cursor::Linear => (!self.queue.is_exhausted()).then(|| self.queue.index()),
            Cursor::Grid(grid) => grid.active(),
        }
    }

    pub fn current(&self) -> Option<&Item> {
        self.position().and_then(|index| self.queue.get(index))
    }

    /// Begin playing the first item
    pub fn start(&mut self, ctx: &mut PlaybackContext<'_>) -> ControllerStatus {
        if self.session.is_some() || self.finished {
            return ControllerStatus::Ignored;
        }
        if self.current().is_none() {
            warn!("Group '{}' activated with an empty queue", self.group);
            return ControllerStatus::Ignored;
        }

        self.activate_current(ctx);
        ControllerStatus::Playing
    }

    /// Apply one surface signal
    pub fn handle_signal(
        &mut self,
        signal: &SurfaceSignal,
        ctx: &mut PlaybackContext<'_>,
    ) -> ControllerStatus {
        if self.finished {
            return ControllerStatus::Ignored;
        }
        let Some(session) = self.session.as_mut() else {
            return ControllerStatus::Ignored;
        };

        match session.apply(signal.binding, &signal.event) {
            SignalEffect::Stale => {
                trace!("Ignoring signal from detached {}", signal.binding);
                ControllerStatus::Ignored
            }
            SignalEffect::Progressed { wrapped } => {
                if wrapped {
                    let index = session.index();
                    let play_count = session.play_count();
                    let item_id = session.item_id().to_string();
                    self.play_counts[index] = play_count;
                    debug!(
                        "Item {} in '{}' wrapped around (play count {})",
                        item_id, self.group, play_count
                    );
                    ctx.events.emit_lossy(KioskEvent::PlayCountChanged {
                        group: self.group.clone(),
                        index,
                        item_id,
                        play_count,
                        timestamp: time::now(),
                    });
                }
                ControllerStatus::Playing
            }
            SignalEffect::Complete { outcome, reason } => {
                self.complete_current(outcome, reason, ctx)
            }
        }
    }

    /// Tear down the surface binding and hand the queue back
    pub fn into_queue(mut self, ctx: &mut PlaybackContext<'_>) -> Queue {
        if let Some(session) = self.session.take() {
            self.release(&session, ctx);
        }
        self.queue
    }

    /// Read-only view for snapshots
    pub fn view(&self) -> PlaybackView {
        let focus_row = match &self.cursor {
            Cursor::Linear => None,
            Cursor::Grid(grid) => Some(grid.focus_row()),
        };

        PlaybackView {
            current_index: self.position(),
            progress_fraction: self.session.as_ref().map(|s| s.fraction()).unwrap_or(0.0),
            play_counts: self.play_counts.clone(),
            focus_row,
        }
    }

    fn activate_current(&mut self, ctx: &mut PlaybackContext<'_>) {
        let Some(index) = self.position() else {
            return;
        };
        let Some(item) = self.queue.get(index).cloned() else {
            return;
        };

        let binding = crate::surface::BindingId::next();
        let session = PlaybackSession::new(binding, index, item.id.clone());
        self.play_counts[index] = session.play_count();
        self.session = Some(session);

        info!(
            "Playing item {} ({}/{}) in '{}'",
            item.id,
            index + 1,
            self.queue.len(),
            self.group
        );
        ctx.events.emit_lossy(KioskEvent::ItemStarted {
            group: self.group.clone(),
            index,
            item_id: item.id.to_string(),
            title: item.meta.title.clone(),
            timestamp: time::now(),
        });

        ctx.commands.push(SurfaceCommand::Attach { binding, item });
        ctx.commands.push(SurfaceCommand::Play(binding));
    }

    fn complete_current(
        &mut self,
        outcome: CompletionOutcome,
        reason: Option<String>,
        ctx: &mut PlaybackContext<'_>,
    ) -> ControllerStatus {
        let Some(session) = self.session.take() else {
            return ControllerStatus::Ignored;
        };

        if outcome == CompletionOutcome::LoadFailed {
            let error = MediaLoadError {
                item_id: session.item_id().clone(),
                reason: reason.unwrap_or_else(|| "unknown".to_string()),
            };
            warn!("Skipping unplayable media in '{}': {}", self.group, error);
        } else {
            debug!(
                "Item {} in '{}' complete ({})",
                session.item_id(),
                self.group,
                outcome
            );
        }

        ctx.events.emit_lossy(KioskEvent::ItemCompleted {
            group: self.group.clone(),
            index: session.index(),
            item_id: session.item_id().to_string(),
            outcome,
            timestamp: time::now(),
        });
        self.completed += 1;
        self.release(&session, ctx);

        let more = match &mut self.cursor {
            Cursor::Linear => {
                self.queue.advance();
                !self.queue.is_exhausted()
            }
            Cursor::Grid(grid) => grid.advance(),
        };

        if more {
            self.activate_current(ctx);
            ControllerStatus::Advanced
        } else {
            self.finished = true;
            info!(
                "Queue for '{}' complete after {} items",
                self.group, self.completed
            );
            ControllerStatus::QueueComplete
        }
    }

    fn release(&self, session: &PlaybackSession, ctx: &mut PlaybackContext<'_>) {
        if matches!(self.cursor, Cursor::Grid(_)) {
            ctx.commands.push(SurfaceCommand::Pause(session.binding()));
        }
        ctx.commands.push(SurfaceCommand::Detach(session.binding()));
    }
}
