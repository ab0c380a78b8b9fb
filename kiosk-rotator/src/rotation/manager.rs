//! Rotation manager
//!
//! Two states:
//!
//! - **Active**: a [`PlaybackController`] owns the current group's queue.
//! - **Interstitial**: the promo screen is up until a fixed deadline, and
//!   past it for as long as the next queue is not ready.
//!
//! `Active -> Interstitial` happens when the controller reports queue
//! completion. The deadline is captured on entry and a fresh one-shot timer
//! is requested every time. When the rotation has more than one group the
//! next group's queue is prefetched immediately.
//!
//! `Interstitial -> Active` happens once the deadline has passed and the
//! target group has a non-empty queue with no fetch outstanding. Fetch
//! results only ever land in each group's [`StagedQueue`] and are read
//! here, at activation.

use super::{Command, RotationConfig, StagedQueue};
use crate::catalog::FetchError;
use crate::playback::{ControllerStatus, PlaybackContext, PlaybackController};
use crate::queue::{Item, Queue};
use crate::snapshot::DisplaySnapshot;
use crate::surface::SurfaceSignal;
use crate::{Error, Result};
use kiosk_common::config::GroupConfig;
use kiosk_common::events::{EventBus, FetchKind, InterstitialReason, KioskEvent};
use kiosk_common::time;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

struct RotationGroup {
    name: String,
    source: String,
    queue: Queue,
    staged: StagedQueue,
}

struct Interstitial {
    deadline: Instant,
    /// Group activated when the interstitial ends
    target: usize,
    expired: bool,
    /// Last extension reason announced, so each is evented once
    reported: Option<InterstitialReason>,
}

enum RotationState {
    Active(PlaybackController),
    Interstitial(Interstitial),
}

enum Readiness {
    Waiting(InterstitialReason),
    Refetch { delay: Duration },
    Empty,
    Ready,
}

/// Round-robin rotation over a fixed list of groups
pub struct RotationManager {
    groups: Vec<RotationGroup>,
    current: usize,
    state: RotationState,
    config: RotationConfig,
    events: EventBus,
}

impl RotationManager {
    /// Create a manager for `groups`, rotated in the given order
    ///
    /// The group list is fixed for the lifetime of the manager.
    pub fn new(groups: Vec<GroupConfig>, config: RotationConfig, events: EventBus) -> Result<Self> {
        if groups.is_empty() {
            return Err(Error::InvalidState(
                "rotation needs at least one group".to_string(),
            ));
        }

        let groups = groups
            .into_iter()
            .map(|g| RotationGroup {
                source: g.source().to_string(),
                name: g.name,
                queue: Queue::default(),
                staged: StagedQueue::new(),
            })
            .collect();

        Ok(Self {
            groups,
            current: 0,
            state: RotationState::Interstitial(Interstitial {
                deadline: Instant::now(),
                target: 0,
                expired: false,
                reported: None,
            }),
            config,
            events,
        })
    }

    /// Enter the interstitial with an elapsed deadline and fetch group 0
    pub fn start(&mut self, now: Instant) -> Vec<Command> {
        info!(
            "Starting rotation over {} group(s), interstitial {:?}",
            self.groups.len(),
            self.config.interstitial
        );

        self.current = 0;
        self.state = RotationState::Interstitial(Interstitial {
            deadline: now,
            target: 0,
            expired: true,
            reported: None,
        });

        let mut out = Vec::new();
        self.issue_fetch(0, FetchKind::Activation, Duration::ZERO, &mut out);
        self.try_activate(&mut out);
        out
    }

    /// Feed a progress, end, or load-failure signal from the surface
    pub fn on_surface(&mut self, signal: SurfaceSignal, now: Instant) -> Vec<Command> {
        let mut out = Vec::new();
        let RotationState::Active(controller) = &mut self.state else {
            trace!("Dropping {} signal during interstitial", signal.binding);
            return out;
        };

        let mut surface = Vec::new();
        let status = controller.handle_signal(
            &signal,
            &mut PlaybackContext {
                events: &self.events,
                commands: &mut surface,
            },
        );
        out.extend(surface.into_iter().map(Command::Surface));

        if status == ControllerStatus::QueueComplete {
            self.complete_queue(now, &mut out);
        }
        out
    }

    /// The interstitial one-shot timer fired
    pub fn on_interstitial_timer(&mut self, now: Instant) -> Vec<Command> {
        let mut out = Vec::new();
        let RotationState::Interstitial(interstitial) = &mut self.state else {
            trace!("Interstitial timer fired while active");
            return out;
        };
        if interstitial.expired {
            return out;
        }
        if now < interstitial.deadline {
            out.push(Command::ArmInterstitial {
                deadline: interstitial.deadline,
            });
            return out;
        }

        interstitial.expired = true;
        let target = interstitial.target;
        if target != self.current {
            debug!(
                "Rotating from '{}' to '{}'",
                self.groups[self.current].name, self.groups[target].name
            );
        }
        self.current = target;
        info!("Interstitial over, activating '{}'", self.groups[target].name);

        self.try_activate(&mut out);
        out
    }

    /// A fetch issued through [`Command::Fetch`] resolved
    pub fn on_fetch_result(
        &mut self,
        group: usize,
        kind: FetchKind,
        result: std::result::Result<Vec<Item>, FetchError>,
    ) -> Vec<Command> {
        let mut out = Vec::new();
        let Some(entry) = self.groups.get_mut(group) else {
            warn!("Fetch result for unknown group index {}", group);
            return out;
        };

        match result {
            Ok(items) => {
                info!(
                    "{} fetch for '{}' returned {} item(s)",
                    kind,
                    entry.name,
                    items.len()
                );
                self.events.emit_lossy(KioskEvent::FetchCompleted {
                    group: entry.name.clone(),
                    kind,
                    item_count: items.len(),
                    timestamp: time::now(),
                });
                entry.staged.resolve_ok(items);
            }
            Err(e) => {
                warn!("{} fetch for '{}' failed: {}", kind, entry.name, e);
                self.events.emit_lossy(KioskEvent::FetchFailed {
                    group: entry.name.clone(),
                    kind,
                    error: e.to_string(),
                    timestamp: time::now(),
                });
                entry.staged.resolve_err(kind);
            }
        }

        let waiting = matches!(&self.state, RotationState::Interstitial(i) if i.expired);
        if waiting && self.current == group {
            self.try_activate(&mut out);
        }
        out
    }

    /// Re-fetch every group; results are staged until each group's next
    /// activation
    ///
    /// Groups with a fetch already outstanding are skipped.
    pub fn request_refresh(&mut self) -> Vec<Command> {
        let mut out = Vec::new();
        let mut skipped = 0;
        for index in 0..self.groups.len() {
            if self.groups[index].staged.is_pending() {
                debug!(
                    "Skipping refresh of '{}': fetch already in flight",
                    self.groups[index].name
                );
                skipped += 1;
                continue;
            }
            self.issue_fetch(index, FetchKind::Refresh, Duration::ZERO, &mut out);
        }
        info!(
            "Content refresh: {} fetch(es) issued, {} skipped",
            out.len(),
            skipped
        );
        out
    }

    /// Detach whatever is playing; the manager is left idle
    pub fn shutdown(&mut self, now: Instant) -> Vec<Command> {
        let previous = std::mem::replace(
            &mut self.state,
            RotationState::Interstitial(Interstitial {
                deadline: now,
                target: self.current,
                expired: true,
                reported: None,
            }),
        );

        let mut out = Vec::new();
        if let RotationState::Active(controller) = previous {
            info!("Stopping playback of '{}'", controller.group());
            let mut surface = Vec::new();
            let queue = controller.into_queue(&mut PlaybackContext {
                events: &self.events,
                commands: &mut surface,
            });
            self.groups[self.current].queue = queue;
            out.extend(surface.into_iter().map(Command::Surface));
        }
        out
    }

    pub fn is_interstitial(&self) -> bool {
        matches!(self.state, RotationState::Interstitial(_))
    }

    /// Deadline of the current interstitial, if one is showing
    pub fn interstitial_deadline(&self) -> Option<Instant> {
        match &self.state {
            RotationState::Interstitial(i) => Some(i.deadline),
            RotationState::Active(_) => None,
        }
    }

    pub fn current_group(&self) -> &str {
        &self.groups[self.current].name
    }

    pub fn current_group_index(&self) -> usize {
        self.current
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    /// Item now playing; `None` during the interstitial
    pub fn current_item(&self) -> Option<&Item> {
        match &self.state {
            RotationState::Active(controller) => controller.current(),
            RotationState::Interstitial(_) => None,
        }
    }

    pub fn current_index(&self) -> Option<usize> {
        match &self.state {
            RotationState::Active(controller) => controller.position(),
            RotationState::Interstitial(_) => None,
        }
    }

    pub fn config(&self) -> &RotationConfig {
        &self.config
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn snapshot(&self, now: Instant) -> DisplaySnapshot {
        match &self.state {
            RotationState::Active(controller) => {
                let view = controller.view();
                DisplaySnapshot {
                    group: Some(controller.group().to_string()),
                    current_item: controller.current().cloned(),
                    progress_fraction: view.progress_fraction,
                    is_interstitial: false,
                    interstitial_remaining_secs: None,
                    playlist: controller.queue().items().to_vec(),
                    current_index: view.current_index,
                    play_counts: view.play_counts,
                    focus_row: view.focus_row,
                    variant: Some(self.config.variant),
                }
            }
            RotationState::Interstitial(interstitial) => {
                let group = &self.groups[interstitial.target];
                DisplaySnapshot {
                    group: Some(group.name.clone()),
                    is_interstitial: true,
                    interstitial_remaining_secs: Some(
                        interstitial
                            .deadline
                            .saturating_duration_since(now)
                            .as_secs_f64(),
                    ),
                    playlist: group.queue.items().to_vec(),
                    variant: Some(self.config.variant),
                    ..DisplaySnapshot::default()
                }
            }
        }
    }

    fn issue_fetch(&mut self, index: usize, kind: FetchKind, delay: Duration, out: &mut Vec<Command>) {
        let group = &mut self.groups[index];
        group.staged.begin_fetch(kind);
        if delay.is_zero() {
            debug!("Issuing {} fetch for '{}'", kind, group.name);
        } else {
            debug!("Issuing {} fetch for '{}' in {:?}", kind, group.name, delay);
        }
        out.push(Command::Fetch {
            group: index,
            source: group.source.clone(),
            kind,
            delay,
        });
    }

    fn complete_queue(&mut self, now: Instant, out: &mut Vec<Command>) {
        let previous = std::mem::replace(
            &mut self.state,
            RotationState::Interstitial(Interstitial {
                deadline: now,
                target: self.current,
                expired: true,
                reported: None,
            }),
        );
        let RotationState::Active(controller) = previous else {
            return;
        };

        self.events.emit_lossy(KioskEvent::QueueCompleted {
            group: controller.group().to_string(),
            cycle_id: controller.cycle_id(),
            items_played: controller.completed(),
            timestamp: time::now(),
        });

        let mut surface = Vec::new();
        let queue = controller.into_queue(&mut PlaybackContext {
            events: &self.events,
            commands: &mut surface,
        });
        out.extend(surface.into_iter().map(Command::Surface));
        self.groups[self.current].queue = queue;

        self.enter_interstitial(now, out);
    }

    fn enter_interstitial(&mut self, now: Instant, out: &mut Vec<Command>) {
        let count = self.groups.len();
        let target = (self.current + 1) % count;
        let deadline = now + self.config.interstitial;
        self.state = RotationState::Interstitial(Interstitial {
            deadline,
            target,
            expired: false,
            reported: None,
        });

        info!(
            "Interstitial for {:?}, next group '{}'",
            self.config.interstitial, self.groups[target].name
        );
        self.events.emit_lossy(KioskEvent::InterstitialEntered {
            next_group: self.groups[target].name.clone(),
            duration_secs: self.config.interstitial.as_secs(),
            timestamp: time::now(),
        });
        out.push(Command::ArmInterstitial { deadline });

        if count > 1 {
            self.issue_fetch(target, FetchKind::Prefetch, Duration::ZERO, out);
        }
    }

    /// Activate the current group if its queue is ready, otherwise stay in
    /// the interstitial
    fn try_activate(&mut self, out: &mut Vec<Command>) {
        let fetch_retry = self.config.fetch_retry;
        let group = &mut self.groups[self.current];

        let readiness = if group.staged.is_pending() {
            match group.staged.last_issued() {
                Some(FetchKind::Prefetch) => Readiness::Waiting(InterstitialReason::AwaitingPrefetch),
                _ => Readiness::Waiting(InterstitialReason::AwaitingFetch),
            }
        } else if let Some(failed) = group.staged.unavailable() {
            let delay = if failed == FetchKind::Activation {
                fetch_retry
            } else {
                Duration::ZERO
            };
            Readiness::Refetch { delay }
        } else {
            if let Some(items) = group.staged.take() {
                debug!("Applying {} staged item(s) to '{}'", items.len(), group.name);
                group.queue = Queue::new(items);
            }
            if group.queue.is_empty() {
                Readiness::Empty
            } else {
                Readiness::Ready
            }
        };

        match readiness {
            Readiness::Waiting(reason) => self.extend_interstitial(reason),
            Readiness::Refetch { delay } => {
                self.issue_fetch(self.current, FetchKind::Activation, delay, out);
                self.extend_interstitial(InterstitialReason::AwaitingFetch);
            }
            Readiness::Empty => self.extend_interstitial(InterstitialReason::EmptyQueue),
            Readiness::Ready => self.activate(out),
        }
    }

    fn extend_interstitial(&mut self, reason: InterstitialReason) {
        let RotationState::Interstitial(interstitial) = &mut self.state else {
            return;
        };
        if interstitial.reported == Some(reason) {
            return;
        }
        interstitial.reported = Some(reason);

        let group = self.groups[self.current].name.clone();
        match reason {
            InterstitialReason::EmptyQueue => {
                info!("'{}' has no items, waiting for the next refresh", group)
            }
            _ => info!("Interstitial extended for '{}': {}", group, reason),
        }
        self.events.emit_lossy(KioskEvent::InterstitialExtended {
            group,
            reason,
            timestamp: time::now(),
        });
    }

    fn activate(&mut self, out: &mut Vec<Command>) {
        let group = &mut self.groups[self.current];
        let queue = std::mem::take(&mut group.queue);
        let mut controller = PlaybackController::new(group.name.clone(), queue, self.config.variant);

        info!(
            "Activating '{}' with {} item(s)",
            group.name,
            controller.queue().len()
        );
        self.events.emit_lossy(KioskEvent::GroupActivated {
            group: group.name.clone(),
            cycle_id: controller.cycle_id(),
            item_count: controller.queue().len(),
            timestamp: time::now(),
        });

        let mut surface = Vec::new();
        controller.start(&mut PlaybackContext {
            events: &self.events,
            commands: &mut surface,
        });
        self.state = RotationState::Active(controller);
        out.extend(surface.into_iter().map(Command::Surface));
    }
}
