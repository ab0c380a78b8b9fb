//! Headless media surface
//!
//! Pretends to play media by reporting progress on a fixed tick against the
//! item's catalog duration. Used when the kiosk runs without a display
//! shell attached, and as a stand-in during soak tests.

use super::{BindingId, MediaSurface, ProgressObserver};
use crate::queue::{ItemMeta, MediaRef};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

/// Duration assumed for items whose catalog entry has none
pub const DEFAULT_SIMULATED_SECS: f64 = 30.0;

/// Progress reporting interval
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

struct SimulatedCell {
    observer: ProgressObserver,
    duration: f64,
    elapsed: Arc<Mutex<f64>>,
    ticker: Option<JoinHandle<()>>,
}

impl SimulatedCell {
    fn stop(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.abort();
        }
    }
}

/// Surface that fakes playback with a tokio ticker per binding
///
/// Must be driven from inside a tokio runtime.
pub struct SimulatedSurface {
    tick: Duration,
    default_duration: f64,
    cells: HashMap<BindingId, SimulatedCell>,
}

impl SimulatedSurface {
    pub fn new() -> Self {
        Self::with_tick(DEFAULT_TICK)
    }

    pub fn with_tick(tick: Duration) -> Self {
        Self {
            tick,
            default_duration: DEFAULT_SIMULATED_SECS,
            cells: HashMap::new(),
        }
    }

    /// Number of bindings currently attached
    pub fn attached(&self) -> usize {
        self.cells.len()
    }
}

impl Default for SimulatedSurface {
    fn default() -> Self {
        Self::new()
    }
}

impl MediaSurface for SimulatedSurface {
    fn attach(
        &mut self,
        binding: BindingId,
        media: &MediaRef,
        meta: &ItemMeta,
        observer: ProgressObserver,
    ) {
        let duration = meta
            .duration_secs
            .filter(|d| d.is_finite() && *d > 0.0)
            .unwrap_or(self.default_duration);
        debug!(
            "Simulated surface attached {} ({}, {:.1}s)",
            binding,
            media.primary_url(),
            duration
        );

        if let Some(mut old) = self.cells.insert(
            binding,
            SimulatedCell {
                observer,
                duration,
                elapsed: Arc::new(Mutex::new(0.0)),
                ticker: None,
            },
        ) {
            old.stop();
        }
    }

    fn play(&mut self, binding: BindingId) {
        let tick = self.tick;
        let Some(cell) = self.cells.get_mut(&binding) else {
            return;
        };
        if cell.ticker.is_some() {
            return;
        }

        let observer = cell.observer.clone();
        let elapsed = Arc::clone(&cell.elapsed);
        let duration = cell.duration;
        cell.ticker = Some(tokio::spawn(async move {
            let mut interval = tokio::time::interval(tick);
            interval.tick().await;
            loop {
                interval.tick().await;
                let now = {
                    let mut guard = match elapsed.lock() {
                        Ok(guard) => guard,
                        Err(poisoned) => poisoned.into_inner(),
                    };
                    *guard = (*guard + tick.as_secs_f64()).min(duration);
                    *guard
                };
                trace!("{} at {:.2}/{:.2}s", observer.binding(), now, duration);
                if !observer.progress(now, Some(duration)) {
                    break;
                }
                if now >= duration {
                    observer.ended();
                    break;
                }
            }
        }));
    }

    fn pause(&mut self, binding: BindingId) {
        if let Some(cell) = self.cells.get_mut(&binding) {
            cell.stop();
        }
    }

    fn detach(&mut self, binding: BindingId) {
        if let Some(mut cell) = self.cells.remove(&binding) {
            cell.stop();
            debug!("Simulated surface detached {}", binding);
        }
    }
}

impl Drop for SimulatedSurface {
    fn drop(&mut self) {
        for cell in self.cells.values_mut() {
            cell.stop();
        }
    }
}
