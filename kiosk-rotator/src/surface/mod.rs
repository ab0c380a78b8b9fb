//! Media surface abstraction
//!
//! The engine never talks to a concrete video or audio API. A surface only
//! has to load media for a binding, play and pause it, and report progress
//! through the [`ProgressObserver`] it was handed. An explicit end-of-media
//! notification is optional: completion is otherwise inferred from progress.
//!
//! Every attachment gets a fresh [`BindingId`]. Once the engine detaches a
//! binding it ignores any late signal carrying that id, so a torn-down
//! listener can never advance the next item.

mod simulated;

pub use simulated::SimulatedSurface;

use crate::queue::{ItemId, ItemMeta, MediaRef};
use serde::Serialize;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use thiserror::Error;
use tokio::sync::mpsc;

static NEXT_BINDING: AtomicU64 = AtomicU64::new(1);

/// Identifies one attachment of media to the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct BindingId(u64);

impl BindingId {
    /// Allocate a process-unique binding id
    pub fn next() -> Self {
        Self(NEXT_BINDING.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for BindingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "binding-{}", self.0)
    }
}

/// Asset missing or corrupt
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("item {item_id} failed to load: {reason}")]
pub struct MediaLoadError {
    pub item_id: ItemId,
    pub reason: String,
}

/// Notification from the surface about the media it is playing
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    /// Time advanced; `duration` is `None` until the surface knows it
    Progress { elapsed: f64, duration: Option<f64> },
    /// Explicit end-of-media, where the surface supports it
    Ended,
    /// Media could not be loaded or decoded
    LoadFailed { reason: String },
}

/// A surface event tagged with the binding that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct SurfaceSignal {
    pub binding: BindingId,
    pub event: SurfaceEvent,
}

/// Callback handle a surface uses to report on one binding
///
/// Each method returns `false` once the engine has shut down.
#[derive(Debug, Clone)]
pub struct ProgressObserver {
    binding: BindingId,
    tx: mpsc::UnboundedSender<SurfaceSignal>,
}

impl ProgressObserver {
    pub fn new(binding: BindingId, tx: mpsc::UnboundedSender<SurfaceSignal>) -> Self {
        Self { binding, tx }
    }

    pub fn binding(&self) -> BindingId {
        self.binding
    }

    pub fn progress(&self, elapsed: f64, duration: Option<f64>) -> bool {
        self.send(SurfaceEvent::Progress { elapsed, duration })
    }

    pub fn ended(&self) -> bool {
        self.send(SurfaceEvent::Ended)
    }

    pub fn load_failed(&self, reason: impl Into<String>) -> bool {
        self.send(SurfaceEvent::LoadFailed {
            reason: reason.into(),
        })
    }

    fn send(&self, event: SurfaceEvent) -> bool {
        self.tx
            .send(SurfaceSignal {
                binding: self.binding,
                event,
            })
            .is_ok()
    }
}

/// A video/audio output the engine can drive
///
/// Calls are fire-and-forget; results come back through the observer.
/// Implementations must tolerate `pause`/`detach` for bindings they have
/// already dropped.
pub trait MediaSurface: Send {
    /// Load `media` for `binding` without starting playback
    fn attach(
        &mut self,
        binding: BindingId,
        media: &MediaRef,
        meta: &ItemMeta,
        observer: ProgressObserver,
    );

    fn play(&mut self, binding: BindingId);

    fn pause(&mut self, binding: BindingId);

    /// Stop playback and drop the observer for `binding`
    fn detach(&mut self, binding: BindingId);
}
