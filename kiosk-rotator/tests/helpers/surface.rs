//! Recording media surface
//!
//! Delegates playback to `SimulatedSurface` and logs every call. URLs marked
//! as broken report a load failure as soon as they are attached.

use kiosk_rotator::queue::{ItemMeta, MediaRef};
use kiosk_rotator::surface::{BindingId, MediaSurface, ProgressObserver, SimulatedSurface};
use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Attach { binding: BindingId, url: String },
    Play(BindingId),
    Pause(BindingId),
    Detach(BindingId),
}

pub type CallLog = Arc<Mutex<Vec<SurfaceCall>>>;

pub struct RecordingSurface {
    inner: SimulatedSurface,
    calls: CallLog,
    broken: HashSet<String>,
}

impl RecordingSurface {
    pub fn new(tick: Duration) -> (Self, CallLog) {
        let calls: CallLog = Arc::new(Mutex::new(Vec::new()));
        let surface = Self {
            inner: SimulatedSurface::with_tick(tick),
            calls: Arc::clone(&calls),
            broken: HashSet::new(),
        };
        (surface, calls)
    }

    /// Media at `url` will fail to load
    pub fn with_broken(mut self, url: &str) -> Self {
        self.broken.insert(url.to_string());
        self
    }

    fn record(&self, call: SurfaceCall) {
        self.calls.lock().unwrap().push(call);
    }
}

impl MediaSurface for RecordingSurface {
    fn attach(&mut self, binding: BindingId, media: &MediaRef, meta: &ItemMeta, observer: ProgressObserver) {
        let url = media.primary_url().to_string();
        self.record(SurfaceCall::Attach {
            binding,
            url: url.clone(),
        });
        if self.broken.contains(&url) {
            observer.load_failed(format!("{} not found", url));
            return;
        }
        self.inner.attach(binding, media, meta, observer);
    }

    fn play(&mut self, binding: BindingId) {
        self.record(SurfaceCall::Play(binding));
        self.inner.play(binding);
    }

    fn pause(&mut self, binding: BindingId) {
        self.record(SurfaceCall::Pause(binding));
        self.inner.pause(binding);
    }

    fn detach(&mut self, binding: BindingId) {
        self.record(SurfaceCall::Detach(binding));
        self.inner.detach(binding);
    }
}

pub fn play_count(calls: &CallLog) -> usize {
    calls
        .lock()
        .unwrap()
        .iter()
        .filter(|c| matches!(c, SurfaceCall::Play(_)))
        .count()
}
