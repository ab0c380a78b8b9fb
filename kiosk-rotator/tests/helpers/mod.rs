//! Test helper modules for kiosk-rotator integration tests
//!
//! - `ScriptedCatalog`: per-source scripted fetch results
//! - `RecordingSurface`: simulated playback with a call log
//! - `Harness`: a running `RotationRuntime` plus its event stream

#![allow(dead_code)]

pub mod catalog;
pub mod surface;

pub use catalog::ScriptedCatalog;
pub use surface::{play_count, CallLog, RecordingSurface, SurfaceCall};

use kiosk_common::config::GroupConfig;
use kiosk_common::events::{EventBus, KioskEvent};
use kiosk_rotator::queue::{Item, ItemMeta, MediaRef};
use kiosk_rotator::rotation::{RotationConfig, RotationManager};
use kiosk_rotator::runtime::RotationRuntime;
use kiosk_rotator::snapshot::DisplaySnapshot;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, oneshot, watch};
use tokio::task::JoinHandle;

/// Surface tick used by runtime tests
pub const TICK: Duration = Duration::from_millis(250);

/// Longest virtual wait for any single event
const EVENT_TIMEOUT: Duration = Duration::from_secs(6 * 60 * 60);

/// `n` items named `{prefix}0..` with a known duration
pub fn items(prefix: &str, n: usize, secs: f64) -> Vec<Item> {
    (0..n)
        .map(|i| {
            Item::new(
                format!("{}{}", prefix, i),
                MediaRef::Single {
                    url: format!("{}{}.mp4", prefix, i),
                },
            )
            .with_meta(ItemMeta {
                title: Some(format!("{} #{}", prefix, i)),
                duration_secs: Some(secs),
                ..ItemMeta::default()
            })
        })
        .collect()
}

/// A runtime under test
pub struct Harness {
    pub events: broadcast::Receiver<KioskEvent>,
    pub snapshots: watch::Receiver<DisplaySnapshot>,
    pub calls: CallLog,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

/// Options for [`Harness::start`]
pub struct HarnessConfig {
    pub groups: Vec<&'static str>,
    pub rotation: RotationConfig,
    pub refresh: Duration,
    pub broken_urls: Vec<&'static str>,
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self {
            groups: vec!["a"],
            rotation: RotationConfig::default(),
            refresh: Duration::from_secs(60 * 60),
            broken_urls: Vec::new(),
        }
    }
}

impl Harness {
    /// Spawn a runtime over `catalog` and a recording surface
    pub fn start(catalog: Arc<ScriptedCatalog>, config: HarnessConfig) -> Self {
        let bus = EventBus::new(1024);
        let events = bus.subscribe();

        let manager = RotationManager::new(
            config.groups.iter().map(|g| GroupConfig::new(*g)).collect(),
            config.rotation,
            bus,
        )
        .expect("valid rotation");

        let (mut surface, calls) = RecordingSurface::new(TICK);
        for url in config.broken_urls {
            surface = surface.with_broken(url);
        }

        let runtime = RotationRuntime::new(manager, catalog, Box::new(surface), config.refresh);
        let snapshots = runtime.snapshots();

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();
        let task = tokio::spawn(runtime.run(async move {
            let _ = shutdown_rx.await;
        }));

        Self {
            events,
            snapshots,
            calls,
            shutdown: Some(shutdown_tx),
            task,
        }
    }

    /// Next event, panicking if none arrives within the timeout
    pub async fn next_event(&mut self) -> KioskEvent {
        match tokio::time::timeout(EVENT_TIMEOUT, self.events.recv()).await {
            Ok(Ok(event)) => event,
            Ok(Err(e)) => panic!("Event stream error: {:?}", e),
            Err(_) => panic!("No event within {:?}", EVENT_TIMEOUT),
        }
    }

    /// Skip events until one matches `pred`; returns it with everything
    /// skipped on the way
    pub async fn wait_for<F>(&mut self, pred: F) -> (KioskEvent, Vec<KioskEvent>)
    where
        F: Fn(&KioskEvent) -> bool,
    {
        let mut skipped = Vec::new();
        loop {
            let event = self.next_event().await;
            if pred(&event) {
                return (event, skipped);
            }
            skipped.push(event);
        }
    }

    pub fn snapshot(&self) -> DisplaySnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Stop the runtime and wait for it to finish
    pub async fn stop(mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task.await.expect("runtime task panicked");
    }
}

pub fn is_activation_of(event: &KioskEvent, name: &str) -> bool {
    matches!(event, KioskEvent::GroupActivated { group, .. } if group == name)
}
